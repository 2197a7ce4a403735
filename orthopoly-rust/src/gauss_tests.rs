use super::*;
use crate::error::OpolyError;
use crate::jacobi::affine_mapping;
use approx::assert_abs_diff_eq;

#[test]
fn test_legendre_rule_exactness() {
    for n in 1..12 {
        let rule = legendre(n).unwrap();
        assert_eq!(rule.len(), n);
        assert!(rule.x.windows(2).all(|p| p[0] < p[1]));
        assert_abs_diff_eq!(rule.mass(), 2.0, epsilon = 1e-13);

        // Exact through degree 2n - 1, odd moments vanish
        let k = 2 * n as i32 - 2;
        assert_abs_diff_eq!(rule.integrate(|x| x.powi(k)), 2.0 / (k as f64 + 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(rule.integrate(|x| x.powi(k + 1)), 0.0, epsilon = 1e-12);
    }
}

#[test]
fn test_jacobi_rule_integrates_weight() {
    // Mass of (1 - x)(1 + x)^2 is 4/3
    let rule = jacobi(6, 1.0, 2.0).unwrap();
    assert_abs_diff_eq!(rule.mass(), 4.0 / 3.0, epsilon = 1e-13);

    let reference = legendre(10).unwrap();
    let expected = reference.integrate(|x| (1.0 - x) * (1.0 + x).powi(2) * x.powi(3));
    assert_abs_diff_eq!(rule.integrate(|x| x.powi(3)), expected, epsilon = 1e-13);

    assert!(jacobi(3, -1.5, 0.0).is_err());
}

#[test]
fn test_rule_from_mapped_table() {
    // Legendre measure pushed onto [1, 4]: ∫_1^4 x^2 dx = 21
    let table = affine_mapping(&JacobiPolynomials::legendre().recurrence(8), 1.0, 4.0).unwrap();
    let rule = Rule::from_recurrence(&table, 5, 1.0, 4.0).unwrap();
    assert_eq!((rule.a, rule.b), (1.0, 4.0));
    assert!(rule.x.iter().all(|&x| 1.0 < x && x < 4.0));
    assert_abs_diff_eq!(rule.mass(), 3.0, epsilon = 1e-13);
    assert_abs_diff_eq!(rule.integrate(|x| x * x), 21.0, epsilon = 1e-12);
}

#[test]
fn test_rule_needs_margin() {
    let table = JacobiPolynomials::legendre().recurrence(4);
    assert!(matches!(
        Rule::from_recurrence(&table, 4, -1.0, 1.0),
        Err(OpolyError::InsufficientMargin { required: 5, available: 4, .. })
    ));
    assert!(legendre(0).unwrap().is_empty());
}

#[test]
fn test_large_legendre_rule() {
    let rule = legendre(200).unwrap();
    assert_eq!(rule.x.len(), 200);
    assert!(rule.x.iter().all(|&x| -1.0 < x && x < 1.0));
    assert_abs_diff_eq!(rule.mass(), 2.0, epsilon = 1e-12);
}
