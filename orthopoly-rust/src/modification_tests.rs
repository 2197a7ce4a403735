use super::*;
use crate::jacobi::JacobiPolynomials;
use approx::assert_abs_diff_eq;

fn assert_tables_close(actual: &RecurrenceTable, expected: &RecurrenceTable, rows: usize, tol: f64) {
    for n in 0..rows {
        assert!(
            (actual.a(n) - expected.a(n)).abs() < tol,
            "a[{}]: {} vs {}",
            n,
            actual.a(n),
            expected.a(n)
        );
        assert!(
            (actual.b(n) - expected.b(n)).abs() < tol,
            "b[{}]: {} vs {}",
            n,
            actual.b(n),
            expected.b(n)
        );
    }
}

/// Table of w(x) dμ computed from a large Gauss rule of μ
fn reweighted(table: &RecurrenceTable, nodes: usize, rows: usize, w: impl Fn(f64) -> f64) -> RecurrenceTable {
    let (x, wt) = table.gauss_quadrature(nodes).unwrap();
    let v: Vec<f64> = x.iter().zip(&wt).map(|(&x, &wt)| wt * w(x)).collect();
    discrete_stieltjes(&x, &v, rows).unwrap()
}

#[test]
fn test_linear_modification_matches_jacobi() {
    let legendre = JacobiPolynomials::legendre().recurrence(12);

    // (1 + x) dx is Jacobi(0, 1)
    let (ab, sign) = linear_modification(&legendre, -1.0).unwrap();
    assert_eq!(ab.len(), 11);
    assert_eq!(sign, 1.0);
    let expected = JacobiPolynomials::new(0.0, 1.0).unwrap().recurrence(11);
    assert_tables_close(&ab, &expected, 11, 1e-13);

    // -(x - 1) dx = (1 - x) dx is Jacobi(1, 0)
    let (ab, sign) = linear_modification(&legendre, 1.0).unwrap();
    assert_eq!(sign, -1.0);
    let expected = JacobiPolynomials::new(1.0, 0.0).unwrap().recurrence(11);
    assert_tables_close(&ab, &expected, 11, 1e-13);
}

#[test]
fn test_linear_modification_outside_support() {
    let jac = JacobiPolynomials::new(0.5, -0.3).unwrap().recurrence(20);
    let x0 = 1.7;
    let (ab, sign) = linear_modification(&jac, x0).unwrap();
    assert_eq!(sign, -1.0);

    let expected = reweighted(&jac, 19, 10, |x| x0 - x);
    assert_tables_close(&ab, &expected, 10, 1e-12);
}

#[test]
fn test_linear_modification_breakdown() {
    let legendre = JacobiPolynomials::legendre().recurrence(6);
    // x = 0 is a zero of p_1, p_3 and p_5
    assert!(matches!(
        linear_modification(&legendre, 0.0),
        Err(OpolyError::NumericalBreakdown { .. })
    ));
    // Inside the support the product changes sign
    assert!(matches!(
        linear_modification(&legendre, 0.3),
        Err(OpolyError::NumericalBreakdown { .. })
    ));
    assert!(matches!(
        linear_modification(&legendre.truncate(1).unwrap(), -2.0),
        Err(OpolyError::InsufficientMargin { .. })
    ));
}

#[test]
fn test_quadratic_modification_real_roots() {
    let legendre = JacobiPolynomials::legendre().recurrence(14);

    // (1 - x)^2 dx is Jacobi(2, 0)
    let ab = quadratic_modification_real(&legendre, 1.0).unwrap();
    assert_eq!(ab.len(), 12);
    let expected = JacobiPolynomials::new(2.0, 0.0).unwrap().recurrence(12);
    assert_tables_close(&ab, &expected, 12, 1e-12);

    // x^2 dx: a root inside the support
    let ab = quadratic_modification_real(&legendre, 0.0).unwrap();
    assert_abs_diff_eq!(ab.b(0), (2.0f64 / 3.0).sqrt(), epsilon = 1e-14);
    assert_abs_diff_eq!(ab.a(1), 0.0, epsilon = 1e-14);
    assert_abs_diff_eq!(ab.b(1), (0.6f64).sqrt(), epsilon = 1e-13);
}

#[test]
fn test_quadratic_modification_complex_root() {
    let jac = JacobiPolynomials::new(1.0, 0.5).unwrap().recurrence(16);
    let z0 = Complex::new(0.2, 0.7);
    let ab = quadratic_modification(&jac, z0).unwrap();
    assert_eq!(ab.len(), 14);

    let expected = reweighted(&jac, 15, 12, |x| (x - z0.re).powi(2) + z0.im * z0.im);
    assert_tables_close(&ab, &expected, 12, 1e-12);

    // Sign-preserving: positive mass and betas
    assert!(ab.beta().iter().all(|&b| b > 0.0));
}

#[test]
fn test_quadratic_equals_two_linear_outside_support() {
    let legendre = JacobiPolynomials::legendre().recurrence(16);
    let x0 = -1.4;
    let quad = quadratic_modification_real(&legendre, x0).unwrap();

    let (once, s1) = linear_modification(&legendre, x0).unwrap();
    let (twice, s2) = linear_modification(&once, x0).unwrap();
    assert_eq!(s1 * s2, 1.0);
    assert_tables_close(&quad, &twice, 14, 1e-12);
}

#[test]
fn test_quadratic_modification_long_table() {
    // 4002 pairs; the band sweep keeps this linear in the table length
    let legendre = JacobiPolynomials::legendre().recurrence(4002);
    let ab = quadratic_modification_real(&legendre, -1.0).unwrap();
    assert_eq!(ab.len(), 4000);
    let expected = JacobiPolynomials::new(0.0, 2.0).unwrap().recurrence(4000);
    assert_tables_close(&ab, &expected, 4000, 1e-12);

    // Interior root: the modified measure stays positive all the way down
    let ab = quadratic_modification_real(&legendre, 0.3).unwrap();
    assert!(ab.beta().iter().all(|&b| b > 0.0 && b.is_finite()));
    assert_abs_diff_eq!(ab.b(ab.len() - 1), 0.5, epsilon = 1e-3);
}

#[test]
fn test_quadratic_modification_margin() {
    let legendre = JacobiPolynomials::legendre().recurrence(2);
    assert!(matches!(
        quadratic_modification_real(&legendre, 3.0),
        Err(OpolyError::InsufficientMargin { required: 3, available: 2, .. })
    ));
}

#[test]
fn test_linear_division_round_trip() {
    let jac = JacobiPolynomials::new(0.0, 0.5).unwrap().recurrence(30);
    for &x0 in &[-1.5, 2.0] {
        let (modified, s1) = linear_modification(&jac, x0).unwrap();
        let (restored, s2) = linear_division(&modified, x0).unwrap();
        assert_eq!(s1, s2);
        assert_eq!(restored.len(), 28);
        assert_tables_close(&restored, &jac, 10, 1e-10);
    }
}

#[test]
fn test_linear_division_inside_support() {
    let legendre = JacobiPolynomials::legendre().recurrence(10);
    assert!(matches!(
        linear_division(&legendre, 0.1),
        Err(OpolyError::Configuration(_))
    ));
}

#[test]
fn test_discrete_stieltjes_reproduces_gauss_measure() {
    let legendre = JacobiPolynomials::legendre().recurrence(12);
    let (x, w) = legendre.gauss_quadrature(11).unwrap();
    let ab = discrete_stieltjes(&x, &w, 11).unwrap();
    assert_tables_close(&ab, &legendre, 11, 1e-12);
    assert!(discrete_stieltjes(&x, &w, 12).is_err());
}
