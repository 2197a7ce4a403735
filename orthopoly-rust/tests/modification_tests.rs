mod common;

use common::{laguerre_table, legendre_table, max_table_error};
use orthopoly::{
    linear_division, linear_modification, quadratic_modification, quadratic_modification_real, Complex,
    JacobiPolynomials, OpolyError,
};

#[test]
fn test_linear_modification_then_division() {
    let table = JacobiPolynomials::new(0.3, -0.6).unwrap().recurrence(40);
    for &x0 in &[-1.2, -3.0, 1.5, 10.0] {
        let (modified, sign) = linear_modification(&table, x0).unwrap();
        assert_eq!(modified.len(), 39);
        assert_eq!(sign, if x0 < -1.0 { 1.0 } else { -1.0 });

        let (restored, back) = linear_division(&modified, x0).unwrap();
        assert_eq!(back, sign);
        let err = max_table_error(&restored, &table, 12);
        assert!(err < 1e-10, "x0 = {}: error {:.3e}", x0, err);
    }
}

#[test]
fn test_endpoint_modifications_give_jacobi() {
    let legendre = legendre_table(20);
    // (1 + x)^2 dx is Jacobi(0, 2)
    let modified = quadratic_modification_real(&legendre, -1.0).unwrap();
    let expected = JacobiPolynomials::new(0.0, 2.0).unwrap().recurrence(18);
    assert!(max_table_error(&modified, &expected, 18) < 1e-12);

    // (1 - x)(1 + x) dx is Jacobi(1, 1)
    let (once, s1) = linear_modification(&legendre, 1.0).unwrap();
    let (twice, s2) = linear_modification(&once, -1.0).unwrap();
    assert_eq!((s1, s2), (-1.0, 1.0));
    let expected = JacobiPolynomials::new(1.0, 1.0).unwrap().recurrence(18);
    assert!(max_table_error(&twice, &expected, 18) < 1e-12);
}

#[test]
fn test_quadratic_modification_outside_support_is_consistent() {
    // Outside the support |x - z|^2 never changes sign: two linear steps agree
    let table = laguerre_table(30);
    let x0 = -0.75;
    let quad = quadratic_modification_real(&table, x0).unwrap();
    let (once, _) = linear_modification(&table, x0).unwrap();
    let (twice, _) = linear_modification(&once, x0).unwrap();
    let err = max_table_error(&quad, &twice, 20);
    assert!(err < 1e-9, "error {:.3e}", err);

    // Conjugate roots give the same measure
    let z = Complex::new(0.4, 1.3);
    let a = quadratic_modification(&table, z).unwrap();
    let b = quadratic_modification(&table, z.conj()).unwrap();
    assert!(max_table_error(&a, &b, 20) < 1e-10);
}

#[test]
fn test_insufficient_margin() {
    let table = legendre_table(2);
    match quadratic_modification_real(&table, 0.5) {
        Err(OpolyError::InsufficientMargin { required, available, .. }) => {
            assert_eq!((required, available), (3, 2));
        }
        other => panic!("expected insufficient margin, got {:?}", other),
    }
    assert!(matches!(
        table.gauss_quadrature(2),
        Err(OpolyError::InsufficientMargin { .. })
    ));
}
