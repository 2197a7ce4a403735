//! Log-Gamma and polynomial helpers
//!
//! Leading coefficients of orthonormal polynomials and the total mass of
//! Jacobi weights are products of Gamma functions that overflow quickly,
//! so most callers go through [`ln_gamma`] and exponentiate at the end.

use std::f64::consts::PI;

/// ln(sqrt(2π))
const LN_SQRT_2PI: f64 = 0.918_938_533_204_672_8;

/// Shift threshold above which the Stirling series is accurate to machine precision
const STIRLING_CUTOFF: f64 = 10.0;

/// Evaluate polynomial using Horner's method
pub(crate) fn evalpoly(x: f64, coeffs: &[f64]) -> f64 {
    let mut result = 0.0;
    for &coeff in coeffs.iter().rev() {
        result = result * x + coeff;
    }
    result
}

fn sinpi(x: f64) -> f64 {
    (PI * x).sin()
}

/// Natural logarithm of |Γ(x)|
///
/// Uses the Stirling series after shifting the argument above
/// `STIRLING_CUTOFF`, and the reflection formula for x < 0.5.
/// Returns +∞ at the poles.
pub fn ln_gamma(x: f64) -> f64 {
    if x.is_nan() {
        return f64::NAN;
    }
    if x <= 0.0 && x == x.floor() {
        return f64::INFINITY;
    }
    if x < 0.5 {
        // Γ(x)Γ(1-x) = π / sin(πx)
        return (PI / sinpi(x).abs()).ln() - ln_gamma(1.0 - x);
    }

    let mut shift = 0.0;
    let mut y = x;
    while y < STIRLING_CUTOFF {
        shift += y.ln();
        y += 1.0;
    }

    let inv = 1.0 / y;
    let inv2 = inv * inv;
    let series = inv
        * evalpoly(
            inv2,
            &[
                1.0 / 12.0,
                -1.0 / 360.0,
                1.0 / 1260.0,
                -1.0 / 1680.0,
                1.0 / 1188.0,
                -691.0 / 360_360.0,
            ],
        );

    (y - 0.5) * y.ln() - y + LN_SQRT_2PI + series - shift
}
