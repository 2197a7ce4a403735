//! Closed-form Jacobi recurrence coefficients and affine mapping of tables
//!
//! The Jacobi weight on [-1, 1] is (1 - u)^alpha (1 + u)^beta with
//! alpha, beta > -1. Legendre is alpha = beta = 0.

use crate::error::{OpolyError, Result};
use crate::family::RecurrenceSource;
use crate::opoly::RecurrenceTable;
use crate::special_functions::ln_gamma;

/// Jacobi polynomial family on [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JacobiPolynomials {
    pub alpha: f64,
    pub beta: f64,
    /// Normalise the weight to unit mass (b_0 = 1)
    pub probability_measure: bool,
}

impl JacobiPolynomials {
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha > -1.0 && beta > -1.0) {
            return Err(OpolyError::Configuration(format!(
                "Jacobi parameters must exceed -1 (alpha = {}, beta = {})",
                alpha, beta
            )));
        }
        Ok(Self {
            alpha,
            beta,
            probability_measure: false,
        })
    }

    /// Legendre family, alpha = beta = 0
    pub fn legendre() -> Self {
        Self {
            alpha: 0.0,
            beta: 0.0,
            probability_measure: false,
        }
    }

    pub fn with_probability_measure(mut self, probability_measure: bool) -> Self {
        self.probability_measure = probability_measure;
        self
    }

    /// Total mass 2^{alpha+beta+1} B(alpha+1, beta+1) of the weight.
    pub fn mass(&self) -> f64 {
        let (a, b) = (self.alpha, self.beta);
        ((a + b + 1.0) * std::f64::consts::LN_2 + ln_gamma(a + 1.0) + ln_gamma(b + 1.0)
            - ln_gamma(a + b + 2.0))
        .exp()
    }

    /// Monic recurrence coefficient alpha_k (the diagonal of the Jacobi matrix).
    fn monic_alpha(&self, k: usize) -> f64 {
        let (a, b) = (self.alpha, self.beta);
        if k == 0 {
            return (b - a) / (a + b + 2.0);
        }
        let s = 2.0 * k as f64 + a + b;
        (b * b - a * a) / (s * (s + 2.0))
    }

    /// Monic recurrence coefficient beta_k for k >= 1.
    fn monic_beta(&self, k: usize) -> f64 {
        let (a, b) = (self.alpha, self.beta);
        if k == 1 {
            let s = 2.0 + a + b;
            return 4.0 * (1.0 + a) * (1.0 + b) / (s * s * (s + 1.0));
        }
        let kf = k as f64;
        let s = 2.0 * kf + a + b;
        4.0 * kf * (kf + a) * (kf + b) * (kf + a + b) / (s * s * (s + 1.0) * (s - 1.0))
    }

    /// Orthonormal recurrence table with `rows` pairs (degrees 0..rows-1).
    pub fn recurrence(&self, rows: usize) -> RecurrenceTable {
        let mut alpha = Vec::with_capacity(rows);
        let mut beta = Vec::with_capacity(rows);
        for n in 0..rows {
            if n == 0 {
                alpha.push(0.0);
                beta.push(if self.probability_measure {
                    1.0
                } else {
                    self.mass().sqrt()
                });
            } else {
                alpha.push(self.monic_alpha(n - 1));
                beta.push(self.monic_beta(n).sqrt());
            }
        }
        RecurrenceTable::from_parts_unchecked(alpha, beta)
    }
}

impl RecurrenceSource for JacobiPolynomials {
    fn recurrence(&self, rows: usize) -> Result<RecurrenceTable> {
        Ok(JacobiPolynomials::recurrence(self, rows))
    }
}

/// Recurrence table of the measure pushed forward from [-1, 1] to [a, b]
/// by x = (b - a)/2 u + (a + b)/2.
///
/// The total mass scales by (b - a)/2, so b_0 does too (by its square root).
pub fn affine_mapping(table: &RecurrenceTable, a: f64, b: f64) -> Result<RecurrenceTable> {
    if !(a < b) || !a.is_finite() || !b.is_finite() {
        return Err(OpolyError::Configuration(format!(
            "affine mapping needs a finite interval with a < b, got [{}, {}]",
            a, b
        )));
    }
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);

    let alpha = table
        .alpha()
        .iter()
        .enumerate()
        .map(|(n, &an)| if n == 0 { 0.0 } else { half * an + mid })
        .collect();
    let beta = table
        .beta()
        .iter()
        .enumerate()
        .map(|(n, &bn)| if n == 0 { bn * half.sqrt() } else { bn * half })
        .collect();
    Ok(RecurrenceTable::from_parts_unchecked(alpha, beta))
}
