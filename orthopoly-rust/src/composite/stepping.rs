//! One-pair-at-a-time algorithms
//!
//! Given the pairs 0..i-1, each step returns (a_i, b_i). The predictor-corrector
//! variants first guess (a_i, b_i) = (a_{i-1}, b_{i-1}), which defines
//!
//!   b_{i-1} p̃_i = (x - a_{i-1}) p_{i-1} - b_{i-2} p_{i-2},
//!
//! and then correct a_i = a_{i-1} + b_{i-1} ∫ p_{i-1} p̃_i dμ. With the
//! corrected a_i the same recursion gives p̂_i = (b_i / b_{i-1}) p_i, hence
//! b_i = b_{i-1} (∫ p̂_i^2 dμ)^{1/2}.

use super::{CompositeRecurrence, RecurrenceAlgorithm};
use crate::error::{OpolyError, Result};
use crate::opoly::RecurrenceTable;
use crate::quadrature::{CompositeQuadrature, PolynomialFactor};

impl<W, Q> CompositeRecurrence<W, Q>
where
    W: Fn(f64) -> f64 + Sync,
    Q: CompositeQuadrature,
{
    /// The single pair (0, sqrt(mass)).
    pub(super) fn zeroth_row(&self) -> Result<RecurrenceTable> {
        let mass = self.mass()?;
        if !(mass > 0.0) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("measure has non-positive mass {}", mass),
            });
        }
        RecurrenceTable::from_mass(mass)
    }

    pub(super) fn next_row(&self, table: &RecurrenceTable) -> Result<(f64, f64)> {
        match self.algorithm {
            RecurrenceAlgorithm::Direct => self.direct_step(table),
            RecurrenceAlgorithm::ModifiedQuadrature => self.modified_step(table, false),
            RecurrenceAlgorithm::Recurrence => self.modified_step(table, true),
            RecurrenceAlgorithm::Stieltjes => self.stieltjes_step(table),
            RecurrenceAlgorithm::ArbitraryPolynomialChaos => Err(OpolyError::Configuration(
                "the moment-based algorithm builds all pairs at once".to_string(),
            )),
        }
    }

    /// Predictor-corrector step with pointwise polynomial evaluation.
    fn direct_step(&self, table: &RecurrenceTable) -> Result<(f64, f64)> {
        let i = table.len();
        let (a_prev, b_prev) = (table.a(i - 1), table.b(i - 1));
        let start = i + self.config.n_start;
        let one = PolynomialFactor::constant(1.0);

        let mut guess = table.clone();
        guess.push(a_prev, b_prev)?;
        let cross = |x: f64| guess.eval_point(x, i - 1) * guess.eval_point(x, i);
        let a = a_prev + b_prev * self.weighted_integral(&cross, &[], &one, start)?;

        let mut corrected = table.clone();
        corrected.push(a, b_prev)?;
        let square = |x: f64| corrected.eval_point(x, i).powi(2);
        let s = self.weighted_integral(&square, &[], &one, start)?;
        Ok((a, b_prev * s.sqrt()))
    }

    /// Predictor-corrector step with the polynomials absorbed into the
    /// quadrature: the a-integral carries the zeros of p_{i-1} and p̃_i as
    /// linear roots, the b-integral the zeros of p̂_i as quadratic roots.
    ///
    /// With `split_at_zeros` the b-integral is also split at the zeros of the
    /// a-step.
    fn modified_step(&self, table: &RecurrenceTable, split_at_zeros: bool) -> Result<(f64, f64)> {
        let i = table.len();
        let (a_prev, b_prev) = (table.a(i - 1), table.b(i - 1));
        let start = self.config.n_start;

        let mut guess = table.clone();
        guess.push(a_prev, b_prev)?;
        let (zeros_p, _) = guess.gauss_quadrature(i - 1)?;
        let (zeros_ptilde, _) = guess.gauss_quadrature(i)?;
        let lc = guess.leading_coefficient(i + 1)?;
        let zeros: Vec<f64> = zeros_p.iter().chain(&zeros_ptilde).copied().collect();

        let factor = PolynomialFactor::constant(lc[i - 1] * lc[i]).with_linear_roots(zeros.iter().copied());
        let a = a_prev + b_prev * self.weighted_integral(&|_| 1.0, &[], &factor, start)?;

        let mut corrected = table.clone();
        corrected.push(a, b_prev)?;
        let (zeros_phat, _) = corrected.gauss_quadrature(i)?;
        let lc_hat = corrected.leading_coefficient(i + 1)?[i];
        let factor = PolynomialFactor::constant(lc_hat * lc_hat).with_quadratic_roots(zeros_phat);
        let breaks: &[f64] = if split_at_zeros { &zeros } else { &[] };
        let s = self.weighted_integral(&|_| 1.0, breaks, &factor, start)?;
        Ok((a, b_prev * s.sqrt()))
    }

    /// Stieltjes step:
    ///
    ///   a_i = ∫ x p_{i-1}^2 dμ,
    ///   b_i^2 = ∫ x (x - a_i) p_{i-1}^2 dμ - b_{i-1} ∫ x p_{i-1} p_{i-2} dμ.
    fn stieltjes_step(&self, table: &RecurrenceTable) -> Result<(f64, f64)> {
        let n = table.len() - 1;
        let start = self.config.n_start;
        let (zeros_p, _) = table.gauss_quadrature(n)?;
        let lc = table.leading_coefficient(n + 1)?;
        let c = lc[n] * lc[n];

        let square = PolynomialFactor::constant(c).with_quadratic_roots(zeros_p.iter().copied());
        let a = self.weighted_integral(&|_| 1.0, &[], &square.clone().with_linear_roots([0.0]), start)?;
        let s1 = self.weighted_integral(&|_| 1.0, &[], &square.with_linear_roots([0.0, a]), start)?;

        let s2 = if n == 0 {
            0.0
        } else {
            let (zeros_pminus, _) = table.gauss_quadrature(n - 1)?;
            let cross = PolynomialFactor::constant(table.b(n) * lc[n] * lc[n - 1])
                .with_linear_roots(zeros_p.iter().chain(&zeros_pminus).copied())
                .with_linear_roots([0.0]);
            self.weighted_integral(&|_| 1.0, &[], &cross, start)?
        };

        let beta2 = s1 - s2;
        if !(beta2 > 0.0) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("Stieltjes step {}: b^2 = {} is not positive", n + 1, beta2),
            });
        }
        Ok((a, beta2.sqrt()))
    }
}
