//! Arbitrary polynomial chaos: orthogonal polynomials from raw moments
//!
//! The monic π_k has coefficients c solving
//!
//!   Σ_j c_j m_{i+j} = 0 for i < k,   c_k = 1,
//!
//! with m_j = ∫ x^j dμ. The system is a bordered Hankel matrix and its
//! condition number grows exponentially with k, so it is checked before
//! every solve.

use super::CompositeRecurrence;
use crate::error::{OpolyError, Result};
use crate::opoly::RecurrenceTable;
use crate::quadrature::{CompositeQuadrature, PolynomialFactor};
use crate::special_functions::evalpoly;
use nalgebra::{DMatrix, DVector};

/// Ratio of largest to smallest singular value.
pub(crate) fn condition_number(m: &DMatrix<f64>) -> f64 {
    let sv = m.clone().svd(false, false).singular_values;
    let (max, min) = (sv.max(), sv.min());
    if min > 0.0 {
        max / min
    } else {
        f64::INFINITY
    }
}

impl<W, Q> CompositeRecurrence<W, Q>
where
    W: Fn(f64) -> f64 + Sync,
    Q: CompositeQuadrature,
{
    #[tracing::instrument(skip_all, name = "CompositeRecurrence::apc_recurrence", fields(n = n))]
    pub(super) fn apc_recurrence(&self, n: usize) -> Result<RecurrenceTable> {
        let start = self.config.n_start;
        let moments = (0..(2 * n).max(1))
            .map(|j| {
                let monomial = PolynomialFactor::constant(1.0).with_linear_roots(std::iter::repeat(0.0).take(j));
                self.weighted_integral(&|_| 1.0, &[], &monomial, start)
            })
            .collect::<Result<Vec<f64>>>()?;

        let coefficients = (0..=n)
            .map(|k| self.monic_coefficients(&moments, k))
            .collect::<Result<Vec<Vec<f64>>>>()?;
        let one = PolynomialFactor::constant(1.0);
        let norms = coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| {
                let square = |x: f64| evalpoly(x, c).powi(2);
                Ok(self.weighted_integral(&square, &[], &one, start + k)?.sqrt())
            })
            .collect::<Result<Vec<f64>>>()?;

        let p = |k: usize, x: f64| evalpoly(x, &coefficients[k]) / norms[k];
        let mut table = RecurrenceTable::from_mass(norms[0] * norms[0])?;
        for i in 1..=n {
            let order = start + i;
            let a = self.weighted_integral(&|x: f64| x * p(i - 1, x).powi(2), &[], &one, order)?;
            let s1 = self.weighted_integral(&|x: f64| x * (x - a) * p(i - 1, x).powi(2), &[], &one, order)?;
            let s2 = if i >= 2 {
                table.b(i - 1) * self.weighted_integral(&|x: f64| x * p(i - 1, x) * p(i - 2, x), &[], &one, order)?
            } else {
                0.0
            };
            tracing::debug!(degree = i, a, b2 = s1 - s2, "moment-based pair");
            table.push(a, (s1 - s2).sqrt())?;
        }
        Ok(table)
    }

    /// Monomial coefficients (ascending) of the monic π_k.
    fn monic_coefficients(&self, moments: &[f64], k: usize) -> Result<Vec<f64>> {
        let size = k + 1;
        let mut system = DMatrix::<f64>::zeros(size, size);
        for i in 0..k {
            for j in 0..size {
                system[(i, j)] = moments[i + j];
            }
        }
        system[(k, k)] = 1.0;
        let mut rhs = DVector::<f64>::zeros(size);
        rhs[k] = 1.0;

        let condition = condition_number(&system);
        if condition > self.config.apc_max_condition {
            return Err(OpolyError::IllConditionedSystem {
                condition,
                context: format!("moment system of degree {}", k),
            });
        }
        if condition > self.config.apc_warn_condition {
            tracing::warn!(degree = k, condition, "moment system is ill-conditioned");
        }

        let solution = system.lu().solve(&rhs).ok_or_else(|| OpolyError::NumericalBreakdown {
            context: format!("singular moment system of degree {}", k),
        })?;
        Ok(solution.iter().copied().collect())
    }
}
