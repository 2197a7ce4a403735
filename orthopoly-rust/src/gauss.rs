//! Gauss quadrature rules for numerical integration
//!
//! The integral of f(x) * omega(x) is approximated by a weighted sum:
//!
//! sum(f(xi) * wi for (xi, wi) in zip(x, w))
//!
//! where we generally have superexponential convergence for smooth f(x)
//! with the number of quadrature points. Rules are extracted from recurrence
//! tables through the eigen-decomposition of the Jacobi matrix (Golub-Welsch).

use crate::error::Result;
use crate::jacobi::JacobiPolynomials;
use crate::opoly::RecurrenceTable;

/// Gauss rule of a measure supported on [a, b].
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Quadrature points, ascending
    pub x: Vec<f64>,
    /// Quadrature weights, summing to the mass of the measure
    pub w: Vec<f64>,
    /// Left end of the support
    pub a: f64,
    /// Right end of the support
    pub b: f64,
}

impl Rule {
    /// Gauss rule of `n` points for the measure described by `table`.
    ///
    /// `[a, b]` is the support of the measure; it only tags the rule.
    /// Requires n+1 pairs.
    pub fn from_recurrence(table: &RecurrenceTable, n: usize, a: f64, b: f64) -> Result<Self> {
        let (x, w) = table.gauss_quadrature(n)?;
        Ok(Self { x, w, a, b })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Total mass seen by the rule.
    pub fn mass(&self) -> f64 {
        self.w.iter().sum()
    }

    /// Apply the rule to `f`.
    pub fn integrate<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        self.x.iter().zip(&self.w).map(|(&x, &w)| w * f(x)).sum()
    }
}

/// Gauss-Legendre rule of `n` points on [-1, 1].
pub fn legendre(n: usize) -> Result<Rule> {
    jacobi(n, 0.0, 0.0)
}

/// Gauss-Jacobi rule of `n` points for (1 - x)^alpha (1 + x)^beta on [-1, 1].
pub fn jacobi(n: usize, alpha: f64, beta: f64) -> Result<Rule> {
    let table = JacobiPolynomials::new(alpha, beta)?.recurrence(n + 1);
    Rule::from_recurrence(&table, n, -1.0, 1.0)
}

#[cfg(test)]
#[path = "gauss_tests.rs"]
mod tests;
