//! Adaptive composite integration over the domain of the engine

use super::CompositeRecurrence;
use crate::error::{OpolyError, Result};
use crate::partition::{compute_subintervals, Singularity, PARTITION_TOLERANCE};
use crate::quadrature::{CompositeQuadrature, PolynomialFactor};
use rayon::prelude::*;

type Integrand<'a> = &'a (dyn Fn(f64) -> f64 + Sync);

#[derive(Debug, Clone, Copy, PartialEq)]
enum Direction {
    Left,
    Right,
}

/// Break points of [lo, hi]: both ends, then every singularity and every
/// extra point strictly inside, sorted.
///
/// A point within [`PARTITION_TOLERANCE`] of an end or of a break already
/// kept is dropped; singularities are kept first and so take precedence.
pub(crate) fn demarcation(lo: f64, hi: f64, singularities: &[Singularity], points: &[f64]) -> Vec<f64> {
    let tol = PARTITION_TOLERANCE;
    let inside = |x: f64| x.is_finite() && x > lo + tol && x < hi - tol;

    let mut breaks: Vec<f64> = singularities
        .iter()
        .map(|s| s.location)
        .filter(|&x| inside(x))
        .collect();
    for &x in points {
        if inside(x) && breaks.iter().all(|&b| (b - x).abs() > tol) {
            breaks.push(x);
        }
    }
    breaks.sort_by(f64::total_cmp);
    breaks.insert(0, lo);
    breaks.push(hi);
    breaks
}

/// Move every root lying within tolerance of a break onto that break.
fn snap(roots: &[f64], breaks: &[f64]) -> Vec<f64> {
    roots
        .iter()
        .map(|&r| {
            breaks
                .iter()
                .copied()
                .find(|&b| b.is_finite() && (b - r).abs() <= PARTITION_TOLERANCE)
                .unwrap_or(r)
        })
        .collect()
}

impl<W, Q> CompositeRecurrence<W, Q>
where
    W: Fn(f64) -> f64 + Sync,
    Q: CompositeQuadrature,
{
    /// ∫ factor(x) f(x) w(x) dx over the whole domain.
    ///
    /// The domain is split at the singularities, at the real linear roots of
    /// `factor` and at `extra_breaks`. `start` is the initial number of nodes
    /// per piece.
    pub(crate) fn weighted_integral(
        &self,
        f: Integrand<'_>,
        extra_breaks: &[f64],
        factor: &PolynomialFactor,
        start: usize,
    ) -> Result<f64> {
        let (lo, hi) = self.domain;
        self.integrate_over(lo, hi, f, extra_breaks, factor, start)
    }

    pub(crate) fn integrate_over(
        &self,
        lo: f64,
        hi: f64,
        f: Integrand<'_>,
        extra_breaks: &[f64],
        factor: &PolynomialFactor,
        start: usize,
    ) -> Result<f64> {
        let points: Vec<f64> = factor
            .linear_roots
            .iter()
            .chain(extra_breaks)
            .copied()
            .collect();
        let breaks = demarcation(lo, hi, &self.singularities, &points);
        let factor = PolynomialFactor {
            linear_roots: snap(&factor.linear_roots, &breaks),
            ..factor.clone()
        };
        let weighted = |x: f64| (self.weight)(x) * f(x);

        let spans: Vec<(f64, f64)> = breaks.windows(2).map(|p| (p[0], p[1])).collect();
        let values = spans
            .par_iter()
            .map(|&(l, r)| self.integrate_span(&weighted, l, r, &factor, start))
            .collect::<Result<Vec<f64>>>()?;
        Ok(values.iter().sum())
    }

    /// One span between consecutive breaks; either end may be infinite.
    fn integrate_span(
        &self,
        f: Integrand<'_>,
        l: f64,
        r: f64,
        factor: &PolynomialFactor,
        start: usize,
    ) -> Result<f64> {
        match (l.is_finite(), r.is_finite()) {
            (true, true) => self.refine(f, l, r, factor, start),
            (false, true) => self.extend_toward(f, r, Direction::Left, factor, start),
            (true, false) => self.extend_toward(f, l, Direction::Right, factor, start),
            (false, false) => {
                let center = self.refine(f, -1.0, 1.0, factor, start)?;
                let left = self.extend_toward(f, -1.0, Direction::Left, factor, start)?;
                let right = self.extend_toward(f, 1.0, Direction::Right, factor, start)?;
                Ok(center + left + right)
            }
        }
    }

    /// Add nodes until two successive estimates on [l, r] agree.
    fn refine(&self, f: Integrand<'_>, l: f64, r: f64, factor: &PolynomialFactor, start: usize) -> Result<f64> {
        let pieces = compute_subintervals(l, r, &self.singularities)?;
        let mut order = start;
        let mut s = self.quadrature.integrate(f, &pieces, order, factor)?;
        for _ in 0..self.config.max_refinements {
            order += self.config.n_step;
            let s_new = self.quadrature.integrate(f, &pieces, order, factor)?;
            if self.converged(s - s_new, s_new) {
                tracing::trace!(l, r, order, value = s_new, "quadrature converged");
                return Ok(s_new);
            }
            s = s_new;
        }
        Err(OpolyError::NumericNonConvergence {
            iterations: self.config.max_refinements,
            tolerance: self.config.tol,
            context: format!("quadrature refinement on [{}, {}]", l, r),
        })
    }

    /// Integrate over steps of fixed width away from `edge` until a step
    /// contributes nothing.
    fn extend_toward(
        &self,
        f: Integrand<'_>,
        edge: f64,
        direction: Direction,
        factor: &PolynomialFactor,
        start: usize,
    ) -> Result<f64> {
        let mut total = 0.0;
        let mut edge = edge;
        for step in 0..self.config.max_extensions {
            let (l, r) = match direction {
                Direction::Left => (edge - self.config.l_step, edge),
                Direction::Right => (edge, edge + self.config.r_step),
            };
            let q = self.refine(f, l, r, factor, start)?;
            total += q;
            edge = if direction == Direction::Left { l } else { r };
            if self.converged(q, total) {
                tracing::trace!(?direction, steps = step + 1, edge, "extension converged");
                return Ok(total);
            }
        }
        Err(OpolyError::NumericNonConvergence {
            iterations: self.config.max_extensions,
            tolerance: self.config.tol,
            context: format!("extension toward {:?} infinity, reached {}", direction, edge),
        })
    }

    fn converged(&self, delta: f64, value: f64) -> bool {
        delta.abs() <= self.config.tol * value.abs().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demarcation_orders_and_filters() {
        let sing = [Singularity::new(0.5, -0.5, -0.5)];
        let breaks = demarcation(-1.0, 1.0, &sing, &[0.2, -0.3, 0.5 + 1e-10, 1.0, 3.0, -0.3]);
        assert_eq!(breaks, vec![-1.0, -0.3, 0.2, 0.5, 1.0]);
    }

    #[test]
    fn test_demarcation_infinite_domain() {
        let breaks = demarcation(f64::NEG_INFINITY, f64::INFINITY, &[], &[]);
        assert_eq!(breaks, vec![f64::NEG_INFINITY, f64::INFINITY]);

        let breaks = demarcation(0.0, f64::INFINITY, &[Singularity::regular(0.0)], &[2.0]);
        assert_eq!(breaks, vec![0.0, 2.0, f64::INFINITY]);
    }

    #[test]
    fn test_snap_to_breaks() {
        let breaks = [-1.0, 0.0, 1.0];
        let snapped = snap(&[1e-12, -1.0 - 1e-9, 0.5], &breaks);
        assert_eq!(snapped, vec![0.0, -1.0, 0.5]);
    }
}
