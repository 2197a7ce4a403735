//! Recurrence coefficients of measures given by a weight function
//!
//! The measure dμ(x) = w(x) dx lives on a (possibly unbounded) interval and may
//! carry power-law singularities at declared points. Every integral is split at
//! the singularities and at the real zeros of the polynomials involved, each
//! piece is integrated with a Gauss-Jacobi rule refined until two successive
//! estimates agree, and unbounded ends are covered by stepping outward until a
//! step contributes nothing.
//!
//! Five algorithms build the table of (a_n, b_n) from these integrals; see
//! [`RecurrenceAlgorithm`].

mod apc;
mod config;
mod integrate;
mod stepping;

pub use config::CompositeConfig;

use crate::error::{OpolyError, Result};
use crate::family::RecurrenceSource;
use crate::opoly::RecurrenceTable;
use crate::partition::{Singularity, PARTITION_TOLERANCE};
use crate::quadrature::{CompositeQuadrature, GaussJacobiComposite, PolynomialFactor};

/// How the engine produces the next recurrence pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecurrenceAlgorithm {
    /// Guess the next pair, correct it from ∫ w p_n p̃_{n+1} and ∫ w p̂_{n+1}^2,
    /// evaluating the polynomials pointwise.
    Direct,
    /// As `Direct`, with the polynomial factors absorbed into the quadrature
    /// measure through linear and quadratic modifications.
    ModifiedQuadrature,
    /// As `ModifiedQuadrature`, and the b-step also splits at the zeros used
    /// by the a-step.
    #[default]
    Recurrence,
    /// Stieltjes procedure with all moments of p_n^2 taken through modifications.
    Stieltjes,
    /// Monic coefficients from the moment (Hankel) system, then Stieltjes.
    ArbitraryPolynomialChaos,
}

/// Recurrence engine for the measure w(x) dx on `domain`
pub struct CompositeRecurrence<W, Q = GaussJacobiComposite> {
    domain: (f64, f64),
    weight: W,
    singularities: Vec<Singularity>,
    config: CompositeConfig,
    quadrature: Q,
    algorithm: RecurrenceAlgorithm,
}

impl<W> CompositeRecurrence<W, GaussJacobiComposite>
where
    W: Fn(f64) -> f64 + Sync,
{
    /// Engine with the default configuration, the Gauss-Jacobi composite rule
    /// and [`RecurrenceAlgorithm::Recurrence`].
    ///
    /// Either end of `domain` may be infinite. Singularities must be finite;
    /// those further than [`PARTITION_TOLERANCE`] outside the domain are
    /// dropped, and the rest must be pairwise separated by more than it.
    pub fn new(domain: (f64, f64), weight: W, singularities: Vec<Singularity>) -> Result<Self> {
        let (a, b) = domain;
        if !(a < b) {
            return Err(OpolyError::Configuration(format!(
                "domain requires a < b, got ({}, {})",
                a, b
            )));
        }
        if let Some(s) = singularities
            .iter()
            .find(|s| !(s.location.is_finite() && s.left_exponent.is_finite() && s.right_exponent.is_finite()))
        {
            return Err(OpolyError::Configuration(format!("malformed singularity {:?}", s)));
        }
        // Singularities off the domain never reach a partition
        let tol = PARTITION_TOLERANCE;
        let singularities: Vec<Singularity> = singularities
            .into_iter()
            .filter(|s| s.location >= a - tol && s.location <= b + tol)
            .collect();
        let mut locations: Vec<f64> = singularities.iter().map(|s| s.location).collect();
        locations.sort_by(f64::total_cmp);
        if let Some(pair) = locations.windows(2).find(|p| p[1] - p[0] < tol) {
            return Err(OpolyError::Configuration(format!(
                "overlapping singularities at {} and {}",
                pair[0], pair[1]
            )));
        }

        Ok(Self {
            domain,
            weight,
            singularities,
            config: CompositeConfig::default(),
            quadrature: GaussJacobiComposite,
            algorithm: RecurrenceAlgorithm::default(),
        })
    }
}

impl<W, Q> CompositeRecurrence<W, Q>
where
    W: Fn(f64) -> f64 + Sync,
    Q: CompositeQuadrature,
{
    pub fn with_config(mut self, config: CompositeConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    pub fn with_algorithm(mut self, algorithm: RecurrenceAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Swap the per-piece quadrature.
    pub fn with_quadrature<Q2: CompositeQuadrature>(self, quadrature: Q2) -> CompositeRecurrence<W, Q2> {
        CompositeRecurrence {
            domain: self.domain,
            weight: self.weight,
            singularities: self.singularities,
            config: self.config,
            quadrature,
            algorithm: self.algorithm,
        }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn singularities(&self) -> &[Singularity] {
        &self.singularities
    }

    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    pub fn algorithm(&self) -> RecurrenceAlgorithm {
        self.algorithm
    }

    /// Table with degrees 0..=n (n+1 pairs).
    #[tracing::instrument(
        skip_all,
        name = "CompositeRecurrence::compute",
        fields(n = n, algorithm = ?self.algorithm)
    )]
    pub fn compute(&self, n: usize) -> Result<RecurrenceTable> {
        if self.algorithm == RecurrenceAlgorithm::ArbitraryPolynomialChaos {
            return self.apc_recurrence(n);
        }
        let mut table = self.zeroth_row()?;
        self.step_to(&mut table, n + 1)?;
        Ok(table)
    }

    /// Total mass ∫ w dx.
    pub fn mass(&self) -> Result<f64> {
        self.weighted_integral(&|_| 1.0, &[], &PolynomialFactor::constant(1.0), self.config.n_start)
    }

    /// ∫_a^x p_n^2 dμ, the distribution function of the n-th induced measure.
    ///
    /// `table` must be the table of this measure with at least n+1 pairs;
    /// the value then increases from 0 at the left end to 1 at the right end.
    pub fn induced_primitive(&self, table: &RecurrenceTable, n: usize, x: f64) -> Result<f64> {
        table.require(n + 1, "induced_primitive")?;
        let (lo, hi) = self.domain;
        if x.is_nan() {
            return Err(OpolyError::Configuration("induced_primitive at NaN".to_string()));
        }
        if x <= lo {
            return Ok(0.0);
        }

        let (zeros, _) = table.gauss_quadrature(n)?;
        let lc = table.leading_coefficient(n + 1)?[n];
        let factor = PolynomialFactor::constant(lc * lc).with_quadratic_roots(zeros);
        self.integrate_over(lo, x.min(hi), &|_| 1.0, &[], &factor, self.config.n_start)
    }

    fn step_to(&self, table: &mut RecurrenceTable, rows: usize) -> Result<()> {
        while table.len() < rows {
            let (a, b) = self.next_row(table)?;
            tracing::debug!(degree = table.len(), a, b, "recurrence pair");
            table.push(a, b)?;
        }
        Ok(())
    }
}

impl<W, Q> RecurrenceSource for CompositeRecurrence<W, Q>
where
    W: Fn(f64) -> f64 + Sync,
    Q: CompositeQuadrature,
{
    fn recurrence(&self, rows: usize) -> Result<RecurrenceTable> {
        self.compute(rows.saturating_sub(1))?.truncate(rows)
    }

    /// Stepwise algorithms continue from the given prefix; the moment-based
    /// one recomputes.
    fn extend(&self, table: &mut RecurrenceTable, rows: usize) -> Result<()> {
        if table.len() >= rows {
            return Ok(());
        }
        if self.algorithm == RecurrenceAlgorithm::ArbitraryPolynomialChaos {
            let fresh = self.apc_recurrence(rows - 1)?;
            for n in table.len()..rows {
                table.push(fresh.a(n), fresh.b(n))?;
            }
            return Ok(());
        }
        if table.is_empty() {
            *table = self.zeroth_row()?;
        }
        self.step_to(table, rows)
    }
}

/// Recurrence table with degrees 0..=n of w(x) dx on `domain`.
///
/// Uses the default configuration with tolerance `tol`.
pub fn compute_recurrence<W>(
    weight: W,
    domain: (f64, f64),
    singularities: &[Singularity],
    n: usize,
    tol: f64,
    algorithm: RecurrenceAlgorithm,
) -> Result<RecurrenceTable>
where
    W: Fn(f64) -> f64 + Sync,
{
    CompositeRecurrence::new(domain, weight, singularities.to_vec())?
        .with_config(CompositeConfig::new(tol))?
        .with_algorithm(algorithm)
        .compute(n)
}
