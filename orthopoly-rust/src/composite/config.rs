//! Tuning knobs of the composite engine

use crate::error::{OpolyError, Result};

/// Configuration of [`super::CompositeRecurrence`]
///
/// Every adaptive loop is bounded: refinement by `max_refinements`,
/// extension toward an infinite endpoint by `max_extensions`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeConfig {
    /// Width of each step toward -∞.
    pub l_step: f64,
    /// Width of each step toward +∞.
    pub r_step: f64,
    /// Initial number of quadrature nodes per piece.
    pub n_start: usize,
    /// Nodes added at every refinement.
    pub n_step: usize,
    /// Convergence tolerance, absolute for values below one and relative above.
    pub tol: f64,
    pub max_refinements: usize,
    pub max_extensions: usize,
    /// Condition number above which the moment solve logs a warning.
    pub apc_warn_condition: f64,
    /// Condition number above which the moment solve fails.
    pub apc_max_condition: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            l_step: 2.0,
            r_step: 2.0,
            n_start: 10,
            n_step: 10,
            tol: 1e-10,
            max_refinements: 64,
            max_extensions: 1000,
            apc_warn_condition: 1e8,
            apc_max_condition: 1e14,
        }
    }
}

impl CompositeConfig {
    pub fn new(tol: f64) -> Self {
        Self {
            tol,
            ..Self::default()
        }
    }

    pub fn with_steps(mut self, l_step: f64, r_step: f64) -> Self {
        self.l_step = l_step;
        self.r_step = r_step;
        self
    }

    pub fn with_orders(mut self, n_start: usize, n_step: usize) -> Self {
        self.n_start = n_start;
        self.n_step = n_step;
        self
    }

    pub fn with_max_refinements(mut self, max_refinements: usize) -> Self {
        self.max_refinements = max_refinements;
        self
    }

    pub fn with_max_extensions(mut self, max_extensions: usize) -> Self {
        self.max_extensions = max_extensions;
        self
    }

    pub fn with_apc_conditions(mut self, warn: f64, max: f64) -> Self {
        self.apc_warn_condition = warn;
        self.apc_max_condition = max;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.tol) {
            return Err(OpolyError::Configuration(format!(
                "tolerance must be positive, got {}",
                self.tol
            )));
        }
        if !(positive(self.l_step) && positive(self.r_step)) {
            return Err(OpolyError::Configuration(format!(
                "extension steps must be positive, got ({}, {})",
                self.l_step, self.r_step
            )));
        }
        if self.n_start == 0 || self.n_step == 0 {
            return Err(OpolyError::Configuration(format!(
                "quadrature orders must be positive, got n_start = {}, n_step = {}",
                self.n_start, self.n_step
            )));
        }
        if self.max_refinements == 0 || self.max_extensions == 0 {
            return Err(OpolyError::Configuration(
                "iteration caps must be at least one".to_string(),
            ));
        }
        if !(positive(self.apc_warn_condition) && self.apc_warn_condition <= self.apc_max_condition) {
            return Err(OpolyError::Configuration(format!(
                "condition thresholds must satisfy 0 < warn <= max, got ({}, {})",
                self.apc_warn_condition, self.apc_max_condition
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = CompositeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.n_start, 10);
        assert_eq!(config.tol, 1e-10);
    }

    #[test]
    fn test_builders() {
        let config = CompositeConfig::new(1e-8)
            .with_steps(1.0, 3.0)
            .with_orders(5, 4)
            .with_max_refinements(8)
            .with_max_extensions(20);
        assert_eq!(config.tol, 1e-8);
        assert_eq!((config.l_step, config.r_step), (1.0, 3.0));
        assert_eq!((config.n_start, config.n_step), (5, 4));
        assert_eq!((config.max_refinements, config.max_extensions), (8, 20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_config() {
        assert!(CompositeConfig::new(0.0).validate().is_err());
        assert!(CompositeConfig::new(f64::NAN).validate().is_err());
        assert!(CompositeConfig::default().with_steps(-1.0, 2.0).validate().is_err());
        assert!(CompositeConfig::default().with_orders(0, 10).validate().is_err());
        assert!(CompositeConfig::default().with_max_refinements(0).validate().is_err());
        assert!(CompositeConfig::default()
            .with_apc_conditions(1e10, 1e8)
            .validate()
            .is_err());
    }
}
