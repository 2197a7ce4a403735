//! Error types shared by every module of the crate.

/// Errors raised while building or using orthogonal polynomial families
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OpolyError {
    /// Malformed caller input: overlapping singularities, `a >= b`,
    /// non-positive recurrence coefficients, bad configuration values.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A recurrence table is too short for the requested operation.
    #[error("{context}: requires {required} recurrence pairs, only {available} available")]
    InsufficientMargin {
        required: usize,
        available: usize,
        context: String,
    },

    /// An adaptive loop did not meet its tolerance within its iteration cap.
    #[error("{context}: did not converge after {iterations} iterations (tolerance: {tolerance:.2e})")]
    NumericNonConvergence {
        iterations: usize,
        tolerance: f64,
        context: String,
    },

    /// A linear system is too ill-conditioned to be solved reliably.
    #[error("{context}: ill-conditioned system (condition number {condition:.3e})")]
    IllConditionedSystem { condition: f64, context: String },

    /// A recursion hit a zero pivot or produced a non-positive coefficient.
    #[error("numerical breakdown: {context}")]
    NumericalBreakdown { context: String },
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, OpolyError>;

impl OpolyError {
    pub(crate) fn margin(required: usize, available: usize, context: &str) -> Self {
        OpolyError::InsufficientMargin {
            required,
            available,
            context: context.to_string(),
        }
    }
}
