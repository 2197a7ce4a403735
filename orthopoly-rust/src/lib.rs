//! # orthopoly: orthogonal polynomials of arbitrary measures
//!
//! Recurrence coefficients, evaluation, Gauss quadrature, measure
//! modifications and induced-distribution sampling for univariate
//! orthonormal polynomial families, including families defined only through
//! a weight function on a possibly unbounded interval with power-law
//! singularities.

pub mod composite; // Recurrence coefficients from a weight function
pub mod error;
pub mod family; // Memoized families over a recurrence source
pub mod gauss;
pub mod induced; // Markov-Stieltjes brackets and inverse induced CDFs
pub mod jacobi;
pub mod modification; // Christoffel modifications of a measure
pub mod opoly;
pub mod partition;
pub mod quadrature;
pub mod special_functions;

// Re-export commonly used types and functions
pub use composite::{compute_recurrence, CompositeConfig, CompositeRecurrence, RecurrenceAlgorithm};
pub use error::{OpolyError, Result};
pub use family::{OrthogonalPolynomialBasis1D, RecurrenceSource};
pub use gauss::{jacobi as gauss_jacobi, legendre, Rule};
pub use induced::{idistinv, idistinv_orders, markov_stieltjes};
pub use jacobi::{affine_mapping, JacobiPolynomials};
pub use modification::{linear_division, linear_modification, quadratic_modification, quadratic_modification_real};
pub use opoly::RecurrenceTable;
pub use partition::{compute_subintervals, Singularity, Subinterval, SubintervalKind};
pub use quadrature::{CompositeQuadrature, GaussJacobiComposite, PolynomialFactor};

// Re-export external dependencies for convenience
pub use num_complex::Complex;
