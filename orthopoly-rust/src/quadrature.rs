//! Composite Gauss quadrature over a partition, with polynomial factors
//! absorbed into the quadrature measure
//!
//! An integral of the form
//!
//! ∫ c Π(x - r_i) Π(x - q_j)^2 f(x) dx
//!
//! over a sub-interval is evaluated with the Gauss rule of the measure
//! Π(x - r_i) Π(x - q_j)^2 dλ(x), where dλ is a Jacobi weight carrying the
//! endpoint singularities of the piece. The polynomial factor is never
//! evaluated pointwise, so its cancellation near its zeros costs nothing.

use crate::error::{OpolyError, Result};
use crate::gauss::Rule;
use crate::jacobi::{affine_mapping, JacobiPolynomials};
use crate::modification::{linear_modification, quadratic_modification_real};
use crate::partition::{Subinterval, SubintervalKind};

/// The polynomial c Π(x - r_i) Π(x - q_j)^2 handed to the quadrature
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialFactor {
    pub linear_roots: Vec<f64>,
    pub quadratic_roots: Vec<f64>,
    pub leading_coefficient: f64,
}

impl PolynomialFactor {
    /// The constant polynomial `c`.
    pub fn constant(c: f64) -> Self {
        Self {
            linear_roots: Vec::new(),
            quadratic_roots: Vec::new(),
            leading_coefficient: c,
        }
    }

    pub fn with_linear_roots<I: IntoIterator<Item = f64>>(mut self, roots: I) -> Self {
        self.linear_roots.extend(roots);
        self
    }

    pub fn with_quadratic_roots<I: IntoIterator<Item = f64>>(mut self, roots: I) -> Self {
        self.quadratic_roots.extend(roots);
        self
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.linear_roots.len() + 2 * self.quadratic_roots.len()
    }

    /// Direct evaluation, for reference and tests.
    pub fn eval(&self, x: f64) -> f64 {
        let lin: f64 = self.linear_roots.iter().map(|r| x - r).product();
        let quad: f64 = self.quadratic_roots.iter().map(|q| (x - q) * (x - q)).product();
        self.leading_coefficient * lin * quad
    }
}

/// Integrates `factor(x) * f(x)` over a list of sub-intervals with `order`
/// quadrature nodes per piece
pub trait CompositeQuadrature: Sync {
    fn integrate(
        &self,
        f: &(dyn Fn(f64) -> f64 + Sync),
        subintervals: &[Subinterval],
        order: usize,
        factor: &PolynomialFactor,
    ) -> Result<f64>;
}

/// Gauss-Jacobi composite rule.
///
/// Plain pieces use the Legendre measure mapped onto the piece. Pieces with a
/// singular endpoint use the Jacobi weight on [-1, 1] whose exponents match
/// the declared strengths, and divide them out of `f`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussJacobiComposite;

impl GaussJacobiComposite {
    pub fn new() -> Self {
        Self
    }

    fn integrate_piece(
        &self,
        f: &(dyn Fn(f64) -> f64 + Sync),
        piece: &Subinterval,
        order: usize,
        factor: &PolynomialFactor,
    ) -> Result<f64> {
        let rows = order + 1 + factor.degree();
        let half = 0.5 * piece.width();
        let kind = piece.kind();

        // Plain pieces integrate in x, singular ones in the reference variable u
        let plain = kind == SubintervalKind::Plain;
        let to_local = |x: f64| if plain { x } else { piece.to_reference(x) };

        let (mut table, scale) = if plain {
            let reference = JacobiPolynomials::legendre().recurrence(rows);
            (affine_mapping(&reference, piece.left, piece.right)?, 1.0)
        } else {
            let (alpha, beta) = kind.jacobi_parameters();
            (
                JacobiPolynomials::new(alpha, beta)?.recurrence(rows),
                half.powi(factor.degree() as i32),
            )
        };

        for &q in &factor.quadratic_roots {
            table = quadratic_modification_real(&table, to_local(q))?;
        }
        let mut sign = 1.0;
        for &r in &factor.linear_roots {
            let (modified, s) = linear_modification(&table, to_local(r))?;
            table = modified;
            sign *= s;
        }

        let sum = if plain {
            Rule::from_recurrence(&table, order, piece.left, piece.right)?.integrate(f)
        } else {
            let (alpha, beta) = kind.jacobi_parameters();
            Rule::from_recurrence(&table, order, -1.0, 1.0)?.integrate(|u| {
                half * f(piece.from_reference(u)) / ((1.0 - u).powf(alpha) * (1.0 + u).powf(beta))
            })
        };

        let value = factor.leading_coefficient * sign * scale * sum;
        if !value.is_finite() {
            return Err(OpolyError::NumericalBreakdown {
                context: format!(
                    "non-finite quadrature estimate on [{}, {}] with {} nodes",
                    piece.left, piece.right, order
                ),
            });
        }
        Ok(value)
    }
}

impl CompositeQuadrature for GaussJacobiComposite {
    fn integrate(
        &self,
        f: &(dyn Fn(f64) -> f64 + Sync),
        subintervals: &[Subinterval],
        order: usize,
        factor: &PolynomialFactor,
    ) -> Result<f64> {
        subintervals
            .iter()
            .map(|piece| self.integrate_piece(f, piece, order, factor))
            .sum()
    }
}
