//! Singularity-aware partition of an interval into sub-intervals
//!
//! A weight may blow up or vanish like a power law at declared points. Each
//! sub-interval records the exponent that acts at each of its endpoints, so
//! that the quadrature on that piece can absorb it into a Jacobi weight.

use crate::error::{OpolyError, Result};

/// Tolerance for merging a singularity with an interval endpoint, and the
/// minimal admissible distance between two singularities
pub const PARTITION_TOLERANCE: f64 = 1e-8;

/// Power-law behaviour of the weight at `location`.
///
/// Approaching from the left the weight behaves like |x - location|^left_exponent,
/// from the right like |x - location|^right_exponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Singularity {
    pub location: f64,
    pub left_exponent: f64,
    pub right_exponent: f64,
}

impl Singularity {
    pub fn new(location: f64, left_exponent: f64, right_exponent: f64) -> Self {
        Self {
            location,
            left_exponent,
            right_exponent,
        }
    }

    /// A plain break point with no power-law behaviour.
    pub fn regular(location: f64) -> Self {
        Self::new(location, 0.0, 0.0)
    }
}

/// One piece of a partition.
///
/// `left_strength` is the exponent of the weight just right of `left`;
/// `right_strength` is the exponent just left of `right`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subinterval {
    pub left: f64,
    pub right: f64,
    pub left_strength: f64,
    pub right_strength: f64,
}

/// Endpoint behaviour of a sub-interval, in terms of the Jacobi weight
/// (1 - u)^alpha (1 + u)^beta on the reference interval [-1, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubintervalKind {
    Plain,
    LeftSingular { beta: f64 },
    RightSingular { alpha: f64 },
    BothSingular { alpha: f64, beta: f64 },
}

impl SubintervalKind {
    /// Jacobi parameters (alpha, beta) of the reference weight.
    pub fn jacobi_parameters(&self) -> (f64, f64) {
        match *self {
            SubintervalKind::Plain => (0.0, 0.0),
            SubintervalKind::LeftSingular { beta } => (0.0, beta),
            SubintervalKind::RightSingular { alpha } => (alpha, 0.0),
            SubintervalKind::BothSingular { alpha, beta } => (alpha, beta),
        }
    }
}

impl Subinterval {
    pub fn new(left: f64, right: f64, left_strength: f64, right_strength: f64) -> Self {
        Self {
            left,
            right,
            left_strength,
            right_strength,
        }
    }

    pub fn kind(&self) -> SubintervalKind {
        match (self.left_strength != 0.0, self.right_strength != 0.0) {
            (false, false) => SubintervalKind::Plain,
            (true, false) => SubintervalKind::LeftSingular {
                beta: self.left_strength,
            },
            (false, true) => SubintervalKind::RightSingular {
                alpha: self.right_strength,
            },
            (true, true) => SubintervalKind::BothSingular {
                alpha: self.right_strength,
                beta: self.left_strength,
            },
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    /// Map x in [left, right] to u in [-1, 1].
    pub fn to_reference(&self, x: f64) -> f64 {
        (2.0 * x - self.left - self.right) / (self.right - self.left)
    }

    /// Map u in [-1, 1] to x in [left, right].
    pub fn from_reference(&self, u: f64) -> f64 {
        0.5 * (self.right - self.left) * u + 0.5 * (self.left + self.right)
    }
}

/// Partition [a, b] at the singularities that fall inside it.
///
/// Singularities further than [`PARTITION_TOLERANCE`] outside [a, b] are
/// ignored; the rest are sorted. Two singularities closer than the tolerance
/// are a configuration error. Endpoints that do not coincide with a
/// singularity are added with zero strength. Without singularities the result
/// is the single piece [a, b].
pub fn compute_subintervals(a: f64, b: f64, singularities: &[Singularity]) -> Result<Vec<Subinterval>> {
    if !(a < b) {
        return Err(OpolyError::Configuration(format!(
            "interval requires a < b, got [{}, {}]",
            a, b
        )));
    }
    if !(a.is_finite() && b.is_finite()) {
        return Err(OpolyError::Configuration(format!(
            "partition needs a finite interval, got [{}, {}]",
            a, b
        )));
    }
    if let Some(s) = singularities
        .iter()
        .find(|s| !(s.location.is_finite() && s.left_exponent.is_finite() && s.right_exponent.is_finite()))
    {
        return Err(OpolyError::Configuration(format!(
            "malformed singularity {:?}",
            s
        )));
    }

    let tol = PARTITION_TOLERANCE;
    let mut inside: Vec<Singularity> = singularities
        .iter()
        .copied()
        .filter(|s| s.location >= a - tol && s.location <= b + tol)
        .collect();
    inside.sort_by(|p, q| p.location.total_cmp(&q.location));

    if let Some(pair) = inside.windows(2).find(|p| p[1].location - p[0].location < tol) {
        return Err(OpolyError::Configuration(format!(
            "overlapping singularities at {} and {}",
            pair[0].location, pair[1].location
        )));
    }

    // Singularities at an end are pinned to it
    for s in inside.iter_mut() {
        if (s.location - a).abs() <= tol {
            s.location = a;
        } else if (s.location - b).abs() <= tol {
            s.location = b;
        }
    }

    let (Some(first), Some(last)) = (inside.first().copied(), inside.last().copied()) else {
        return Ok(vec![Subinterval::new(a, b, 0.0, 0.0)]);
    };

    if (last.location - b).abs() > tol {
        inside.push(Singularity::regular(b));
    }
    if (first.location - a).abs() > tol {
        inside.insert(0, Singularity::regular(a));
    }

    Ok(inside
        .windows(2)
        .map(|p| Subinterval::new(p[0].location, p[1].location, p[0].right_exponent, p[1].left_exponent))
        .collect())
}
