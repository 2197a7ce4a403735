//! Christoffel modifications of a measure
//!
//! Given the recurrence table of dμ, compute the table of
//!
//! - s (x - x0) dμ (linear modification, s = ±1 keeps the measure positive),
//! - |x - z0|^2 dμ = (x - z0)(x - conj(z0)) dμ (quadratic modification),
//! - s dμ / (x - x0) for x0 outside the support (linear division).
//!
//! Every operation is pure: it returns a new, shorter table.

use crate::error::{OpolyError, Result};
use crate::opoly::RecurrenceTable;
use num_complex::Complex;

/// Multiply the measure by (x - x0).
///
/// Returns the table of `sign * (x - x0) dμ` together with `sign`, which is
/// +1 when x0 lies left of the support and -1 when it lies right of it.
/// An input table of M+1 pairs yields M pairs.
///
/// Uses the Christoffel recursion on the ratios r_k(x0) = p_k(x0)/p_{k-1}(x0).
/// Fails with [`OpolyError::NumericalBreakdown`] when x0 is a zero of one of
/// the polynomials involved, or lies inside the support so that the modified
/// measure is not of one sign.
pub fn linear_modification(table: &RecurrenceTable, x0: f64) -> Result<(RecurrenceTable, f64)> {
    let m = table.len().saturating_sub(1);
    if m == 0 {
        return Err(OpolyError::margin(2, table.len(), "linear_modification"));
    }

    // q[k] = (monic pi_{k+1}(x0) / pi_k(x0)) with the sign flipped
    let r = table.ratios(x0, m);
    let q: Vec<f64> = (0..m).map(|k| -table.b(k + 1) * r[k + 1]).collect();
    if let Some(k) = q.iter().position(|&v| v == 0.0 || !v.is_finite()) {
        return Err(OpolyError::NumericalBreakdown {
            context: format!("linear modification at {}: p_{}(x0) vanishes", x0, k + 1),
        });
    }

    let sign = q[0].signum();
    let mut alpha = Vec::with_capacity(m);
    let mut beta = Vec::with_capacity(m);
    alpha.push(0.0);
    beta.push(table.b(0) * q[0].abs().sqrt());

    for n in 1..m {
        let bn2 = table.b(n) * table.b(n);
        alpha.push(x0 + q[n - 1] + bn2 / q[n - 1]);
        let beta2 = bn2 * q[n] / q[n - 1];
        if !(beta2 > 0.0) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!(
                    "linear modification at {}: modified beta_{} = {} is not positive",
                    x0, n, beta2
                ),
            });
        }
        beta.push(beta2.sqrt());
    }

    Ok((RecurrenceTable::from_parts_unchecked(alpha, beta), sign))
}

/// Multiply the measure by |x - z0|^2.
///
/// The result is always a positive measure. An input table of M+1 pairs
/// yields M-1 pairs.
///
/// The shifted Jacobi matrix J - z0 I = QR is factored with one sweep of
/// complex Givens rotations along its band, and RQ + z0 I = Q^H J Q is
/// formed on the fly. Only its diagonal and first subdiagonal are needed:
/// the leading block is the Jacobi matrix of the modified measure, with the
/// off-diagonal phases dropped. Cost and storage are O(M).
pub fn quadratic_modification(table: &RecurrenceTable, z0: Complex<f64>) -> Result<RecurrenceTable> {
    let m = table.len().saturating_sub(1);
    if m < 2 {
        return Err(OpolyError::margin(3, table.len(), "quadratic_modification"));
    }

    let d = |i: usize| Complex::new(table.a(i + 1), 0.0) - z0;
    let e = |i: usize| Complex::new(table.b(i + 1), 0.0);

    // Only the leading (m-1) x (m-1) block of Q^H J Q survives
    let rows = m - 1;
    let mut alpha = Vec::with_capacity(rows);
    let mut beta = Vec::with_capacity(rows);

    let (x, y) = (z0.re, z0.im);
    let d1 = table.a(1) - x;
    alpha.push(0.0);
    beta.push((table.b(0) * table.b(0) * (d1 * d1 + y * y + table.b(1) * table.b(1))).sqrt());

    // Row k of the partially reduced matrix holds `head` at column k and
    // `next` at column k+1; `pivot` is R[k, k]
    let mut head = d(0);
    let mut next = e(0);
    let mut pivot = (head.norm_sqr() + e(0).norm_sqr()).sqrt();
    let mut c_prev = Complex::new(1.0, 0.0);
    for k in 0..rows - 1 {
        if !(pivot > 0.0 && pivot.is_finite()) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("quadratic modification at {}: R[{}, {}] = {}", z0, k, k, pivot),
            });
        }
        let c = head / pivot;
        let s = e(k) / pivot;
        let r_right = c.conj() * next + s.conj() * d(k + 1);
        let t_diag = z0 + pivot * c_prev.conj() * c + r_right * s;

        head = -s * next + c * d(k + 1);
        next = c * e(k + 1);
        let pivot_next = (head.norm_sqr() + e(k + 1).norm_sqr()).sqrt();
        // |T[k+1, k]| = R[k+1, k+1] |s_k|
        let bn = pivot_next * s.norm();
        if !(bn > 0.0 && bn.is_finite()) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("quadratic modification at {}: beta_{} = {}", z0, k + 1, bn),
            });
        }
        alpha.push(t_diag.re);
        beta.push(bn);

        c_prev = c;
        pivot = pivot_next;
    }

    Ok(RecurrenceTable::from_parts_unchecked(alpha, beta))
}

/// Multiply the measure by (x - x0)^2 for real x0.
pub fn quadratic_modification_real(table: &RecurrenceTable, x0: f64) -> Result<RecurrenceTable> {
    quadratic_modification(table, Complex::new(x0, 0.0))
}

/// Divide the measure by (x - x0), the inverse of [`linear_modification`].
///
/// x0 must lie outside the support. Returns the table of `sign * dμ / (x - x0)`
/// and `sign`. An input table of M pairs yields M-1 pairs, computed from the
/// (M-1)-point Gauss rule of dμ reweighted by 1/|x - x0|; the error decays
/// geometrically with M, fastest for x0 far from the support.
pub fn linear_division(table: &RecurrenceTable, x0: f64) -> Result<(RecurrenceTable, f64)> {
    let n = table.len().saturating_sub(1);
    if n == 0 {
        return Err(OpolyError::margin(2, table.len(), "linear_division"));
    }

    let (nodes, weights) = table.gauss_quadrature(n)?;
    let (first, last) = (nodes[0], nodes[n - 1]);
    let sign = if x0 < first {
        1.0
    } else if x0 > last {
        -1.0
    } else {
        return Err(OpolyError::Configuration(format!(
            "cannot divide by (x - {}): point lies inside the support [{}, {}]",
            x0, first, last
        )));
    };

    let reweighted: Vec<f64> = nodes
        .iter()
        .zip(&weights)
        .map(|(&x, &w)| w / (x - x0).abs())
        .collect();
    let divided = discrete_stieltjes(&nodes, &reweighted, n)?;
    Ok((divided, sign))
}

/// Recurrence table (`rows` pairs) of the discrete measure sum_i w_i δ(x - x_i).
///
/// Requires rows <= nodes.len().
pub(crate) fn discrete_stieltjes(nodes: &[f64], weights: &[f64], rows: usize) -> Result<RecurrenceTable> {
    if rows == 0 || rows > nodes.len() {
        return Err(OpolyError::Configuration(format!(
            "discrete measure with {} nodes supports 1..={} recurrence pairs, {} requested",
            nodes.len(),
            nodes.len(),
            rows
        )));
    }

    let mass: f64 = weights.iter().sum();
    let mut alpha = vec![0.0];
    let mut beta = vec![mass.sqrt()];

    let mut prev = vec![0.0; nodes.len()];
    let mut cur = vec![1.0 / beta[0]; nodes.len()];
    for k in 1..rows {
        let ak: f64 = (0..nodes.len())
            .map(|i| weights[i] * nodes[i] * cur[i] * cur[i])
            .sum();
        let next: Vec<f64> = (0..nodes.len())
            .map(|i| (nodes[i] - ak) * cur[i] - beta[k - 1] * prev[i])
            .collect();
        let bk = (0..nodes.len())
            .map(|i| weights[i] * next[i] * next[i])
            .sum::<f64>()
            .sqrt();
        if !(bk > 0.0) {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("discrete Stieltjes: beta_{} = {}", k, bk),
            });
        }
        alpha.push(ak);
        beta.push(bk);
        prev = cur;
        cur = next.into_iter().map(|v| v / bk).collect();
    }

    Ok(RecurrenceTable::from_parts_unchecked(alpha, beta))
}

#[cfg(test)]
#[path = "modification_tests.rs"]
mod tests;
