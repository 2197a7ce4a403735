//! Inversion of induced distribution functions
//!
//! The order-n induced measure of dμ is p_n^2 dμ, with distribution function
//! F_n. Sampling from it by inversion needs x = F_n^{-1}(u). The Markov-Stieltjes
//! inequalities bound x between Gauss nodes of the induced measure, and
//! bisection on the exact primitive refines the bracket.

use crate::error::{OpolyError, Result};
use crate::modification::quadratic_modification_real;
use crate::opoly::RecurrenceTable;
use rayon::prelude::*;

/// Absolute x-tolerance of the bisection in [`idistinv`]
pub const BISECTION_XTOL: f64 = 1e-12;

/// Iteration cap of the bisection in [`idistinv`]
pub const BISECTION_MAX_ITERATIONS: usize = 200;

/// The same table with b_0 = 1, i.e. for the probability measure.
fn normalized(table: &RecurrenceTable) -> Result<RecurrenceTable> {
    let mut beta = table.beta().to_vec();
    beta[0] = 1.0;
    RecurrenceTable::new(table.alpha().to_vec(), beta)
}

fn check_support(support: (f64, f64)) -> Result<()> {
    if !(support.0 < support.1) {
        return Err(OpolyError::Configuration(format!(
            "support requires a < b, got ({}, {})",
            support.0, support.1
        )));
    }
    Ok(())
}

/// Brackets [l_i, r_i] containing F_n^{-1}(u_i) for every u_i in [0, 1].
///
/// `table` holds the recurrence pairs of dμ, `support` the interval carrying
/// it (either end may be infinite). The table is modified by (x - z)^2 at each
/// of the n zeros of p_n, so it needs at least 2n + 2 pairs; more pairs give
/// tighter brackets. u = 1 maps to the degenerate bracket at the right end.
pub fn markov_stieltjes(
    table: &RecurrenceTable,
    n: usize,
    u: &[f64],
    support: (f64, f64),
) -> Result<Vec<(f64, f64)>> {
    table.require(2 * n + 2, "markov_stieltjes")?;
    check_support(support)?;
    if let Some(&bad) = u.iter().find(|&&u| !(0.0..=1.0).contains(&u)) {
        return Err(OpolyError::Configuration(format!(
            "distribution values must lie in [0, 1], got {}",
            bad
        )));
    }

    let (zeros, _) = table.gauss_quadrature(n)?;
    let mut induced = normalized(table)?;
    for &z in &zeros {
        induced = normalized(&quadratic_modification_real(&induced, z)?)?;
    }

    let nodes = induced.len() - 1;
    let (y, w) = induced.gauss_quadrature(nodes)?;

    // X = [a, y_1, ..., y_N, b], W = [0, w_1, w_1 + w_2, ..., 1]
    let mut x = Vec::with_capacity(nodes + 2);
    x.push(support.0);
    x.extend_from_slice(&y);
    x.push(support.1);

    let mut cumulative = Vec::with_capacity(nodes + 1);
    cumulative.push(0.0);
    let mut acc = 0.0;
    for &wi in &w {
        acc += wi;
        cumulative.push(acc);
    }
    let total = acc;
    for c in cumulative.iter_mut() {
        *c = (*c / total).min(1.0);
    }
    cumulative[nodes] = 1.0;

    Ok(u.iter()
        .map(|&ui| {
            // Number of cumulative weights <= u, so that W[j-1] <= u < W[j]
            let j = cumulative.partition_point(|&c| c <= ui);
            if j == nodes + 1 {
                (x[nodes + 1], x[nodes + 1])
            } else {
                (x[j - 1], x[j + 1])
            }
        })
        .collect())
}

/// x_i = F_n^{-1}(u_i), where `primitive` evaluates F_n.
///
/// Each u_i is bracketed with [`markov_stieltjes`] and then bisected to
/// [`BISECTION_XTOL`]; the u_i are processed in parallel. An infinite bracket
/// end is replaced by doubling steps away from the finite one until the
/// primitive changes sign.
pub fn idistinv<F>(
    table: &RecurrenceTable,
    n: usize,
    u: &[f64],
    support: (f64, f64),
    primitive: F,
) -> Result<Vec<f64>>
where
    F: Fn(f64) -> Result<f64> + Sync,
{
    let brackets = markov_stieltjes(table, n, u, support)?;
    u.par_iter()
        .zip(brackets.par_iter())
        .map(|(&ui, &(lo, hi))| bisect(|x| Ok(primitive(x)? - ui), lo, hi))
        .collect()
}

/// x_i = F_{n_i}^{-1}(u_i) with one order per sample.
///
/// `primitive(n, x)` evaluates F_n. Samples are grouped by order, and each
/// group goes through [`idistinv`]; the result keeps the order of `u`.
pub fn idistinv_orders<F>(
    table: &RecurrenceTable,
    orders: &[usize],
    u: &[f64],
    support: (f64, f64),
    primitive: F,
) -> Result<Vec<f64>>
where
    F: Fn(usize, f64) -> Result<f64> + Sync,
{
    if orders.len() != u.len() {
        return Err(OpolyError::Configuration(format!(
            "one order per sample required, got {} orders for {} samples",
            orders.len(),
            u.len()
        )));
    }

    let mut distinct = orders.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    let mut x = vec![0.0; u.len()];
    for n in distinct {
        let members: Vec<usize> = (0..u.len()).filter(|&i| orders[i] == n).collect();
        let group: Vec<f64> = members.iter().map(|&i| u[i]).collect();
        let roots = idistinv(table, n, &group, support, |x| primitive(n, x))?;
        for (&i, root) in members.iter().zip(roots) {
            x[i] = root;
        }
    }
    Ok(x)
}

/// Root of a nondecreasing `f` inside [lo, hi].
fn bisect<F>(f: F, lo: f64, hi: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    if lo == hi {
        return Ok(lo);
    }
    let (mut lo, mut hi) = (lo, hi);
    if !lo.is_finite() {
        lo = expand_bracket(&f, hi, -1.0)?;
    }
    if !hi.is_finite() {
        hi = expand_bracket(&f, lo, 1.0)?;
    }

    let mut f_lo = f(lo)?;
    let f_hi = f(hi)?;
    if f_lo == 0.0 {
        return Ok(lo);
    }
    if f_hi == 0.0 {
        return Ok(hi);
    }
    if f_lo.signum() == f_hi.signum() {
        // Rounding in the primitive near the ends of the bracket; the result
        // is an endpoint, not a converged root
        let (x, residual) = if f_lo.abs() <= f_hi.abs() { (lo, f_lo) } else { (hi, f_hi) };
        tracing::warn!(lo, hi, f_lo, f_hi, x, residual, "bracket without sign change, returning endpoint");
        return Ok(x);
    }

    for _ in 0..BISECTION_MAX_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if hi - lo < BISECTION_XTOL {
            return Ok(mid);
        }
        let f_mid = f(mid)?;
        if f_mid == 0.0 {
            return Ok(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Err(OpolyError::NumericNonConvergence {
        iterations: BISECTION_MAX_ITERATIONS,
        tolerance: BISECTION_XTOL,
        context: format!("bisection on [{}, {}]", lo, hi),
    })
}

/// Step away from `edge` in `direction` with doubling widths until f changes
/// sign relative to its value at `edge`.
fn expand_bracket<F>(f: &F, edge: f64, direction: f64) -> Result<f64>
where
    F: Fn(f64) -> Result<f64>,
{
    let f_edge = f(edge)?;
    if f_edge == 0.0 {
        return Ok(edge);
    }
    let mut width = 1.0;
    for _ in 0..BISECTION_MAX_ITERATIONS {
        let x = edge + direction * width;
        let fx = f(x)?;
        if fx == 0.0 || fx.signum() != f_edge.signum() {
            return Ok(x);
        }
        width *= 2.0;
    }
    Err(OpolyError::NumericNonConvergence {
        iterations: BISECTION_MAX_ITERATIONS,
        tolerance: BISECTION_XTOL,
        context: format!("bracket expansion from {}", edge),
    })
}

#[cfg(test)]
#[path = "induced_tests.rs"]
mod tests;
