//! Univariate orthonormal polynomials defined by three-term recurrence coefficients
//!
//! A table `ab` of pairs (a_n, b_n), n = 0..=N, defines the orthonormal family
//!
//! p_{-1}(x) = 0,  p_0(x) = 1 / b_0,
//!
//! b_{n+1} p_{n+1}(x) = (x - a_{n+1}) p_n(x) - b_n p_{n-1}(x),   n >= 0.
//!
//! The value a_0 is never used and stored as 0. b_0 is the square root of the
//! total mass of the measure. Everything derived from the family (values,
//! ratios, Jacobi matrices, Gauss rules, expansion coefficients) is computed
//! here from a snapshot of the table.

use crate::error::{OpolyError, Result};
use crate::special_functions::ln_gamma;
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array, Array1, Array2, Array3, ArrayView, Axis, RemoveAxis};

/// Recurrence coefficient table of an orthonormal polynomial family
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrenceTable {
    alpha: Vec<f64>,
    beta: Vec<f64>,
}

impl RecurrenceTable {
    /// Create a table from the two coefficient columns.
    ///
    /// `alpha[0]` is ignored and reset to 0. Every `beta[n]` must be finite and positive.
    pub fn new(mut alpha: Vec<f64>, beta: Vec<f64>) -> Result<Self> {
        if alpha.len() != beta.len() {
            return Err(OpolyError::Configuration(format!(
                "alpha and beta must have the same length (got {} and {})",
                alpha.len(),
                beta.len()
            )));
        }
        if alpha.is_empty() {
            return Err(OpolyError::Configuration(
                "a recurrence table needs at least one pair".to_string(),
            ));
        }
        for (n, &b) in beta.iter().enumerate() {
            if !(b.is_finite() && b > 0.0) {
                return Err(OpolyError::Configuration(format!(
                    "beta[{}] = {} must be finite and positive",
                    n, b
                )));
            }
        }
        if let Some((n, a)) = alpha.iter().enumerate().find(|(_, a)| !a.is_finite()) {
            return Err(OpolyError::Configuration(format!(
                "alpha[{}] = {} must be finite",
                n, a
            )));
        }
        alpha[0] = 0.0;
        Ok(Self { alpha, beta })
    }

    /// Create a table from (a_n, b_n) pairs.
    pub fn from_pairs(pairs: &[[f64; 2]]) -> Result<Self> {
        Self::new(
            pairs.iter().map(|p| p[0]).collect(),
            pairs.iter().map(|p| p[1]).collect(),
        )
    }

    /// Create a table from an (N+1) x 2 array.
    pub fn from_array(ab: &Array2<f64>) -> Result<Self> {
        if ab.ncols() != 2 {
            return Err(OpolyError::Configuration(format!(
                "recurrence array must have 2 columns, got {}",
                ab.ncols()
            )));
        }
        Self::new(ab.column(0).to_vec(), ab.column(1).to_vec())
    }

    /// Single-pair table for a measure of the given total mass.
    pub fn from_mass(mass: f64) -> Result<Self> {
        Self::new(vec![0.0], vec![mass.sqrt()])
    }

    pub(crate) fn from_parts_unchecked(alpha: Vec<f64>, beta: Vec<f64>) -> Self {
        debug_assert_eq!(alpha.len(), beta.len());
        Self { alpha, beta }
    }

    /// Number of stored pairs (N+1).
    pub fn len(&self) -> usize {
        self.alpha.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alpha.is_empty()
    }

    /// Highest polynomial degree whose recurrence pair is stored.
    pub fn max_degree(&self) -> usize {
        self.len().saturating_sub(1)
    }

    /// a_n
    pub fn a(&self, n: usize) -> f64 {
        self.alpha[n]
    }

    /// b_n
    pub fn b(&self, n: usize) -> f64 {
        self.beta[n]
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn beta(&self) -> &[f64] {
        &self.beta
    }

    /// Append the pair for the next degree.
    pub fn push(&mut self, a: f64, b: f64) -> Result<()> {
        if !(b.is_finite() && b > 0.0) || !a.is_finite() {
            return Err(OpolyError::NumericalBreakdown {
                context: format!(
                    "recurrence pair {} = ({}, {}) is not admissible",
                    self.len(),
                    a,
                    b
                ),
            });
        }
        self.alpha.push(a);
        self.beta.push(b);
        Ok(())
    }

    /// Copy of the first `rows` pairs.
    pub fn truncate(&self, rows: usize) -> Result<Self> {
        self.require(rows, "truncate")?;
        Ok(Self {
            alpha: self.alpha[..rows].to_vec(),
            beta: self.beta[..rows].to_vec(),
        })
    }

    /// (N+1) x 2 array with columns (a, b).
    pub fn to_array(&self) -> Array2<f64> {
        let mut ab = Array2::zeros((self.len(), 2));
        for n in 0..self.len() {
            ab[[n, 0]] = self.alpha[n];
            ab[[n, 1]] = self.beta[n];
        }
        ab
    }

    pub(crate) fn require(&self, rows: usize, context: &str) -> Result<()> {
        if self.len() < rows {
            return Err(OpolyError::margin(rows, self.len(), context));
        }
        Ok(())
    }

    /// Evaluate orthonormal polynomials of the requested degrees.
    ///
    /// Returns an `x.len() x degrees.len()` array.
    pub fn eval(&self, x: &[f64], degrees: &[usize]) -> Result<Array2<f64>> {
        let Some(&nmax) = degrees.iter().max() else {
            return Ok(Array2::zeros((x.len(), 0)));
        };
        let p = self.eval_all(x, nmax)?;
        Ok(p.select(Axis(1), degrees))
    }

    /// Values p_0..p_nmax at every x, as an `x.len() x (nmax+1)` array.
    fn eval_all(&self, x: &[f64], nmax: usize) -> Result<Array2<f64>> {
        self.require(nmax + 1, "eval")?;

        let mut p = Array2::zeros((x.len(), nmax + 1));
        for (i, &xi) in x.iter().enumerate() {
            p[[i, 0]] = 1.0 / self.beta[0];
            if nmax > 0 {
                p[[i, 1]] = (xi - self.alpha[1]) * p[[i, 0]] / self.beta[1];
            }
            for j in 2..=nmax {
                p[[i, j]] = ((xi - self.alpha[j]) * p[[i, j - 1]]
                    - self.beta[j - 1] * p[[i, j - 2]])
                    / self.beta[j];
            }
        }
        Ok(p)
    }

    /// p_n at a single point. The table must hold n+1 pairs.
    pub(crate) fn eval_point(&self, x: f64, n: usize) -> f64 {
        let mut prev = 0.0;
        let mut cur = 1.0 / self.beta[0];
        for j in 1..=n {
            let next = ((x - self.alpha[j]) * cur - self.beta[j - 1] * prev) / self.beta[j];
            prev = cur;
            cur = next;
        }
        cur
    }

    /// Evaluate derivatives of orthonormal polynomials.
    ///
    /// Returns an `x.len() x degrees.len() x orders.len()` array whose slice
    /// `[.., .., k]` holds the derivative of order `orders[k]`.
    pub fn eval_derivatives(
        &self,
        x: &[f64],
        degrees: &[usize],
        orders: &[usize],
    ) -> Result<Array3<f64>> {
        let mut out = Array3::zeros((x.len(), degrees.len(), orders.len()));
        let Some(&nmax) = degrees.iter().max() else {
            return Ok(out);
        };
        let dmax = orders.iter().copied().max().unwrap_or(0);

        let mut p = self.eval_all(x, nmax)?;
        let assign = |out: &mut Array3<f64>, p: &Array2<f64>, order: usize| {
            for (k, _) in orders.iter().enumerate().filter(|&(_, &d)| d == order) {
                out.index_axis_mut(Axis(2), k)
                    .assign(&p.select(Axis(1), degrees));
            }
        };
        assign(&mut out, &p, 0);

        for qd in 1..=dmax {
            let mut pd = Array2::zeros(p.raw_dim());
            if qd <= nmax {
                // qd! times the leading coefficient of p_qd, computed in log space
                let log_lead: f64 = self.beta[..=qd].iter().map(|b| b.ln()).sum();
                let top = (ln_gamma(qd as f64 + 1.0) - log_lead).exp();
                pd.column_mut(qd).fill(top);
            }
            for qn in (qd + 1)..=nmax {
                for (i, &xi) in x.iter().enumerate() {
                    pd[[i, qn]] = ((xi - self.alpha[qn]) * pd[[i, qn - 1]]
                        - self.beta[qn - 1] * pd[[i, qn - 2]]
                        + qd as f64 * p[[i, qn - 1]])
                        / self.beta[qn];
                }
            }
            assign(&mut out, &pd, qd);
            p = pd;
        }

        Ok(out)
    }

    /// Evaluate the ratios r_n(x) = p_n(x) / p_{n-1}(x).
    ///
    /// By convention r_0 = p_0 = 1 / b_0. Returns an `x.len() x degrees.len()` array.
    pub fn r_eval(&self, x: &[f64], degrees: &[usize]) -> Result<Array2<f64>> {
        let Some(&nmax) = degrees.iter().max() else {
            return Ok(Array2::zeros((x.len(), 0)));
        };
        self.require(nmax + 1, "r_eval")?;

        let mut r = Array2::zeros((x.len(), nmax + 1));
        for (i, &xi) in x.iter().enumerate() {
            let row = self.ratios(xi, nmax);
            r.row_mut(i).assign(&Array1::from(row));
        }
        Ok(r.select(Axis(1), degrees))
    }

    /// r_0..=r_nmax at a single point. The table must hold nmax+1 pairs.
    pub(crate) fn ratios(&self, x: f64, nmax: usize) -> Vec<f64> {
        let mut r = vec![0.0; nmax + 1];
        r[0] = 1.0 / self.beta[0];
        if nmax > 0 {
            r[1] = (x - self.alpha[1]) / self.beta[1];
        }
        for j in 2..=nmax {
            r[j] = ((x - self.alpha[j]) - self.beta[j - 1] / r[j - 1]) / self.beta[j];
        }
        r
    }

    /// The n x n Jacobi matrix. Requires n+1 pairs.
    pub fn jacobi_matrix(&self, n: usize) -> Result<Array2<f64>> {
        self.require(n + 1, "jacobi_matrix")?;
        let mut j = Array2::zeros((n, n));
        for i in 0..n {
            j[[i, i]] = self.alpha[i + 1];
            if i + 1 < n {
                j[[i, i + 1]] = self.beta[i + 1];
                j[[i + 1, i]] = self.beta[i + 1];
            }
        }
        Ok(j)
    }

    /// Premultiply `v` by the Jacobi matrix of size `v.shape()[0]`.
    ///
    /// The operator acts along the first axis and broadcasts over the
    /// remaining ones. Runs in O(len(v)) without forming the matrix.
    pub fn apply_jacobi_matrix<D>(&self, v: &ArrayView<f64, D>) -> Result<Array<f64, D>>
    where
        D: RemoveAxis,
    {
        let n = v.len_of(Axis(0));
        self.require(n + 1, "apply_jacobi_matrix")?;

        let mut jv = v.to_owned();
        for i in 0..n {
            let mut row = jv.index_axis_mut(Axis(0), i);
            row *= self.alpha[i + 1];
            if i + 1 < n {
                row.scaled_add(self.beta[i + 1], &v.index_axis(Axis(0), i + 1));
            }
            if i > 0 {
                row.scaled_add(self.beta[i], &v.index_axis(Axis(0), i - 1));
            }
        }
        Ok(jv)
    }

    /// n-point Gauss quadrature rule for the measure (nodes, weights).
    ///
    /// Nodes are the eigenvalues of the n x n Jacobi matrix in ascending
    /// order; weights are b_0^2 times the squared first eigenvector components,
    /// so they sum to b_0^2. Requires n+1 pairs.
    pub fn gauss_quadrature(&self, n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        self.require(n + 1, "gauss_quadrature")?;
        let diag: Vec<f64> = self.alpha[1..=n].to_vec();
        let off: Vec<f64> = self.beta[1..n.max(1)].to_vec();
        let (nodes, first) = tridiagonal_eigen(&diag, &off);
        let b0sq = self.beta[0] * self.beta[0];
        let weights = first.iter().map(|v| b0sq * v * v).collect();
        Ok((nodes, weights))
    }

    /// n-point Gauss-Radau rule with one node pinned at `anchor`.
    ///
    /// The last diagonal entry of the Jacobi matrix is shifted by
    /// b_n r_n(anchor) so that `anchor` becomes an eigenvalue.
    /// The weights underflow for anchors far outside the support. An anchor
    /// at a zero of p_{n-1} is a [`OpolyError::NumericalBreakdown`].
    pub fn gauss_radau_quadrature(&self, n: usize, anchor: f64) -> Result<(Vec<f64>, Vec<f64>)> {
        if n == 0 {
            return Ok((Vec::new(), Vec::new()));
        }
        self.require(n + 1, "gauss_radau_quadrature")?;
        let r = self.ratios(anchor, n);

        // anchor at a zero of p_{n-1} leaves no finite shift
        let shift = r[n] * self.beta[n];
        if !shift.is_finite() {
            return Err(OpolyError::NumericalBreakdown {
                context: format!("gauss_radau_quadrature: p_{}({}) vanishes", n - 1, anchor),
            });
        }
        let mut diag: Vec<f64> = self.alpha[1..=n].to_vec();
        diag[n - 1] += shift;
        let off: Vec<f64> = self.beta[1..n].to_vec();

        let (nodes, first) = tridiagonal_eigen(&diag, &off);
        let b0sq = self.beta[0] * self.beta[0];
        let weights = first.iter().map(|v| b0sq * v * v).collect();
        Ok((nodes, weights))
    }

    /// Leading coefficients of p_0, ..., p_{n-1}.
    pub fn leading_coefficient(&self, n: usize) -> Result<Vec<f64>> {
        if n == 0 {
            return Err(OpolyError::Configuration(
                "leading_coefficient needs n > 0".to_string(),
            ));
        }
        self.require(n, "leading_coefficient")?;
        let mut lc = Vec::with_capacity(n);
        let mut acc = 1.0;
        for &b in &self.beta[..n] {
            acc /= b;
            lc.push(acc);
        }
        Ok(lc)
    }

    /// Monomial expansion coefficients: row n holds C[n, j] with
    /// p_n(x) = sum_j C[n, j] x^j, for n = 0..n-1.
    pub fn canonical_connection(&self, n: usize) -> Result<Array2<f64>> {
        let mut c = Array2::zeros((n, n));
        if n == 0 {
            return Ok(c);
        }
        self.require(n, "canonical_connection")?;

        let (a, b) = (&self.alpha, &self.beta);
        c[[0, 0]] = 1.0 / b[0];
        if n == 1 {
            return Ok(c);
        }
        c[[1, 1]] = c[[0, 0]] / b[1];
        c[[1, 0]] = -a[1] * c[[0, 0]] / b[1];

        for k in 1..n - 1 {
            c[[k + 1, 0]] = -a[k + 1] * c[[k, 0]] - b[k] * c[[k - 1, 0]];
            c[[k + 1, k]] = c[[k, k - 1]] - a[k + 1] * c[[k, k]];
            c[[k + 1, k + 1]] = c[[k, k]];
            for j in 1..k {
                c[[k + 1, j]] = c[[k, j - 1]] - a[k + 1] * c[[k, j]] - b[k] * c[[k - 1, j]];
            }
            let scale = 1.0 / b[k + 1];
            c.row_mut(k + 1).mapv_inplace(|v| v * scale);
        }
        Ok(c)
    }

    /// Orthonormal expansion of monomials: row n holds C[n, j] with
    /// x^n = sum_j C[n, j] p_j(x), for n = 0..n-1.
    pub fn canonical_connection_inverse(&self, n: usize) -> Result<Array2<f64>> {
        let mut c = Array2::zeros((n, n));
        if n == 0 {
            return Ok(c);
        }
        self.require(n + 1, "canonical_connection_inverse")?;

        c[[0, 0]] = self.beta[0];
        for k in 0..n - 1 {
            let next = self.apply_jacobi_matrix(&c.row(k))?;
            c.row_mut(k + 1).assign(&next);
        }
        Ok(c)
    }

    /// Given IC[j] = <p_j, p_alpha>, returns C[n, j] = <p_n p_j, p_alpha>.
    pub fn tuple_product_generator(&self, ic: &[f64]) -> Result<Array2<f64>> {
        let n = ic.len();
        self.require(n + 1, "tuple_product_generator")?;

        let mut c = Array2::zeros((n, n));
        c.row_mut(0).assign(&Array1::from(ic.to_vec()));
        for k in 0..n.saturating_sub(1) {
            let mut next = self.apply_jacobi_matrix(&c.row(k))?;
            next.scaled_add(-self.alpha[k + 1], &c.row(k));
            if k > 0 {
                next.scaled_add(-self.beta[k], &c.row(k - 1));
            }
            next /= self.beta[k + 1];
            c.row_mut(k + 1).assign(&next);
        }
        Ok(c)
    }

    /// Integrals of polynomial products: C[n, m] = <p_n p_m, p_alpha>, where
    /// p_alpha is the product of p_{alpha[j]} over the multi-index.
    pub fn tuple_product(&self, n: usize, alpha: &[usize]) -> Result<Array2<f64>> {
        if alpha.is_empty() {
            return Ok(Array2::eye(n));
        }
        let nmax = n + alpha.iter().sum::<usize>() + 1;
        self.require(nmax + 1, "tuple_product")?;

        let mut c = Array2::zeros((nmax, nmax));
        c[[alpha[0], alpha[0]]] = 1.0;
        for &aj in alpha {
            let ic: Vec<f64> = c.row(aj).iter().map(|v| v / self.beta[0]).collect();
            c = self.tuple_product_generator(&ic)?;
        }
        Ok(c.slice(ndarray::s![..n, ..n]).to_owned())
    }

    /// Orthonormal expansion of derivatives: C[n, j] with
    /// p_n^{(d)}(x) = sum_j C[n, j] p_j(x), for n, j = 0..n-1.
    pub fn derivative_expansion(&self, n: usize, d: usize) -> Result<Array2<f64>> {
        if n == 0 {
            return Ok(Array2::zeros((0, 0)));
        }
        if d == 0 {
            return Ok(Array2::eye(n));
        }
        self.require(n + d + 1, "derivative_expansion")?;

        let mut c: Array2<f64> = Array2::eye(n + d + 1)
            .slice(ndarray::s![..n, ..])
            .to_owned();

        for dj in 1..=d {
            let width = n + d + 1 - dj;
            let cprev = c.slice(ndarray::s![.., ..width]).to_owned();
            c = Array2::zeros((n, width));
            if dj < n {
                let log_b: f64 = self.beta[1..=dj].iter().map(|b| b.ln()).sum();
                c[[dj, 0]] = (ln_gamma(dj as f64 + 1.0) - log_b).exp();
            }
            for k in dj..n.saturating_sub(1) {
                let mut next = self.apply_jacobi_matrix(&c.row(k))?;
                next.scaled_add(-self.alpha[k + 1], &c.row(k));
                next.scaled_add(-self.beta[k], &c.row(k - 1));
                next.scaled_add(dj as f64, &cprev.row(k));
                next /= self.beta[k + 1];
                c.row_mut(k + 1).assign(&next);
            }
        }
        Ok(c.slice(ndarray::s![.., ..n]).to_owned())
    }

    /// Normalized inverse Christoffel function,
    /// lambda(x) = sqrt(k / sum_{j<k} p_j(x)^2).
    pub fn christoffel_function(&self, x: &[f64], k: usize) -> Result<Vec<f64>> {
        if k == 0 {
            return Err(OpolyError::Configuration(
                "christoffel_function needs k > 0".to_string(),
            ));
        }
        let p = self.eval_all(x, k - 1)?;
        Ok(p.rows()
            .into_iter()
            .map(|row| (k as f64 / row.iter().map(|v| v * v).sum::<f64>()).sqrt())
            .collect())
    }

    /// Christoffel-normalized polynomials q_k = p_k / sqrt(sum_{j<=k} p_j^2),
    /// k = 0..n-1, computed without forming p_k (so nothing overflows).
    ///
    /// Returns an `x.len() x n` array.
    pub fn qpoly1d_eval(&self, x: &[f64], n: usize) -> Result<Array2<f64>> {
        if n == 0 {
            return Err(OpolyError::Configuration(
                "qpoly1d_eval needs n > 0".to_string(),
            ));
        }
        self.require(n, "qpoly1d_eval")?;

        let mut q = Array2::zeros((x.len(), n));
        for (i, &xi) in x.iter().enumerate() {
            q[[i, 0]] = 1.0;
            if n == 1 {
                continue;
            }
            let mut qt = (xi - self.alpha[1]) * q[[i, 0]] / self.beta[1];
            q[[i, 1]] = qt / (1.0 + qt * qt).sqrt();
            for j in 1..n - 1 {
                let prev = q[[i, j - 1]] / (1.0 + qt * qt).sqrt();
                qt = ((xi - self.alpha[j + 1]) * q[[i, j]] - self.beta[j] * prev) / self.beta[j + 1];
                q[[i, j + 1]] = qt / (1.0 + qt * qt).sqrt();
            }
        }
        Ok(q)
    }
}

/// Eigenvalues (ascending) and first eigenvector components of the symmetric
/// tridiagonal matrix with diagonal `diag` and off-diagonal `off`.
pub(crate) fn tridiagonal_eigen(diag: &[f64], off: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = diag.len();
    if n == 0 {
        return (Vec::new(), Vec::new());
    }
    if n == 1 {
        return (vec![diag[0]], vec![1.0]);
    }

    let mut m = DMatrix::<f64>::zeros(n, n);
    for i in 0..n {
        m[(i, i)] = diag[i];
        if i + 1 < n {
            m[(i, i + 1)] = off[i];
            m[(i + 1, i)] = off[i];
        }
    }

    let eig = SymmetricEigen::new(m);
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&i, &j| eig.eigenvalues[i].total_cmp(&eig.eigenvalues[j]));

    let nodes = order.iter().map(|&i| eig.eigenvalues[i]).collect();
    let first = order.iter().map(|&i| eig.eigenvectors[(0, i)]).collect();
    (nodes, first)
}

#[cfg(test)]
#[path = "opoly_tests.rs"]
mod tests;
