//! Owning, memoized orthogonal polynomial families
//!
//! A family asks its [`RecurrenceSource`] for recurrence pairs on demand and
//! keeps them. The stored table only ever grows: a prefix that has been
//! computed is never recomputed or replaced.

use crate::error::Result;
use crate::opoly::RecurrenceTable;
use ndarray::Array2;

/// Anything that can produce recurrence pairs of an orthonormal family
pub trait RecurrenceSource {
    /// Table with the first `rows` pairs (degrees 0..rows-1).
    fn recurrence(&self, rows: usize) -> Result<RecurrenceTable>;

    /// Grow `table` in place to `rows` pairs.
    ///
    /// The default recomputes from scratch and appends the missing tail.
    /// Sources that build pairs one degree at a time override this to
    /// continue from the given prefix.
    fn extend(&self, table: &mut RecurrenceTable, rows: usize) -> Result<()> {
        if table.len() >= rows {
            return Ok(());
        }
        let fresh = self.recurrence(rows)?;
        for n in table.len()..rows {
            table.push(fresh.a(n), fresh.b(n))?;
        }
        Ok(())
    }
}

impl RecurrenceSource for RecurrenceTable {
    fn recurrence(&self, rows: usize) -> Result<RecurrenceTable> {
        self.truncate(rows)
    }
}

/// Orthonormal polynomial family with an append-only table of recurrence pairs
#[derive(Debug, Clone)]
pub struct OrthogonalPolynomialBasis1D<S> {
    source: S,
    table: Option<RecurrenceTable>,
}

impl<S: RecurrenceSource> OrthogonalPolynomialBasis1D<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            table: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Number of pairs computed so far.
    pub fn cached_len(&self) -> usize {
        self.table.as_ref().map_or(0, RecurrenceTable::len)
    }

    /// The first `rows` pairs, computing only those not yet stored.
    pub fn recurrence(&mut self, rows: usize) -> Result<RecurrenceTable> {
        self.ensure(rows)?.truncate(rows)
    }

    fn ensure(&mut self, rows: usize) -> Result<&RecurrenceTable> {
        let rows = rows.max(1);
        let table = match &mut self.table {
            Some(table) => table,
            slot @ None => slot.insert(self.source.recurrence(rows)?),
        };
        if table.len() < rows {
            self.source.extend(table, rows)?;
        }
        Ok(&*table)
    }

    /// Values of p_n at `x` for each requested degree.
    pub fn eval(&mut self, x: &[f64], degrees: &[usize]) -> Result<Array2<f64>> {
        let nmax = degrees.iter().copied().max().unwrap_or(0);
        self.ensure(nmax + 1)?.eval(x, degrees)
    }

    /// `n`-point Gauss rule of the family's measure.
    pub fn gauss_quadrature(&mut self, n: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        self.ensure(n + 1)?.gauss_quadrature(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jacobi::JacobiPolynomials;
    use std::cell::Cell;

    /// Jacobi source that counts how many pairs it was asked for
    struct Counting {
        inner: JacobiPolynomials,
        requested: Cell<usize>,
    }

    impl RecurrenceSource for Counting {
        fn recurrence(&self, rows: usize) -> Result<RecurrenceTable> {
            self.requested.set(self.requested.get() + rows);
            Ok(self.inner.recurrence(rows))
        }
    }

    #[test]
    fn test_memoized_growth() {
        let mut family = OrthogonalPolynomialBasis1D::new(Counting {
            inner: JacobiPolynomials::legendre(),
            requested: Cell::new(0),
        });
        assert_eq!(family.cached_len(), 0);

        let first = family.recurrence(4).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(family.cached_len(), 4);
        assert_eq!(family.source().requested.get(), 4);

        // Served from the cache
        let again = family.recurrence(3).unwrap();
        assert_eq!(again, first.truncate(3).unwrap());
        assert_eq!(family.source().requested.get(), 4);

        // Growth keeps the stored prefix
        let grown = family.recurrence(7).unwrap();
        assert_eq!(grown.truncate(4).unwrap(), first);
        assert_eq!(family.cached_len(), 7);
    }

    #[test]
    fn test_fixed_table_source() {
        let table = JacobiPolynomials::legendre().recurrence(5);
        let mut family = OrthogonalPolynomialBasis1D::new(table.clone());
        let (x, w) = family.gauss_quadrature(4).unwrap();
        assert_eq!((x, w), table.gauss_quadrature(4).unwrap());

        let p = family.eval(&[0.5], &[0, 4]).unwrap();
        assert_eq!(p, table.eval(&[0.5], &[0, 4]).unwrap());

        assert!(family.recurrence(6).is_err());
    }
}
