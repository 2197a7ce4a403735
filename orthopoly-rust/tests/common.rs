//! Common test utilities

#![allow(dead_code)]

use orthopoly::RecurrenceTable;

/// Simple deterministic pseudo-random number generator (LCG)
///
/// Linear Congruential Generator for reproducible random numbers in tests.
/// Uses the common parameters: a = 1664525, c = 1013904223 (from Numerical Recipes)
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Generate next f64 in range [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // Map to [0, 1) using upper 48 bits
        ((self.state >> 16) as f64) / ((1u64 << 48) as f64)
    }

    /// Generate next f64 in range [lo, hi)
    pub fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Legendre weight on [-1, 1]: a_n = 0, b_0 = sqrt(2), b_n = n / sqrt(4n^2 - 1)
pub fn legendre_table(rows: usize) -> RecurrenceTable {
    let mut table = RecurrenceTable::from_mass(2.0).unwrap();
    for n in 1..rows {
        let nf = n as f64;
        table.push(0.0, nf / (4.0 * nf * nf - 1.0).sqrt()).unwrap();
    }
    table
}

/// Hermite weight exp(-x^2) on the real line: a_n = 0, b_0 = pi^{1/4}, b_n = sqrt(n / 2)
pub fn hermite_table(rows: usize) -> RecurrenceTable {
    let mut table = RecurrenceTable::from_mass(std::f64::consts::PI.sqrt()).unwrap();
    for n in 1..rows {
        table.push(0.0, (n as f64 / 2.0).sqrt()).unwrap();
    }
    table
}

/// Laguerre weight exp(-x) on [0, inf): a_n = 2n - 1, b_0 = 1, b_n = n
pub fn laguerre_table(rows: usize) -> RecurrenceTable {
    let mut table = RecurrenceTable::from_mass(1.0).unwrap();
    for n in 1..rows {
        table.push(2.0 * n as f64 - 1.0, n as f64).unwrap();
    }
    table
}

/// Largest entrywise difference between the first `rows` pairs of two tables
pub fn max_table_error(actual: &RecurrenceTable, expected: &RecurrenceTable, rows: usize) -> f64 {
    (0..rows)
        .map(|n| {
            (actual.a(n) - expected.a(n))
                .abs()
                .max((actual.b(n) - expected.b(n)).abs())
        })
        .fold(0.0, f64::max)
}
