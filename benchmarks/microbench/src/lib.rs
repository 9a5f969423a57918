//! Shared inputs for the criterion benches.
//!
//! The benches repeat each strategy many times for statistics; the
//! `scanlab` binary runs each once. Sizes here are kept small enough for
//! criterion's sampling.

use scanlab_core::experiments::random_column;
use scanlab_core::{Buffer, Result};

/// Column length for scan and selection benches (4 Mi elements)
pub const BENCH_ELEMENTS: usize = 4 * 1024 * 1024;

/// Seed shared with the harness defaults
pub const BENCH_SEED: u64 = 42;

/// `i % 10` column, as scanned by the prefetch experiment
pub fn modulo_column(n: usize) -> Result<Buffer<i32>> {
    Buffer::filled_with(n, |i| (i % 10) as i32)
}

/// Random `0..=RAND_MAX` column, optionally sorted
pub fn selection_column(n: usize, sorted: bool) -> Result<Buffer<i32>> {
    let mut column = random_column(n, BENCH_SEED)?;
    if sorted {
        if let Some(values) = column.as_mut_slice() {
            values.sort_unstable();
        }
    }
    Ok(column)
}
