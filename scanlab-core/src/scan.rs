//! Raw scans
//!
//! Summing strategies whose only difference is the order in which memory
//! is touched. Each returns the wrapping `i64` sum of the elements it read.

use crate::element::Element;
use crate::prefetch::{prefetch_read, LookaheadWindow};
use crate::rng::SeededRng;

/// Front-to-back sum. The CPU's own stream detector does the prefetching.
#[inline(never)]
pub fn sum_linear<T: Element>(values: &[T]) -> i64 {
    let mut sum = 0i64;
    for v in values {
        sum = sum.wrapping_add(v.to_i64());
    }
    sum
}

/// Sum the elements a sequence points at, in sequence order
#[inline(never)]
pub fn sum_sequence<T: Element>(values: &[T], sequence: impl Iterator<Item = usize>) -> i64 {
    let mut sum = 0i64;
    for i in sequence {
        sum = sum.wrapping_add(values[i].to_i64());
    }
    sum
}

/// Random traversal with software prefetch, primed and ready to run.
///
/// Priming draws the first `L` indices into a [`LookaheadWindow`]; each
/// iteration then consumes the oldest pending index, draws its
/// replacement and prefetches the element the replacement points at,
/// which is read `L` iterations later. The indices read are the first `n`
/// draws of the generator, the same as
/// `sum_sequence(values, random_permutation_like(n, seed))`.
#[derive(Debug, Clone)]
pub struct PrefetchingBounce {
    rng: SeededRng,
    window: LookaheadWindow,
    len: usize,
}

impl PrefetchingBounce {
    /// Seed the generator and fill the window, outside any timed region
    pub fn prime(len: usize, lookahead: usize, seed: u64) -> Self {
        let mut rng = SeededRng::new(seed);
        let window = LookaheadWindow::primed(lookahead, || if len == 0 { 0 } else { rng.next_below(len) });
        Self { rng, window, len }
    }

    /// Lookahead distance in iterations
    pub fn lookahead(&self) -> usize {
        self.window.distance()
    }

    /// Run the traversal over `values`, which must have the primed length
    #[inline(never)]
    pub fn sum<T: Element>(mut self, values: &[T]) -> i64 {
        assert_eq!(values.len(), self.len, "traversal primed for a different length");
        let n = self.len;
        let mut sum = 0i64;
        for _ in 0..n {
            let incoming = self.rng.next_below(n);
            let due = self.window.rotate(incoming);
            sum = sum.wrapping_add(values[due].to_i64());
            prefetch_read(&values[incoming]);
        }
        sum
    }
}

/// Prime and run a [`PrefetchingBounce`] in one call
pub fn sum_prefetching_bounce<T: Element>(values: &[T], lookahead: usize, seed: u64) -> i64 {
    PrefetchingBounce::prime(values.len(), lookahead, seed).sum(values)
}

/// Scan the same area `passes` times; a small area stays cache resident
#[inline(never)]
pub fn sum_repeated<T: Element>(values: &[T], passes: u64) -> i64 {
    let mut sum = 0i64;
    for _ in 0..passes {
        sum = sum.wrapping_add(sum_linear(values));
    }
    sum
}
