//! Access sequences
//!
//! Index generators that drive a scan over a buffer: the identity order
//! and the seeded "bounce" order, which samples uniformly with replacement
//! so indices may repeat.

use crate::rng::SeededRng;

/// `0, 1, …, n-1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Linear {
    next: usize,
    len: usize,
}

impl Linear {
    /// Start over from index 0
    pub fn restart(&mut self) {
        self.next = 0;
    }
}

impl Iterator for Linear {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.next < self.len {
            let i = self.next;
            self.next += 1;
            Some(i)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Linear {}

/// `trials` indices drawn uniformly from `0..bound`
#[derive(Debug, Clone)]
pub struct Bounce {
    rng: SeededRng,
    bound: usize,
    remaining: usize,
}

impl Bounce {
    /// Seed the sequence was generated from
    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

impl Iterator for Bounce {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.rng.next_below(self.bound))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Bounce {}

/// Either kind of sequence, for strategies chosen at runtime
#[derive(Debug, Clone)]
pub enum AccessSequence {
    /// Identity order
    Linear(Linear),
    /// Seeded pseudo-random order
    Random(Bounce),
}

impl AccessSequence {
    /// Identity order over `n` elements
    pub fn linear(n: usize) -> Self {
        AccessSequence::Linear(linear(n))
    }

    /// Seeded pseudo-random order over `n` elements, `n` draws long
    pub fn random_permutation_like(n: usize, seed: u64) -> Self {
        AccessSequence::Random(random_permutation_like(n, seed))
    }
}

impl Iterator for AccessSequence {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match self {
            AccessSequence::Linear(seq) => seq.next(),
            AccessSequence::Random(seq) => seq.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            AccessSequence::Linear(seq) => seq.size_hint(),
            AccessSequence::Random(seq) => seq.size_hint(),
        }
    }
}

/// Identity order over `n` elements
pub fn linear(n: usize) -> Linear {
    Linear { next: 0, len: n }
}

/// `n` draws from `0..n`; identical seeds give identical sequences
pub fn random_permutation_like(n: usize, seed: u64) -> Bounce {
    bounce_trials(n, n, seed)
}

/// `trials` draws from `0..bound`. An empty range yields nothing.
pub fn bounce_trials(bound: usize, trials: usize, seed: u64) -> Bounce {
    Bounce {
        rng: SeededRng::new(seed),
        bound,
        remaining: if bound == 0 { 0 } else { trials },
    }
}
