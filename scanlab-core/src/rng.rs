//! Seeded pseudo-random generator
//!
//! The seed-to-sequence mapping is fixed and documented so that runs on
//! different machines (or ports to other languages) can compare checksums:
//!
//! * state: `splitmix64(seed)`, with a zero result replaced by
//!   [`ZERO_STATE_REPLACEMENT`]
//! * step (xorshift64*): `x ^= x >> 12; x ^= x << 25; x ^= x >> 27;`
//!   output `x * 0x2545F4914F6CDD1D` (wrapping)
//! * [`SeededRng::next_below`]: `(output as u128 * n as u128) >> 64`
//! * [`SeededRng::next_rand`]: `output >> 33`, in `0..=RAND_MAX`

/// Largest value produced by [`SeededRng::next_rand`]
pub const RAND_MAX: i64 = (1 << 31) - 1;

/// Seed used by every experiment unless configured otherwise
pub const DEFAULT_SEED: u64 = 42;

/// xorshift state must never be zero
pub const ZERO_STATE_REPLACEMENT: u64 = 0x9e37_79b9_7f4a_7c15;

const XORSHIFT_MULTIPLIER: u64 = 0x2545_f491_4f6c_dd1d;

/// SplitMix64 finaliser applied to `seed + golden gamma`
#[inline]
pub const fn splitmix64(seed: u64) -> u64 {
    let mut x = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// xorshift64* generator seeded through SplitMix64
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: u64,
    seed: u64,
}

impl SeededRng {
    /// Create a generator for `seed`
    pub const fn new(seed: u64) -> Self {
        let state = splitmix64(seed);
        Self {
            state: if state == 0 { ZERO_STATE_REPLACEMENT } else { state },
            seed,
        }
    }

    /// Seed this generator was created with
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Next raw 64-bit output
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(XORSHIFT_MULTIPLIER)
    }

    /// Next value in `0..bound`; `bound` must be non-zero
    #[inline(always)]
    pub fn next_below(&mut self, bound: usize) -> usize {
        debug_assert!(bound > 0);
        ((self.next_u64() as u128 * bound as u128) >> 64) as usize
    }

    /// Next value in `0..=RAND_MAX`
    #[inline(always)]
    pub fn next_rand(&mut self) -> i64 {
        (self.next_u64() >> 33) as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededRng::new(DEFAULT_SEED);
        let mut b = SeededRng::new(DEFAULT_SEED);
        for _ in 0..1000 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::new(1);
        let mut b = SeededRng::new(2);
        let same = (0..64).filter(|_| a.next_u64() == b.next_u64()).count();
        assert!(same < 64);
    }

    #[test]
    fn test_first_output_is_pinned() {
        // Changing the algorithm changes every recorded checksum.
        let state = splitmix64(DEFAULT_SEED);
        let mut x = state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        let mut rng = SeededRng::new(DEFAULT_SEED);
        assert_eq!(rng.next_u64(), x.wrapping_mul(XORSHIFT_MULTIPLIER));
    }

    #[test]
    fn test_bounds() {
        let mut rng = SeededRng::new(7);
        for _ in 0..10_000 {
            assert!(rng.next_below(10) < 10);
            let r = rng.next_rand();
            assert!((0..=RAND_MAX).contains(&r));
        }
        assert_eq!(rng.next_below(1), 0);
    }
}
