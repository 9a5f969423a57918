//! Bulk element-wise transforms
//!
//! `subtract` and `copy` share one set of index drivers, so every loop
//! shape is available for both operations:
//!
//! * scalar: one element per iteration
//! * fixed unroll by `K`: `K` elements per iteration, `len % K` trailing
//!   elements are never visited
//! * Duff's device: the `len % K` leading elements are handled by entering
//!   the unrolled body part-way, then whole bodies cover the rest

use core::fmt;

use serde::Serialize;

use crate::element::Element;

/// Manual unroll factor `K`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnrollFactor {
    /// Four copies of the body per iteration
    Four,
    /// Eight copies of the body per iteration
    Eight,
}

impl UnrollFactor {
    /// `K` as a number
    pub const fn get(self) -> usize {
        match self {
            UnrollFactor::Four => 4,
            UnrollFactor::Eight => 8,
        }
    }
}

/// Loop shape for a bulk transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformStrategy {
    /// One element per iteration
    Scalar,
    /// `K` elements per iteration.
    ///
    /// Precondition: the length is a multiple of `K`. This is not checked;
    /// otherwise the output tail keeps whatever it held before.
    Unrolled(UnrollFactor),
    /// `K` elements per iteration with a computed entry for the remainder
    Duff(UnrollFactor),
}

impl TransformStrategy {
    /// Elements a transform of `len` elements actually writes
    pub const fn covered(self, len: usize) -> usize {
        match self {
            TransformStrategy::Scalar | TransformStrategy::Duff(_) => len,
            TransformStrategy::Unrolled(k) => len - len % k.get(),
        }
    }

    /// Loop iterations a transform of `len` elements runs
    pub const fn iterations(self, len: usize) -> usize {
        match self {
            TransformStrategy::Scalar => len,
            TransformStrategy::Unrolled(k) => len / k.get(),
            TransformStrategy::Duff(k) => len.div_ceil(k.get()),
        }
    }

    /// Call `step(k)` for every index this strategy covers, in order
    #[inline(always)]
    pub fn drive(self, len: usize, mut step: impl FnMut(usize)) {
        match self {
            TransformStrategy::Scalar => drive_scalar(len, &mut step),
            TransformStrategy::Unrolled(UnrollFactor::Four) => drive_unrolled4(len, &mut step),
            TransformStrategy::Unrolled(UnrollFactor::Eight) => drive_unrolled8(len, &mut step),
            TransformStrategy::Duff(UnrollFactor::Four) => drive_duff4(len, &mut step),
            TransformStrategy::Duff(UnrollFactor::Eight) => drive_duff8(len, &mut step),
        }
    }
}

impl fmt::Display for TransformStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformStrategy::Scalar => write!(f, "scalar"),
            TransformStrategy::Unrolled(k) => write!(f, "unrolled x{}", k.get()),
            TransformStrategy::Duff(k) => write!(f, "duff x{}", k.get()),
        }
    }
}

#[inline(always)]
fn drive_scalar(len: usize, step: &mut impl FnMut(usize)) {
    for k in 0..len {
        step(k);
    }
}

#[inline(always)]
fn drive_unrolled4(len: usize, step: &mut impl FnMut(usize)) {
    let mut k = 0;
    for _ in 0..len / 4 {
        step(k);
        step(k + 1);
        step(k + 2);
        step(k + 3);
        k += 4;
    }
}

#[inline(always)]
fn drive_unrolled8(len: usize, step: &mut impl FnMut(usize)) {
    let mut k = 0;
    for _ in 0..len / 8 {
        step(k);
        step(k + 1);
        step(k + 2);
        step(k + 3);
        step(k + 4);
        step(k + 5);
        step(k + 6);
        step(k + 7);
        k += 8;
    }
}

#[inline(always)]
fn drive_duff4(len: usize, step: &mut impl FnMut(usize)) {
    let rem = len % 4;
    let mut k = 0;
    // Entry at `case rem`: each guard stays true from the entry point on.
    if rem >= 3 {
        step(k);
        k += 1;
    }
    if rem >= 2 {
        step(k);
        k += 1;
    }
    if rem >= 1 {
        step(k);
        k += 1;
    }
    while k < len {
        step(k);
        step(k + 1);
        step(k + 2);
        step(k + 3);
        k += 4;
    }
}

#[inline(always)]
fn drive_duff8(len: usize, step: &mut impl FnMut(usize)) {
    let rem = len % 8;
    let mut k = 0;
    // Entry at `case rem`: each guard stays true from the entry point on.
    if rem >= 7 {
        step(k);
        k += 1;
    }
    if rem >= 6 {
        step(k);
        k += 1;
    }
    if rem >= 5 {
        step(k);
        k += 1;
    }
    if rem >= 4 {
        step(k);
        k += 1;
    }
    if rem >= 3 {
        step(k);
        k += 1;
    }
    if rem >= 2 {
        step(k);
        k += 1;
    }
    if rem >= 1 {
        step(k);
        k += 1;
    }
    while k < len {
        step(k);
        step(k + 1);
        step(k + 2);
        step(k + 3);
        step(k + 4);
        step(k + 5);
        step(k + 6);
        step(k + 7);
        k += 8;
    }
}

/// `out[k] = left[k] - right[k]` (wrapping)
///
/// # Panics
///
/// If the three slices differ in length.
#[inline(never)]
pub fn subtract<T: Element>(left: &[T], right: &[T], out: &mut [T], strategy: TransformStrategy) {
    assert_eq!(left.len(), out.len(), "left input and output lengths differ");
    assert_eq!(right.len(), out.len(), "right input and output lengths differ");
    let len = out.len();
    strategy.drive(len, |k| out[k] = left[k].wrapping_sub(right[k]));
}

/// `to[k] = from[k]`
///
/// # Panics
///
/// If the slices differ in length.
#[inline(never)]
pub fn copy<T: Element>(from: &[T], to: &mut [T], strategy: TransformStrategy) {
    assert_eq!(from.len(), to.len(), "source and destination lengths differ");
    let len = to.len();
    strategy.drive(len, |k| to[k] = from[k]);
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [TransformStrategy; 5] = [
        TransformStrategy::Scalar,
        TransformStrategy::Unrolled(UnrollFactor::Four),
        TransformStrategy::Unrolled(UnrollFactor::Eight),
        TransformStrategy::Duff(UnrollFactor::Four),
        TransformStrategy::Duff(UnrollFactor::Eight),
    ];

    fn visited(strategy: TransformStrategy, len: usize) -> Vec<usize> {
        let mut seen = Vec::new();
        strategy.drive(len, |k| seen.push(k));
        seen
    }

    #[test]
    fn test_drivers_visit_in_order() {
        for len in 0..40 {
            for strategy in ALL {
                let seen = visited(strategy, len);
                let expected: Vec<usize> = (0..strategy.covered(len)).collect();
                assert_eq!(seen, expected, "{} over {}", strategy, len);
            }
        }
    }

    #[test]
    fn test_iteration_counts() {
        let duff = TransformStrategy::Duff(UnrollFactor::Eight);
        assert_eq!(duff.iterations(0), 0);
        assert_eq!(duff.iterations(1), 1);
        assert_eq!(duff.iterations(8), 1);
        assert_eq!(duff.iterations(9), 2);
        assert_eq!(duff.iterations(255), 32);
        assert_eq!(TransformStrategy::Unrolled(UnrollFactor::Eight).iterations(255), 31);
        assert_eq!(TransformStrategy::Scalar.iterations(255), 255);
    }

    #[test]
    fn test_duff_matches_scalar_at_boundaries() {
        for factor in [UnrollFactor::Four, UnrollFactor::Eight] {
            let k = factor.get();
            for len in [0, 1, k - 1, k, k + 1, 2 * k] {
                let from: Vec<i32> = (0..len as i32).map(|i| i * 7 - 3).collect();
                let mut scalar = vec![0; len];
                let mut duff = vec![0; len];
                copy(&from, &mut scalar, TransformStrategy::Scalar);
                copy(&from, &mut duff, TransformStrategy::Duff(factor));
                assert_eq!(duff, scalar, "len {} with K={}", len, k);
            }
        }
    }

    #[test]
    fn test_subtract_strategies_agree_on_divisible_length() {
        let left: Vec<i64> = (0..64).map(|i| i * 3).collect();
        let right: Vec<i64> = (0..64).map(|i| i - 5).collect();
        let mut reference = vec![0; 64];
        subtract(&left, &right, &mut reference, TransformStrategy::Scalar);
        assert_eq!(reference[10], 30 - 5);

        for strategy in ALL {
            let mut out = vec![0; 64];
            subtract(&left, &right, &mut out, strategy);
            assert_eq!(out, reference, "{}", strategy);
        }
    }

    #[test]
    fn test_subtract_wraps() {
        let mut out = [0i32; 1];
        subtract(&[i32::MIN], &[1], &mut out, TransformStrategy::Scalar);
        assert_eq!(out, [i32::MAX]);
    }

    #[test]
    fn test_unrolled_truncates_tail() {
        let from = vec![42i32; 11];
        let mut to = vec![0i32; 11];
        copy(&from, &mut to, TransformStrategy::Unrolled(UnrollFactor::Four));
        assert_eq!(&to[..8], &[42; 8]);
        assert_eq!(&to[8..], &[0; 3]);
    }

    #[test]
    #[should_panic(expected = "source and destination lengths differ")]
    fn test_copy_length_mismatch_panics() {
        let mut to = [0u8; 3];
        copy(&[1u8, 2], &mut to, TransformStrategy::Scalar);
    }
}
