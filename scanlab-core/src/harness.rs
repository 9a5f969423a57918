//! Stopwatch and report records
//!
//! [`time`] brackets exactly one strategy call with monotonic timestamps.
//! Setup (allocation, mapping, filling, priming) happens before the call
//! and verification after it. The returned value goes through
//! [`black_box`] so the optimizer cannot drop the work that produced it.

use core::hint::black_box;
use std::time::{Duration, Instant};

use log::trace;
use serde::Serialize;

use crate::predicate::SelectionResult;

/// Monotonic stopwatch
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    /// Start timing now
    #[inline(always)]
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Time since [`Stopwatch::start`]
    #[inline(always)]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// A strategy's result and how long it took
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timed<R> {
    /// Wall-clock duration of the call
    pub elapsed: Duration,
    /// Whatever the strategy returned
    pub value: R,
}

impl<R> Timed<R> {
    /// Duration in whole microseconds
    pub fn micros(&self) -> u64 {
        u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX)
    }

    /// Replace the value, e.g. with a checksum computed after timing
    pub fn map<U>(self, f: impl FnOnce(R) -> U) -> Timed<U> {
        Timed { elapsed: self.elapsed, value: f(self.value) }
    }
}

/// Time one call of `strategy`
#[inline(always)]
pub fn time<R>(strategy: impl FnOnce() -> R) -> Timed<R> {
    let stopwatch = Stopwatch::start();
    let value = black_box(strategy());
    let elapsed = stopwatch.elapsed();
    Timed { elapsed, value }
}

/// One element read back from an output buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    /// Position in the buffer
    pub index: usize,
    /// Value found there
    pub value: i64,
}

/// A single timed strategy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    /// Which strategy ran
    pub label: String,
    /// Elapsed microseconds
    pub micros: u64,
    /// Value derived from every element the strategy produced or read
    pub checksum: i64,
    /// Spot check of one output element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<Sample>,
}

impl Measurement {
    /// Record a timed strategy whose value is its checksum
    pub fn from_timed(label: impl Into<String>, timed: &Timed<i64>) -> Self {
        Self {
            label: label.into(),
            micros: timed.micros(),
            checksum: timed.value,
            sample: None,
        }
    }

    /// Attach a spot check
    pub fn with_sample(mut self, index: usize, value: i64) -> Self {
        self.sample = Some(Sample { index, value });
        self
    }
}

/// One step of a single-strategy threshold sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    /// Step number, from 0
    pub step: usize,
    /// Threshold `v` for this step
    pub threshold: i64,
    /// Qualifying rows
    pub count: usize,
    /// Qualifying share in percent
    pub selectivity: f64,
    /// Elapsed microseconds
    pub micros: u64,
}

/// Threshold for `step` of `steps`, spanning `0..=domain_max` linearly.
///
/// Integer division, so the last step may fall just short of `domain_max`.
pub fn threshold(step: usize, steps: usize, domain_max: i64) -> i64 {
    let stride = domain_max / (steps.max(2) - 1) as i64;
    step as i64 * stride
}

/// Re-time one selection strategy once per threshold step, in step order
pub fn sweep(
    steps: usize,
    domain_max: i64,
    mut strategy: impl FnMut(i64) -> SelectionResult,
) -> Vec<SweepPoint> {
    (0..steps)
        .map(|step| {
            let v = threshold(step, steps, domain_max);
            let timed = time(|| strategy(v));
            trace!("sweep step {} (v = {}): {:?} in {:?}", step, v, timed.value, timed.elapsed);
            SweepPoint {
                step,
                threshold: v,
                count: timed.value.count,
                selectivity: timed.value.percent(),
                micros: timed.micros(),
            }
        })
        .collect()
}
