//! Experiments
//!
//! Each experiment builds its buffers, times one strategy call at a time
//! and returns report records. Setup failures are returned before any
//! stopwatch starts.

use std::path::Path;

use log::{debug, warn};
use serde::Serialize;

use crate::access::random_permutation_like;
use crate::buffer::{filled_vec, zeroed_vec, Buffer};
use crate::config::ExperimentConfig;
use crate::element::{checksum, Element};
use crate::error::Result;
use crate::harness::{sweep, threshold, time, Measurement, SweepPoint};
use crate::predicate::{ConjunctionStrategy, SelectionStrategy, SelectionVector};
use crate::prefetch::{advise_sequential, AdviceLabel};
use crate::rng::{SeededRng, RAND_MAX};
use crate::scan::{sum_linear, sum_repeated, sum_sequence, PrefetchingBounce};
use crate::transform::{copy, subtract, TransformStrategy, UnrollFactor};

/// Fill value for the subtract and copy experiments
pub const FILL_VALUE: i32 = 42;

/// One step of the conjunctive sweep, all three strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConjunctionPoint {
    /// Step number, from 0
    pub step: usize,
    /// Threshold `v` for this step
    pub threshold: i64,
    /// Qualifying rows (identical for every strategy)
    pub count: usize,
    /// Qualifying share in percent
    pub selectivity: f64,
    /// Fully branchless strategy
    pub branchless_micros: u64,
    /// Branch on the range predicate
    pub outer_range_micros: u64,
    /// Branch on the parity predicate
    pub outer_parity_micros: u64,
}

/// A row read from a mapped column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Row number
    pub row: usize,
    /// Column value
    pub value: i64,
}

/// Anything an experiment reports
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    /// A timed strategy
    Measurement(Measurement),
    /// A single-strategy sweep step
    Sweep(SweepPoint),
    /// A conjunctive sweep step
    Conjunction(ConjunctionPoint),
    /// A column row
    Row(Row),
}

/// Column of `n` values drawn from `0..=RAND_MAX`
pub fn random_column(n: usize, seed: u64) -> Result<Buffer<i32>> {
    let mut rng = SeededRng::new(seed);
    Buffer::filled_with(n, |_| rng.next_rand() as i32)
}

/// Repeatedly scan a `scan_bytes` area until `total_bytes` have streamed by.
///
/// Every page of the area is written before timing starts, so the scan
/// reads resident, distinct pages.
pub fn transfer(config: &ExperimentConfig) -> Result<Vec<Record>> {
    config.validate()?;
    let area = Buffer::<i64>::filled_with(config.scan_bytes / i64::WIDTH, |i| (i % 10) as i64)?;
    let passes = config.scan_passes();
    debug!(
        "transfer: {} byte area at {:#x}, {} passes",
        area.byte_len(),
        area.base_addr(),
        passes
    );

    let timed = time(|| sum_repeated(&area, passes));
    let label = format!("scan {} bytes x {}", area.byte_len(), passes);
    Ok(vec![Record::Measurement(Measurement::from_timed(label, &timed))])
}

/// Map a column of 4-byte integers and read its rows back.
///
/// Emits at most `limit` rows, then a timed linear scan of the whole column.
pub fn column_dump(path: &Path, limit: Option<usize>) -> Result<Vec<Record>> {
    let column = Buffer::<i32>::map_file(path)?;
    let shown = limit.unwrap_or(column.len()).min(column.len());

    let mut records: Vec<Record> = column[..shown]
        .iter()
        .enumerate()
        .map(|(row, &value)| Record::Row(Row { row, value: value.to_i64() }))
        .collect();

    let timed = time(|| sum_linear(&column));
    records.push(Record::Measurement(Measurement::from_timed("column scan", &timed)));
    Ok(records)
}

/// Map any file as bytes and scan it, optionally advising sequential access
pub fn madvise_scan(path: &Path, advise: bool) -> Result<Vec<Record>> {
    let map = Buffer::<u8>::map_file(path)?;
    let advice = if advise {
        advise_sequential(&map).label()
    } else {
        AdviceLabel::Unsupported
    };
    debug!("madvise: {} bytes, advice {:?}", map.len(), advice);

    let timed = time(|| sum_linear(&map));
    let label = match (advise, advice) {
        (false, _) => "scan (no madvise)".to_string(),
        (true, AdviceLabel::Applied) => "scan (madvise sequential)".to_string(),
        (true, other) => format!("scan (madvise {:?}, ignored)", other).to_lowercase(),
    };
    Ok(vec![Record::Measurement(Measurement::from_timed(label, &timed))])
}

/// Linear scan, random bounce, and random bounce with software prefetch
pub fn prefetch(config: &ExperimentConfig) -> Result<Vec<Record>> {
    config.validate()?;
    let n = config.elements;
    let vector = Buffer::<i32>::filled_with(n, |i| (i % 10) as i32)?;

    let linear = time(|| sum_linear(&vector));
    let bounce = time(|| sum_sequence(&vector, random_permutation_like(n, config.seed)));
    let traversal = PrefetchingBounce::prime(n, config.lookahead, config.seed);
    let prefetching = time(|| traversal.sum(&vector));

    if bounce.value != prefetching.value {
        warn!(
            "bounce checksums differ ({} vs {}); the traversals read different indices",
            bounce.value, prefetching.value
        );
    }

    Ok(vec![
        Record::Measurement(Measurement::from_timed("linear", &linear)),
        Record::Measurement(Measurement::from_timed("bounce", &bounce)),
        Record::Measurement(Measurement::from_timed(
            format!("bounce with prefetch (lookahead {})", config.lookahead),
            &prefetching,
        )),
    ])
}

/// Sweep `value < v` over a random column with one selection strategy
pub fn branch_sweep(config: &ExperimentConfig, strategy: SelectionStrategy) -> Result<Vec<Record>> {
    config.validate()?;
    let mut column = random_column(config.elements, config.seed)?;
    if config.sorted {
        if let Some(values) = column.as_mut_slice() {
            values.sort_unstable();
        }
    }
    let mut out = SelectionVector::with_capacity(column.len());
    debug!("branch sweep: {:?} over {} rows, sorted: {}", strategy, column.len(), config.sorted);

    let points = sweep(config.steps, RAND_MAX, |v| {
        strategy.select_less_than(&column, i32::from_i64(v), &mut out)
    });
    Ok(points.into_iter().map(Record::Sweep).collect())
}

/// Sweep `value < v ∧ even` with all three conjunction strategies per step
pub fn conjunction_sweep(config: &ExperimentConfig) -> Result<Vec<Record>> {
    config.validate()?;
    let mut column = random_column(config.elements, config.seed)?;
    if config.sorted {
        if let Some(values) = column.as_mut_slice() {
            values.sort_unstable();
        }
    }
    let mut out = SelectionVector::with_capacity(column.len());

    let mut records = Vec::with_capacity(config.steps);
    for step in 0..config.steps {
        let v = threshold(step, config.steps, RAND_MAX);
        let t = i32::from_i64(v);
        let [branchless, outer_range, outer_parity] =
            ConjunctionStrategy::ALL.map(|strategy| time(|| strategy.select(&column, t, &mut out)));

        if branchless.value != outer_range.value || branchless.value != outer_parity.value {
            warn!("conjunction strategies disagree at step {}", step);
        }
        records.push(Record::Conjunction(ConjunctionPoint {
            step,
            threshold: v,
            count: outer_parity.value.count,
            selectivity: outer_parity.value.percent(),
            branchless_micros: branchless.micros(),
            outer_range_micros: outer_range.micros(),
            outer_parity_micros: outer_parity.micros(),
        }));
    }
    Ok(records)
}

/// Element-wise subtraction, scalar or unrolled by four.
///
/// The unrolled loop assumes a length divisible by four.
pub fn unroll(config: &ExperimentConfig, unrolled: bool) -> Result<Vec<Record>> {
    let n = config.unroll_elements;
    let strategy = if unrolled {
        TransformStrategy::Unrolled(UnrollFactor::Four)
    } else {
        TransformStrategy::Scalar
    };
    if strategy.covered(n) != n {
        warn!("{} elements is not a multiple of 4; the unrolled loop skips the tail", n);
    }

    let left = Buffer::<i32>::filled_with(n, |_| FILL_VALUE)?;
    let right = Buffer::<i32>::filled_with(n, |_| FILL_VALUE)?;
    let mut out = filled_vec(n, |_| FILL_VALUE)?;

    let timed = time(|| subtract(&left, &right, &mut out, strategy));
    let mut measurement = Measurement::from_timed(strategy.to_string(), &timed.map(|_| checksum(&out)));
    if let Some(&value) = out.get(42) {
        measurement = measurement.with_sample(42, value.to_i64());
    }
    Ok(vec![Record::Measurement(measurement)])
}

/// Eight-fold unrolled copy against Duff's device on the same input
pub fn duff(config: &ExperimentConfig) -> Result<Vec<Record>> {
    let n = config.duff_elements;
    let from = Buffer::<i32>::filled_with(n, |_| FILL_VALUE)?;

    let mut records = Vec::with_capacity(2);
    for strategy in [
        TransformStrategy::Unrolled(UnrollFactor::Eight),
        TransformStrategy::Duff(UnrollFactor::Eight),
    ] {
        let mut out = zeroed_vec::<i32>(n)?;
        let timed = time(|| copy(&from, &mut out, strategy));
        let mut measurement = Measurement::from_timed(strategy.to_string(), &timed.map(|_| checksum(&out)));
        if let Some(&last) = out.last() {
            measurement = measurement.with_sample(n - 1, last.to_i64());
        }
        records.push(Record::Measurement(measurement));
    }
    Ok(records)
}
