//! Scanlab Core
//!
//! Memory-access and execution-strategy experiments on the primitives of a
//! columnar engine: sequential scan, selection, element-wise arithmetic and
//! bulk copy. A [`Buffer`] is driven through one interchangeable strategy
//! at a time under a [`harness::Stopwatch`], and every strategy yields a
//! value that depends on all elements it touched.
//!
//! Everything runs on the calling thread; nothing here spawns.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod access;
pub mod buffer;
pub mod config;
pub mod element;
pub mod error;
pub mod experiments;
pub mod harness;
pub mod predicate;
pub mod prefetch;
pub mod rng;
pub mod scan;
pub mod transform;

// Re-export commonly used types and functions
pub use access::{bounce_trials, linear, random_permutation_like, AccessSequence, Bounce, Linear};
pub use buffer::{Backing, Buffer};
pub use config::ExperimentConfig;
pub use element::{checksum, Element};
pub use error::{Error, Result};
pub use experiments::Record;
pub use harness::{sweep, time, Measurement, Stopwatch, SweepPoint, Timed};
pub use predicate::{ConjunctionStrategy, SelectionResult, SelectionStrategy, SelectionVector};
pub use prefetch::{advise_sequential, prefetch_read, AdviceOutcome, LookaheadWindow};
pub use rng::{SeededRng, RAND_MAX};
pub use transform::{TransformStrategy, UnrollFactor};
