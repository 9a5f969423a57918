//! Command-line arguments
//!
//! Every tunable is also read from a `SCANLAB_*` environment variable so
//! scripted runs need no flags.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use scanlab_core::config::{
    ExperimentConfig, DEFAULT_DUFF_ELEMENTS, DEFAULT_ELEMENTS, DEFAULT_SCAN_BYTES, DEFAULT_STEPS,
    DEFAULT_TOTAL_BYTES, DEFAULT_UNROLL_ELEMENTS,
};
use scanlab_core::prefetch::DEFAULT_LOOKAHEAD;
use scanlab_core::rng::DEFAULT_SEED;

/// Time one memory-access strategy and print raw results
#[derive(Debug, Parser)]
#[command(name = "scanlab", version, about)]
pub struct Cli {
    /// Emit one JSON object per line instead of text
    #[arg(long, global = true, env = "SCANLAB_JSON")]
    pub json: bool,

    #[command(flatten)]
    pub tunables: Tunables,

    /// Experiment to run (default: prefetch)
    #[command(subcommand)]
    pub experiment: Option<Experiment>,
}

/// Sizes and seeds shared by the experiments
#[derive(Debug, Clone, Args)]
pub struct Tunables {
    /// Column length for prefetch and selection experiments
    #[arg(long, global = true, env = "SCANLAB_ELEMENTS", default_value_t = DEFAULT_ELEMENTS)]
    pub elements: usize,

    /// Software prefetch distance in iterations
    #[arg(long, global = true, env = "SCANLAB_LOOKAHEAD", default_value_t = DEFAULT_LOOKAHEAD)]
    pub lookahead: usize,

    /// Threshold steps in selection sweeps
    #[arg(long, global = true, env = "SCANLAB_STEPS", default_value_t = DEFAULT_STEPS)]
    pub steps: usize,

    /// Generator seed
    #[arg(long, global = true, env = "SCANLAB_SEED", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Sort the column before a selection sweep
    #[arg(long, global = true, env = "SCANLAB_SORTED")]
    pub sorted: bool,

    /// Length of the subtract experiment
    #[arg(long, global = true, env = "SCANLAB_UNROLL_ELEMENTS", default_value_t = DEFAULT_UNROLL_ELEMENTS)]
    pub unroll_elements: usize,

    /// Length of the copy experiment
    #[arg(long, global = true, env = "SCANLAB_DUFF_ELEMENTS", default_value_t = DEFAULT_DUFF_ELEMENTS)]
    pub duff_elements: usize,

    /// Bytes in the repeatedly scanned area
    #[arg(long, global = true, env = "SCANLAB_SCAN_BYTES", default_value_t = DEFAULT_SCAN_BYTES)]
    pub scan_bytes: usize,

    /// Bytes streamed through the scan area in total
    #[arg(long, global = true, env = "SCANLAB_TOTAL_BYTES", default_value_t = DEFAULT_TOTAL_BYTES)]
    pub total_bytes: u64,
}

impl Tunables {
    /// Fold the flags into an experiment configuration
    pub fn into_config(self, path: Option<PathBuf>) -> ExperimentConfig {
        ExperimentConfig {
            elements: self.elements,
            lookahead: self.lookahead,
            steps: self.steps,
            seed: self.seed,
            sorted: self.sorted,
            unroll_elements: self.unroll_elements,
            duff_elements: self.duff_elements,
            scan_bytes: self.scan_bytes,
            total_bytes: self.total_bytes,
            path,
        }
    }
}

/// Available experiments
#[derive(Debug, Clone, Subcommand)]
pub enum Experiment {
    /// Repeatedly scan one area; compare an area that fits in cache with one that does not
    Transfer,
    /// Map a column of 4-byte integers and print its rows
    Column {
        /// Column file
        #[arg(env = "SCANLAB_PATH")]
        path: PathBuf,
        /// Print at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Map a file and scan its bytes, optionally advising sequential access
    Madvise {
        /// File to scan
        #[arg(env = "SCANLAB_PATH")]
        path: PathBuf,
        /// Advise the OS that access will be sequential
        #[arg(long)]
        advise: bool,
    },
    /// Linear scan against random bounce with and without software prefetch
    Prefetch,
    /// Sweep `value < v` over a random column
    Branch {
        /// Use the branchless selection loop
        #[arg(long)]
        branchless: bool,
    },
    /// Sweep `value < v ∧ even` with three loop shapes
    Conjunction,
    /// Element-wise subtraction, scalar or unrolled by four
    Unroll {
        /// Use the four-fold unrolled loop
        #[arg(short = 'u', long)]
        unrolled: bool,
    },
    /// Eight-fold unrolled copy against Duff's device
    Duff,
}

impl Experiment {
    /// Column file this experiment reads, if any
    pub fn path(&self) -> Option<PathBuf> {
        match self {
            Experiment::Column { path, .. } | Experiment::Madvise { path, .. } => Some(path.clone()),
            _ => None,
        }
    }
}
