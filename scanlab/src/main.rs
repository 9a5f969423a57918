//! scanlab: run one memory-subsystem experiment and print raw timings.
//!
//! ```text
//! scanlab [--json] [tunables] [transfer|column|madvise|prefetch|branch|conjunction|unroll|duff]
//! ```
//!
//! Without an experiment the prefetch comparison runs. Logs go to stderr
//! (`RUST_LOG`, default `warn`); report lines go to stdout.

mod cli;
mod report;

use std::io;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use scanlab_core::experiments::{self, Record};
use scanlab_core::predicate::SelectionStrategy;
use scanlab_core::ExperimentConfig;

use crate::cli::{Cli, Experiment};
use crate::report::Format;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let experiment = cli.experiment.unwrap_or(Experiment::Prefetch);
    let config = cli.tunables.into_config(experiment.path());
    config.validate().context("invalid experiment configuration")?;
    info!("running {:?} with {:?}", experiment, config);

    let records = run(&experiment, &config)?;

    let format = if cli.json { Format::Json } else { Format::Text };
    let mut stdout = io::stdout().lock();
    report::emit_config(&config, format, &mut stdout).context("failed to write report")?;
    report::emit(&records, format, &mut stdout).context("failed to write report")?;
    Ok(())
}

fn run(experiment: &Experiment, config: &ExperimentConfig) -> Result<Vec<Record>> {
    let records = match experiment {
        Experiment::Transfer => experiments::transfer(config),
        Experiment::Column { path, limit } => experiments::column_dump(path, *limit),
        Experiment::Madvise { path, advise } => experiments::madvise_scan(path, *advise),
        Experiment::Prefetch => experiments::prefetch(config),
        Experiment::Branch { branchless } => {
            let strategy = if *branchless {
                SelectionStrategy::Branchless
            } else {
                SelectionStrategy::Branching
            };
            experiments::branch_sweep(config, strategy)
        }
        Experiment::Conjunction => experiments::conjunction_sweep(config),
        Experiment::Unroll { unrolled } => experiments::unroll(config, *unrolled),
        Experiment::Duff => experiments::duff(config),
    };
    records.with_context(|| format!("{:?} experiment setup failed", experiment))
}
