use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use scanlab_core::SeededRng;

// Keep LLVM from vectorizing or unrolling on its own, so the manual
// unrolling is what gets measured.
const NO_VECTORIZE_FLAGS: &str =
    "-C llvm-args=-vectorize-loops=false -C llvm-args=-vectorize-slp=false -C llvm-args=-unroll-threshold=0";

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let task = args.next().unwrap_or_else(|| "help".to_string());
    match task.as_str() {
        "run" => run_experiment(args.collect()),
        "column" => write_column(args.collect()),
        _ => {
            print_help();
            Ok(())
        }
    }
}

fn run_experiment(args: Vec<String>) -> Result<()> {
    let no_vectorize = args.iter().any(|a| a == "--no-vectorize");
    let forwarded: Vec<&String> = args.iter().filter(|a| *a != "--no-vectorize").collect();

    let mut cmd = Command::new("cargo");
    cmd.arg("run")
        .arg("--release")
        .arg("-p").arg("scanlab")
        .arg("--")
        .args(forwarded);
    if no_vectorize {
        // A separate target dir keeps the two codegen profiles from rebuilding each other.
        cmd.env("RUSTFLAGS", NO_VECTORIZE_FLAGS)
            .env("CARGO_TARGET_DIR", "target/no-vectorize");
    }
    run(&mut cmd, "experiment")
}

fn write_column(args: Vec<String>) -> Result<()> {
    let (Some(path), Some(count)) = (args.first(), args.get(1)) else {
        bail!("usage: cargo xtask column <path> <count> [--seed N] [--width 4|8]");
    };
    let count: usize = count.parse().with_context(|| format!("invalid element count {:?}", count))?;
    let seed = option_value(&args, "--seed")?.unwrap_or(scanlab_core::rng::DEFAULT_SEED);
    let width = option_value(&args, "--width")?.unwrap_or(4u64);

    let mut rng = SeededRng::new(seed);
    let file = File::create(Path::new(path)).with_context(|| format!("creating {}", path))?;
    let mut out = BufWriter::new(file);
    for _ in 0..count {
        let value = rng.next_rand();
        match width {
            4 => out.write_all(&(value as i32).to_le_bytes())?,
            8 => out.write_all(&value.to_le_bytes())?,
            other => bail!("unsupported element width {}", other),
        }
    }
    out.flush()?;
    println!("[xtask] wrote {} elements of {} bytes to {}", count, width, path);
    Ok(())
}

fn option_value(args: &[String], name: &str) -> Result<Option<u64>> {
    match args.iter().position(|a| a == name) {
        None => Ok(None),
        Some(i) => {
            let raw = args.get(i + 1).with_context(|| format!("{} needs a value", name))?;
            let value = raw.parse().with_context(|| format!("invalid {} value {:?}", name, raw))?;
            Ok(Some(value))
        }
    }
}

fn run(cmd: &mut Command, name: &str) -> Result<()> {
    println!("[xtask] {}: {:?}", name, cmd);
    let status = cmd.status().context("failed to run command")?;
    if !status.success() {
        bail!("{} failed with status {:?}", name, status);
    }
    Ok(())
}

fn print_help() {
    println!(
        "xtask usage:\n  cargo run -p xtask -- run [--no-vectorize] [scanlab args...]\n  cargo run -p xtask -- column <path> <count> [--seed N] [--width 4|8]"
    );
}
