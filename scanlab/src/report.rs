//! Report lines
//!
//! One line per timed strategy or sweep step on stdout, as text or JSON.

use std::io::{self, Write};

use scanlab_core::experiments::Record;
use scanlab_core::ExperimentConfig;
use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable text
    Text,
    /// One JSON object per line
    Json,
}

/// Render one record as a single line
pub fn render(record: &Record, format: Format) -> serde_json::Result<String> {
    if format == Format::Json {
        return serde_json::to_string(record);
    }
    Ok(match record {
        Record::Measurement(m) => match m.sample {
            Some(sample) => format!(
                "time ({}): {}μs (checksum = {}, [{}] = {})",
                m.label, m.micros, m.checksum, sample.index, sample.value
            ),
            None => format!("time ({}): {}μs (checksum = {})", m.label, m.micros, m.checksum),
        },
        Record::Sweep(p) => format!(
            "{:2} (selectivity: {:6.2}%)\t{}μs",
            p.step, p.selectivity, p.micros
        ),
        Record::Conjunction(p) => format!(
            "{:2}\t{:5.2}%\t{}μs\t{}μs\t{}μs",
            p.step, p.selectivity, p.branchless_micros, p.outer_range_micros, p.outer_parity_micros
        ),
        Record::Row(r) => format!("row #{}: a = {}", r.row, r.value),
    })
}

/// The effective configuration, tagged like a record
#[derive(Serialize)]
struct ConfigLine<'a> {
    kind: &'static str,
    #[serde(flatten)]
    config: &'a ExperimentConfig,
}

/// Echo the configuration as the first JSON line.
///
/// Text reports leave it to the `info` log.
pub fn emit_config(config: &ExperimentConfig, format: Format, out: &mut impl Write) -> io::Result<()> {
    if format == Format::Text {
        return Ok(());
    }
    let line = serde_json::to_string(&ConfigLine { kind: "config", config }).map_err(io::Error::other)?;
    writeln!(out, "{}", line)
}

/// Header printed above conjunction sweeps in text mode
pub const CONJUNCTION_HEADER: &str = "\tsel\tA\tmixed B\tmixed C";

/// Write every record, one per line
pub fn emit(records: &[Record], format: Format, out: &mut impl Write) -> io::Result<()> {
    if format == Format::Text && records.iter().any(|r| matches!(r, Record::Conjunction(_))) {
        writeln!(out, "{}", CONJUNCTION_HEADER)?;
    }
    for record in records {
        let line = render(record, format).map_err(io::Error::other)?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}
