//! Key and run-log export.
//!
//! # Export Bundle
//!
//! [`ExportBundle::write`] fills a directory with:
//! - `sim_result.csv` — final key table (`Index,Alice`: global qubit index, bit)
//! - `final_key.txt` — final key as a `0`/`1` digit string
//! - `sim_result.json` — the full [`RunResult`] as pretty JSON

use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::protocol::RunResult;
use crate::sweep::SweepPoint;

pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const KEY_TABLE_FILE: &str = "sim_result.csv";
pub const KEY_TEXT_FILE: &str = "final_key.txt";
pub const RUN_LOG_FILE: &str = "sim_result.json";

/// Render bits as a digit string, e.g. `[1, 0, 1]` → `"101"`.
pub fn bits_to_string(bits: &[u8]) -> String {
    bits.iter().map(|&b| if b == 0 { '0' } else { '1' }).collect()
}

/// Render bits as upper-case hex, most significant bit first.
///
/// The bit string is zero-padded on the right to a multiple of four, so
/// `[1]` becomes `"8"` and `[1, 0, 1, 1, 1]` becomes `"B8"`. An empty key
/// renders as an empty string.
pub fn bits_to_hex(bits: &[u8]) -> String {
    let mut out = String::with_capacity(bits.len().div_ceil(4));
    for chunk in bits.chunks(4) {
        let nibble = chunk
            .iter()
            .chain(std::iter::repeat(&0))
            .take(4)
            .fold(0u32, |acc, &b| (acc << 1) | u32::from(b != 0));
        // nibble < 16, always a valid hex digit
        out.push(char::from_digit(nibble, 16).unwrap_or('0').to_ascii_uppercase());
    }
    out
}

/// Final key as a CSV table: one row per retained bit with its qubit index.
pub fn key_table_csv(result: &RunResult) -> String {
    let mut csv = String::from("Index,Alice\n");
    for (&index, &bit) in result
        .final_key_global_indices
        .iter()
        .zip(&result.final_key_bits)
    {
        let _ = writeln!(csv, "{index},{bit}");
    }
    csv
}

/// QBER curve as a CSV table.
pub fn sweep_csv(points: &[SweepPoint]) -> String {
    let mut csv = String::from("probability,qber\n");
    for point in points {
        let _ = writeln!(csv, "{},{}", point.probability, point.qber);
    }
    csv
}

/// Full run log as pretty JSON.
pub fn run_log_json(result: &RunResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Paths written by [`ExportBundle::write`].
#[derive(Debug, Clone)]
pub struct ExportBundle {
    pub key_table: PathBuf,
    pub key_text: PathBuf,
    pub run_log: PathBuf,
}

impl ExportBundle {
    /// Write the CSV table, TXT key and JSON log into `dir`, creating it if needed.
    pub fn write(result: &RunResult, dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let bundle = Self {
            key_table: dir.join(KEY_TABLE_FILE),
            key_text: dir.join(KEY_TEXT_FILE),
            run_log: dir.join(RUN_LOG_FILE),
        };

        write_file(&bundle.key_table, key_table_csv(result).as_bytes())?;
        write_file(&bundle.key_text, bits_to_string(&result.final_key_bits).as_bytes())?;

        let mut log_writer = BufWriter::new(File::create(&bundle.run_log)?);
        serde_json::to_writer_pretty(&mut log_writer, result)?;
        log_writer.flush()?;

        log::debug!("exported run to {}", dir.display());
        Ok(bundle)
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents)?;
    writer.flush()?;
    Ok(())
}
