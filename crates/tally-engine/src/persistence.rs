//! JSONL persistence for the history sequence.
//!
//! One JSON object per line, fixed columns
//! `operation, operand1, operand2, result, timestamp`. Operand and result
//! values are decimal-preserving text, timestamps sortable ISO-8601 text.
//! Loading recomputes every result through the registry (see
//! `tally_core::record`); malformed input surfaces as a structured
//! `InvalidPersistedData` error carrying the line number, never a raw
//! serde error.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tally_core::{CalcError, CalcRow, Calculation, OpRegistry, Result};

/// Write the full history to `path`, one row per line. The parent
/// directory must already exist.
pub fn save_history(path: &Path, history: &[Calculation]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in history {
        let row = record.to_row();
        let line = serde_json::to_string(&row)
            .map_err(|e| CalcError::persisted(format!("failed to encode row: {e}")))?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Load and verify history rows from `path`.
///
/// A missing file yields an empty history (first run). Blank lines are
/// skipped; anything else that fails to parse or recompute aborts the load
/// with `InvalidPersistedData`.
pub fn load_history(path: &Path, registry: &OpRegistry) -> Result<Vec<Calculation>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut history = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: CalcRow = serde_json::from_str(&line).map_err(|e| {
            CalcError::persisted(format!("line {}: malformed row: {e}", index + 1))
        })?;
        let record = Calculation::from_row(&row, registry).map_err(|e| match e {
            CalcError::InvalidPersistedData { message } => {
                CalcError::persisted(format!("line {}: {message}", index + 1))
            }
            other => other,
        })?;
        history.push(record);
    }
    Ok(history)
}
