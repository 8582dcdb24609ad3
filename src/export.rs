//! Tabular export of labeling results.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    /// Input filename (without directory).
    pub filename: String,
    /// Comma-separated label string or a sentinel.
    pub labels: String,
}

/// Errors that can occur while writing the output table.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Write the accumulated rows as a two-column CSV table.
///
/// The header row is always written, so an empty run still produces a
/// well-formed table.
pub fn write_table(path: &Path, rows: &[LabelRecord]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["PDF File", "Labels"])?;
    for row in rows {
        writer.write_record([&row.filename, &row.labels])?;
    }
    writer.flush()?;
    Ok(())
}
