//! CSV export of the current view.
//!
//! The header row is always written, followed by one row per record in the
//! order given. Fields containing the delimiter, quotes or line breaks are
//! quoted with embedded quotes doubled.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::civil::Date;

use crate::entity::{Column, EntityKind};
use crate::error::{AdminError, Result};
use crate::types::Record;
use crate::utils::{ensure_parent_dir, format_relative_path};

/// Serialise records through a column projection.
pub fn export_csv(records: &[&Record], columns: &[Column]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(columns.iter().map(|c| c.header.as_str()))?;
    for record in records {
        writer.write_record(columns.iter().map(|c| c.value(record)))?;
    }

    writer
        .into_inner()
        .map_err(|e| AdminError::Io(e.into_error()))
}

/// Download name: `<entity>_export_<YYYY-MM-DD>.csv`.
pub fn export_filename(kind: EntityKind, date: Date) -> String {
    format!("{kind}_export_{date}.csv")
}

/// A written export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub path: PathBuf,
    pub rows: usize,
}

/// Write the export for `records` to `path`, creating parent directories.
pub fn write_export(path: &Path, records: &[&Record], columns: &[Column]) -> Result<ExportFile> {
    let bytes = export_csv(records, columns)?;
    ensure_parent_dir(path)?;
    fs::write(path, bytes).map_err(|e| {
        AdminError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write export at {}: {}", format_relative_path(path), e),
        ))
    })?;
    tracing::info!("exported {} rows to {}", records.len(), path.display());
    Ok(ExportFile {
        path: path.to_path_buf(),
        rows: records.len(),
    })
}
