//! Serialises transaction listings for download: delimited text or JSON.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::models::TransactionWithCategory;

pub const CSV_HEADER: [&str; 5] = ["Date", "Description", "Amount", "Type", "Category"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}

/// Write rows as CSV with a fixed header. Dates are day precision.
pub fn write_csv<W: Write>(rows: &[TransactionWithCategory], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)
        .context("Failed to write CSV header")?;
    for row in rows {
        let txn = &row.transaction;
        wtr.write_record([
            txn.date.format("%Y-%m-%d").to_string(),
            txn.description.clone(),
            txn.amount.to_string(),
            txn.kind.as_str().to_string(),
            row.category.name.clone(),
        ])
        .with_context(|| format!("Failed to write transaction {}", txn.id))?;
    }
    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// Write rows as a pretty-printed JSON array, each with a nested category.
pub fn write_json<W: Write>(rows: &[TransactionWithCategory], out: W) -> Result<()> {
    serde_json::to_writer_pretty(out, rows).context("Failed to write JSON export")
}

/// Export rows to a file. Returns the number of rows written.
pub fn export_to_path(
    rows: &[TransactionWithCategory],
    path: &Path,
    format: ExportFormat,
) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create export file: {}", path.display()))?;
    let out = std::io::BufWriter::new(file);
    match format {
        ExportFormat::Csv => write_csv(rows, out)?,
        ExportFormat::Json => write_json(rows, out)?,
    }
    tracing::info!(count = rows.len(), path = %path.display(), ?format, "exported transactions");
    Ok(rows.len())
}

#[cfg(test)]
mod tests;
