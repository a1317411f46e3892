use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tracing::debug;

use crate::table::StatTable;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Creates `path` (and its parent directories) and writes the byte-order
/// mark spreadsheet tools use to detect UTF-8.
fn bom_writer(path: &Path) -> Result<Writer<BufWriter<File>>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    debug!("Creating file {}", path.display());
    let mut file = BufWriter::new(
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
    );
    file.write_all(UTF8_BOM)?;
    Ok(WriterBuilder::new().has_headers(true).from_writer(file))
}

/// Writes the table with its header row. Returns the number of data rows.
pub fn write_table(path: &Path, table: &StatTable) -> Result<usize> {
    let mut csv = bom_writer(path)?;
    csv.write_record(&table.columns)?;
    for row in &table.rows {
        csv.write_record(row.iter().map(ToString::to_string))?;
    }
    csv.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(table.len())
}

/// Writes serde records; the header comes from the field names, so an
/// empty slice is an error rather than a headerless file.
pub fn write_records<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    if records.is_empty() {
        bail!("No records to write to {}", path.display());
    }
    let mut csv = bom_writer(path)?;
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(records.len())
}
