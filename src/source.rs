//! CSV export reading.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use log::info;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Read every row of the CSV export at `path`.
pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let rows = read_csv_from(std::fs::File::open(path)?)?;
    info!("read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Read every row from an in-memory or streamed CSV export.
///
/// Headers are matched exactly, unknown columns are ignored and every cell is
/// trimmed.
pub fn read_csv_from<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// A cell's value if it holds anything but whitespace.
pub fn present(cell: &Option<String>) -> Option<&str> {
    cell.as_deref().map(str::trim).filter(|value| !value.is_empty())
}
