//! CSV decoding into datasets.
//!
//! Thin wrapper over the `csv` crate with scalar type inference per cell:
//! integers, floats, booleans, empty-as-null, and text as the fallback.

use crate::core::{Dataset, Scalar};
use crate::error::{IoError, Result};
use std::io::Read;
use std::path::Path;

/// Infers the scalar type of one CSV cell.
fn infer_scalar(cell: &str) -> Scalar {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Scalar::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Scalar::Int(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return Scalar::Float(f);
    }
    match trimmed.to_ascii_lowercase().as_str() {
        "true" => Scalar::Bool(true),
        "false" => Scalar::Bool(false),
        _ => Scalar::Text(trimmed.to_string()),
    }
}

/// Decodes CSV from any reader into a dataset.
///
/// The first record is the header row.
///
/// # Errors
///
/// Returns [`IoError::Csv`] for malformed CSV (including unequal row
/// lengths), tagged with the given source label.
pub fn dataset_from_reader<R: Read>(source: &str, reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns: Vec<String> = csv_reader
        .headers()
        .map_err(|e| IoError::Csv {
            path: source.to_string(),
            reason: e.to_string(),
        })?
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| IoError::Csv {
            path: source.to_string(),
            reason: e.to_string(),
        })?;
        rows.push(record.iter().map(infer_scalar).collect());
    }

    let dataset = Dataset::new(columns, rows)?;
    tracing::info!(
        source,
        rows = dataset.row_count(),
        columns = dataset.column_count(),
        "CSV decoded"
    );
    Ok(dataset)
}

/// Reads a CSV file into a dataset.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing path, or
/// [`IoError::Csv`] for malformed content.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::ReadFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    dataset_from_reader(&path.display().to_string(), file)
}
