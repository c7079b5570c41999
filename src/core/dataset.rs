//! Tabular dataset representation.
//!
//! A dataset is rows by named columns of mixed scalar values. It arrives
//! already parsed (the I/O layer decodes CSV); the core never touches file
//! formats.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell value.
///
/// Supports the scalar types that show up in tabular data. `Null` covers
/// empty cells; everything else is typed at load time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Scalar {
    /// Empty cell.
    Null,

    /// Boolean value.
    Bool(bool),

    /// Integer value (i64).
    Int(i64),

    /// Floating point value (f64).
    Float(f64),

    /// Text value.
    Text(String),
}

impl Scalar {
    /// Returns true for `Null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the numeric value, if this scalar is numeric.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the name of this scalar's type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

/// A tabular dataset: named columns over rows of scalars.
///
/// Row width is validated at construction; every accessor can assume a
/// rectangular shape.
///
/// # Examples
///
/// ```
/// use dexa_rs::core::{Dataset, Scalar};
///
/// let ds = Dataset::new(
///     vec!["name".to_string(), "age".to_string()],
///     vec![
///         vec![Scalar::Text("ada".to_string()), Scalar::Int(36)],
///         vec![Scalar::Text("grace".to_string()), Scalar::Int(45)],
///     ],
/// ).unwrap();
/// assert_eq!(ds.row_count(), 2);
/// assert_eq!(ds.column_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column names, in order.
    columns: Vec<String>,

    /// Row-major cell data.
    rows: Vec<Vec<Scalar>>,
}

impl Dataset {
    /// Creates a dataset from column names and row-major data.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if any row's width differs from the
    /// number of columns.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Scalar>>) -> Result<Self> {
        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(Error::Config {
                    message: format!(
                        "row {i} has {} cells, expected {}",
                        row.len(),
                        columns.len()
                    ),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    /// Creates an empty dataset with the given columns.
    #[must_use]
    pub const fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Returns the column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Scalar>] {
        &self.rows
    }

    /// Returns the position of a column by name.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns all values of one column, in row order.
    #[must_use]
    pub fn column_values(&self, name: &str) -> Option<Vec<&Scalar>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Returns the numeric values of one column, skipping non-numeric cells.
    ///
    /// Returns `None` if the column does not exist.
    #[must_use]
    pub fn numeric_column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row[idx].as_f64())
                .collect(),
        )
    }

    /// Infers a display type for a column from its first non-null cell.
    #[must_use]
    pub fn column_type(&self, name: &str) -> Option<&'static str> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| &row[idx])
                .find(|s| !s.is_null())
                .map_or("null", Scalar::type_name),
        )
    }

    /// Returns a one-line shape summary for prompts and status output.
    #[must_use]
    pub fn shape_summary(&self) -> String {
        format!(
            "{} rows x {} columns ({})",
            self.row_count(),
            self.column_count(),
            self.columns.join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec![
                vec![Scalar::Int(1), Scalar::Float(1.5), Scalar::Text("x".into())],
                vec![Scalar::Int(2), Scalar::Null, Scalar::Text("y".into())],
                vec![Scalar::Int(3), Scalar::Float(2.5), Scalar::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_dataset_shape() {
        let ds = sample();
        assert_eq!(ds.row_count(), 3);
        assert_eq!(ds.column_count(), 3);
        assert_eq!(ds.columns(), &["a", "b", "c"]);
    }

    #[test]
    fn test_dataset_ragged_rows_rejected() {
        let result = Dataset::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![Scalar::Int(1)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_dataset_empty() {
        let ds = Dataset::empty(vec!["a".to_string()]);
        assert_eq!(ds.row_count(), 0);
        assert_eq!(ds.column_count(), 1);
    }

    #[test]
    fn test_column_index_and_values() {
        let ds = sample();
        assert_eq!(ds.column_index("b"), Some(1));
        assert_eq!(ds.column_index("missing"), None);

        let values = ds.column_values("a").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(*values[0], Scalar::Int(1));
    }

    #[test]
    fn test_numeric_column_skips_non_numeric() {
        let ds = sample();
        let nums = ds.numeric_column("b").unwrap();
        assert_eq!(nums, vec![1.5, 2.5]);

        assert!(ds.numeric_column("missing").is_none());
    }

    #[test]
    fn test_column_type_inference() {
        let ds = sample();
        assert_eq!(ds.column_type("a"), Some("int"));
        assert_eq!(ds.column_type("b"), Some("float"));
        assert_eq!(ds.column_type("c"), Some("text"));
    }

    #[test]
    fn test_scalar_as_f64() {
        assert_eq!(Scalar::Int(2).as_f64(), Some(2.0));
        assert_eq!(Scalar::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(Scalar::Text("x".into()).as_f64(), None);
        assert_eq!(Scalar::Null.as_f64(), None);
    }

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Int(7).to_string(), "7");
        assert_eq!(Scalar::Text("hi".into()).to_string(), "hi");
        assert_eq!(Scalar::Null.to_string(), "");
        assert_eq!(Scalar::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_shape_summary() {
        let ds = sample();
        let summary = ds.shape_summary();
        assert!(summary.contains("3 rows"));
        assert!(summary.contains("a, b, c"));
    }

    #[test]
    fn test_dataset_serialization() {
        let ds = sample();
        let json = serde_json::to_string(&ds).unwrap();
        let back: Dataset = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ds);
    }
}
