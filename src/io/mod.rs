//! File input for the CLI layer.
//!
//! The core receives parsed data; this module is the collaborator that
//! does the reading. Plain text for documents, CSV for datasets.

pub mod tabular;

pub use tabular::{dataset_from_reader, read_csv};

use crate::error::{IoError, Result};
use std::path::Path;

/// Reads a file to a string with typed errors.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] for a missing path, or
/// [`IoError::ReadFailed`] for any other read failure.
pub fn read_text_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    std::fs::read_to_string(path).map_err(|e| {
        IoError::ReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()
    })
}

/// Checks whether a path looks like a CSV file.
#[must_use]
pub fn is_csv_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello").unwrap();

        assert_eq!(read_text_file(&path).unwrap(), "hello");
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_text_file(Path::new("/nonexistent/file.txt")).unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Io(IoError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_is_csv_path() {
        assert!(is_csv_path(Path::new("data.csv")));
        assert!(is_csv_path(Path::new("DATA.CSV")));
        assert!(!is_csv_path(Path::new("data.txt")));
        assert!(!is_csv_path(Path::new("data")));
    }
}
