//! Error types for import runs.
//!
//! Errors are layered by scope. [`ImportError`] aborts a whole run (the
//! workbook cannot be read, the XML cannot be written). [`RowError`] only
//! aborts the mapping of one spreadsheet row: it is logged and the row is
//! dropped while the run carries on. [`ValueError`] describes the field-level
//! problem inside a [`RowError`].

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Field name constants for consistent error reporting.
pub mod fields {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const SUB_TYPE: &str = "sub_type";
    pub const ABSTRACT: &str = "abstract";
    pub const ORGANISATIONS: &str = "organisations";
    pub const ORGANISATIONAL_UNITS: &str = "organisational_units";
    pub const PERSONS: &str = "persons";
    pub const PARTICIPANTS: &str = "participants";
    pub const PUBLICATION_DATE: &str = "publication_date";
    pub const FIELD: &str = "field";
}

/// Top-level error type for a conversion run.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unable to read {}: {reason}", path.display())]
    SourceRead { path: PathBuf, reason: String },

    #[error("Unable to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ImportError {
    /// Create a [`ImportError::SourceRead`] for `path` from any displayable cause.
    pub fn source_read<E: std::fmt::Display>(path: &Path, err: E) -> Self {
        Self::SourceRead {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    }

    /// Create a [`ImportError::Write`] for `path`.
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure to map one spreadsheet row.
///
/// `index` is the 0-based data row position; it is displayed 1-based to match
/// what a user sees when counting rows under the header.
#[derive(Error, Debug)]
#[error("Error in row {}: {error}", index + 1)]
pub struct RowError {
    /// 0-based index of the row within the sheet's data rows
    pub index: usize,
    /// The specific error that occurred
    pub error: ValueError,
}

impl RowError {
    pub fn new(index: usize, error: ValueError) -> Self {
        Self { index, error }
    }
}

/// Specific value-level errors that can occur while mapping a row.
#[derive(Error, Debug)]
pub enum ValueError {
    #[error("Column \"{key}\" not found in sheet")]
    MissingColumn {
        field: &'static str,
        key: &'static str,
    },

    #[error("Column \"{key}\" is empty")]
    MissingValue {
        field: &'static str,
        key: &'static str,
    },

    #[error("Bad value for {key}: \"{value}\" ({reason})")]
    BadValue {
        field: &'static str,
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_error_display_is_one_based() {
        let error = RowError::new(
            4,
            ValueError::MissingColumn {
                field: fields::TITLE,
                key: "Titulo de la Patente",
            },
        );

        assert_eq!(
            error.to_string(),
            "Error in row 5: Column \"Titulo de la Patente\" not found in sheet"
        );
    }

    #[test]
    fn test_value_error_display() {
        let error = ValueError::BadValue {
            field: fields::PERSONS,
            key: "Inventores/Autores",
            value: "Ana Gómez, ".to_string(),
            reason: "empty person name".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Bad value for Inventores/Autores: \"Ana Gómez, \" (empty person name)"
        );
    }

    #[test]
    fn test_source_read_display() {
        let error = ImportError::source_read(Path::new("pruebas.xlsx"), "sheet 'Hoja1' not found");
        let display = error.to_string();
        assert!(display.contains("pruebas.xlsx"));
        assert!(display.contains("Hoja1"));
    }

    #[test]
    fn test_write_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ImportError::write(Path::new("Resultado/out.xml"), io);
        assert!(std::error::Error::source(&error).is_some());
        assert!(error.to_string().starts_with("Unable to write Resultado/out.xml"));
    }
}
