//! XML output.
//!
//! The pipeline builds an [`Element`] tree for the active
//! [`SchemaVariant`](crate::SchemaVariant) with [`layout::build`], indents it
//! and serializes it with [`write_document`]. Nothing in this module knows
//! how records were read; it only lays out [`OutputRecord`](crate::OutputRecord)s.

pub mod layout;
mod tree;
mod write;

pub use tree::Element;
pub use write::{to_bytes, to_string};

use crate::ImportError;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

/// `<dir>/<YYYY_MM_DD>_<suffix>.xml`
///
/// ```
/// use chrono::NaiveDate;
/// use pureimport::xml::output_path;
/// use std::path::Path;
///
/// let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
/// let path = output_path(Path::new("Resultado"), "patentes", date);
/// assert_eq!(path, Path::new("Resultado/2024_08_01_patentes.xml"));
/// ```
pub fn output_path(dir: &Path, suffix: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}_{}.xml", date.format("%Y_%m_%d"), suffix))
}

/// Write an (already indented) tree to `path`, creating missing parent
/// directories. An existing file is overwritten.
///
/// # Errors
///
/// Returns [`ImportError::Write`] if the directory or the file cannot be
/// written.
pub fn write_document(root: &Element, path: &Path) -> Result<(), ImportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ImportError::write(parent, e))?;
    }

    let bytes = to_bytes(root).map_err(|e| ImportError::write(path, e))?;
    fs::write(path, bytes).map_err(|e| ImportError::write(path, e))
}
