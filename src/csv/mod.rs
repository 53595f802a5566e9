//! CSV row source.
//!
//! Reads a CSV export of a sheet. The header row provides the column names,
//! exactly as written (trailing spaces included), so the same rule tables
//! work for workbooks and their CSV exports.
//!
//! # Example
//!
//! ```
//! use pureimport::csv::CsvSource;
//! use pureimport::RowSource;
//!
//! let mut source = CsvSource::from_text("titulo;pais\nVálvula;CO").with_auto_detection();
//! let rows = source.read_rows().unwrap();
//! assert_eq!(rows[0].text("pais", "country").unwrap().as_deref(), Some("CO"));
//! ```

mod config;
mod parse;

use crate::{ImportError, RawRow, RowSource};
pub use config::CsvConfig;
pub use parse::detect_csv_delimiter;
use parse::csv_rows;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
enum Input {
    File(PathBuf),
    Text(String),
}

/// Row source over a CSV file (or in-memory CSV text).
#[derive(Debug, Clone)]
pub struct CsvSource {
    input: Input,
    config: CsvConfig,
    auto_detect: bool,
}

impl CsvSource {
    /// Creates a source reading `path` with the default configuration
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            input: Input::File(path.into()),
            config: CsvConfig::new(),
            auto_detect: false,
        }
    }

    /// Creates a source over CSV text
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            input: Input::Text(text.into()),
            config: CsvConfig::new(),
            auto_detect: false,
        }
    }

    /// Uses a custom dialect configuration
    #[must_use]
    pub fn with_config(mut self, config: CsvConfig) -> Self {
        self.config = config;
        self
    }

    /// Detects the delimiter from the content before reading
    #[must_use]
    pub fn with_auto_detection(mut self) -> Self {
        self.auto_detect = true;
        self
    }

    /// Gets a reference to the current configuration
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    fn path(&self) -> &Path {
        match &self.input {
            Input::File(path) => path,
            Input::Text(_) => Path::new("<memory>"),
        }
    }

    fn effective_config(&self, text: &str) -> CsvConfig {
        let mut config = self.config.clone();
        if self.auto_detect {
            let delimiter = detect_csv_delimiter(text);
            debug!("Detected CSV delimiter {:?}", delimiter as char);
            config.set_delimiter(delimiter);
        }
        config
    }
}

impl RowSource for CsvSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, ImportError> {
        let text = match &self.input {
            Input::File(path) => {
                std::fs::read_to_string(path).map_err(|e| ImportError::source_read(path, e))?
            }
            Input::Text(text) => text.clone(),
        };

        let config = self.effective_config(&text);
        csv_rows(&text, &config).map_err(|msg| ImportError::source_read(self.path(), msg))
    }
}
