//! Configuration loading.
//!
//! Reads `pureimport.toml` from the current directory, or the file named by
//! the `PUREIMPORT_CONFIG` environment variable. Every key is optional; a
//! missing default file means "all defaults", while a missing file named by
//! the environment variable is an error.

use crate::{ImportError, SchemaVariant};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema variant name, e.g. `publications-bogota`
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Append-only run log
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

fn default_variant() -> String { SchemaVariant::PublicationsBogota.as_str().to_string() }
fn default_log_file() -> PathBuf { PathBuf::from("xml_conversion.log") }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
    /// Sheet name (workbooks only)
    #[serde(default = "default_sheet")]
    pub sheet: String,
    #[serde(default)]
    pub format: InputFormat,
}

fn default_input_path() -> PathBuf { PathBuf::from("pruebas.xlsx") }
fn default_sheet() -> String { "Hoja1".to_string() }

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
            sheet: default_sheet(),
            format: InputFormat::default(),
        }
    }
}

/// Kind of input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// Decide by file extension.
    #[default]
    Auto,
    Xlsx,
    Csv,
}

impl InputFormat {
    /// Resolve [`InputFormat::Auto`] by the extension of `path`.
    pub fn resolve(self, path: &Path) -> InputFormat {
        match self {
            InputFormat::Auto => {
                let is_csv = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
                if is_csv { InputFormat::Csv } else { InputFormat::Xlsx }
            }
            other => other,
        }
    }
}

/// Output location; unset values fall back to the variant's defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
    pub suffix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            input: InputConfig::default(),
            output: OutputConfig::default(),
            log_file: default_log_file(),
        }
    }
}

impl Config {
    pub const DEFAULT_PATH: &'static str = "pureimport.toml";
    pub const ENV_VAR: &'static str = "PUREIMPORT_CONFIG";

    /// Load configuration.
    /// Checks PUREIMPORT_CONFIG env var first, then current directory.
    pub fn load() -> Result<Self, ImportError> {
        match std::env::var(Self::ENV_VAR) {
            Ok(path) => Self::load_from(Path::new(&path)),
            Err(_) if Path::new(Self::DEFAULT_PATH).exists() => {
                Self::load_from(Path::new(Self::DEFAULT_PATH))
            }
            Err(_) => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ImportError> {
        if !path.exists() {
            return Err(ImportError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ImportError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ImportError> {
        toml::from_str(content).map_err(|e| ImportError::Config(e.to_string()))
    }

    /// The configured schema variant.
    pub fn schema_variant(&self) -> Result<SchemaVariant, ImportError> {
        self.variant.parse()
    }

    pub fn output_dir(&self, variant: SchemaVariant) -> PathBuf {
        self.output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(variant.default_output_dir()))
    }

    pub fn output_suffix(&self, variant: SchemaVariant) -> String {
        self.output
            .suffix
            .clone()
            .unwrap_or_else(|| variant.default_suffix().to_string())
    }
}
