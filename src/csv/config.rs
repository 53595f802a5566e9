//! CSV dialect configuration.

/// Dialect options for reading a CSV export of a sheet.
///
/// The first record is always the header row.
///
/// # Examples
///
/// ```
/// use pureimport::csv::CsvConfig;
///
/// let mut config = CsvConfig::new();
/// config.set_delimiter(b';').set_trim(false);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvConfig {
    /// Delimiter to use for parsing the CSV
    pub(crate) delimiter: u8,
    /// Quote character
    pub(crate) quote: u8,
    /// Whether to trim whitespace around fields (headers are never trimmed)
    pub(crate) trim: bool,
    /// Accept records with a different number of fields than the header
    pub(crate) flexible: bool,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvConfig {
    /// Creates a new CSV configuration with default settings
    #[must_use]
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            trim: true,
            flexible: true,
        }
    }

    /// Sets the delimiter character
    pub fn set_delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote character
    pub fn set_quote(&mut self, quote: u8) -> &mut Self {
        self.quote = quote;
        self
    }

    /// Sets whether to trim whitespace from fields
    pub fn set_trim(&mut self, trim: bool) -> &mut Self {
        self.trim = trim;
        self
    }

    /// Sets whether records may have fewer or more fields than the header
    pub fn set_flexible(&mut self, flexible: bool) -> &mut Self {
        self.flexible = flexible;
        self
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.delimiter == self.quote {
            return Err("Delimiter and quote character cannot be the same".to_string());
        }

        if matches!(self.delimiter, b'\n' | b'\r') {
            return Err("Delimiter cannot be a line break".to_string());
        }

        if !self.delimiter.is_ascii() || !self.quote.is_ascii() {
            return Err("Delimiter and quote must be ASCII characters".to_string());
        }

        Ok(())
    }
}
