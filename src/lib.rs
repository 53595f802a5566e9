//! Convert research-output spreadsheets into Pure XML import files.
//!
//! `pureimport` reads patent and project records from an Excel workbook (or a
//! CSV export of one), maps each row onto one of several Pure/CERIF-style XML
//! vocabularies and writes a single, date-stamped XML file per run.
//!
//! # Features
//!
//! - `xlsx` - Read workbooks through calamine (enabled by default)
//! - `csv` - Read CSV exports (enabled by default)
//! - `whatlang` - Language detection for titles and abstracts (enabled by default)
//! - `regex` / `lite` - Choose the regex backend
//!
//! # Pipeline
//!
//! A run is a single pass over the sheet:
//!
//! 1. A [`RowSource`] yields [`RawRow`]s in sheet order.
//! 2. The [`dedupe::Deduplicator`] keeps the first row per title (or groups
//!    rows sharing a project id) and applies the asset-type allow-list.
//! 3. The [`mapping::RecordMapper`] applies the variant's [`mapping::RuleSet`]
//!    to build one [`OutputRecord`] per kept row.
//! 4. [`xml::layout::build`] lays the [`Document`] out for the
//!    [`SchemaVariant`] and [`xml::write_document`] serializes it.
//!
//! # Basic Usage
//!
//! ```rust
//! use pureimport::language::NoDetection;
//! use pureimport::pipeline::Converter;
//! use pureimport::{CellValue, RawRow, SchemaVariant};
//!
//! let patent = |index: usize, title: &str| {
//!     RawRow::from_pairs(index, [
//!         ("No.", CellValue::from(index as i64 + 1)),
//!         ("Titulo de la Patente", CellValue::from(title)),
//!         ("Tipo de Activo De PI", CellValue::from("Patente - Invención")),
//!         ("Descripcion", CellValue::Empty),
//!         ("Jurisdiccion", CellValue::from("Colombia")),
//!         ("Numero de Solicitud ", CellValue::from("NC2019/0001")),
//!     ])
//! };
//! let rows = vec![patent(0, "Dispositivo A"), patent(1, "Dispositivo A")];
//!
//! let detector = NoDetection;
//! let converter = Converter::new(SchemaVariant::Patentes.rules(), &detector);
//! let document = converter.convert(rows);
//! assert_eq!(document.len(), 1);
//! ```
//!
//! # Error Handling
//!
//! Errors reading the input or writing the output abort the run with an
//! [`ImportError`]. Errors mapping a single row are logged through `tracing`
//! and the row is skipped; see [`error`] for the layering.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[cfg(feature = "csv")]
extern crate csv as csv_crate;

pub mod config;
#[cfg(feature = "csv")]
pub mod csv;
pub mod dedupe;
pub mod error;
pub mod language;
pub mod mapping;
pub mod pipeline;
#[cfg(feature = "xlsx")]
pub mod xlsx;
pub mod xml;

// Reexports
#[cfg(feature = "csv")]
pub use csv::CsvSource;
pub use error::{ImportError, RowError, ValueError};
pub use language::{LanguageCode, LanguageDetector};
#[cfg(feature = "xlsx")]
pub use xlsx::XlsxSource;

mod regex;
mod utils;

/// Title used when a row has no title at all.
pub const UNTITLED: &str = "Sin título";

/// Output XML vocabularies supported by the converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaVariant {
    /// Plain `<patentes>` document without namespaces.
    Patentes,
    /// Pure publication import, Bogotá campus sheet.
    PublicationsBogota,
    /// Pure publication import, Cali campus sheet.
    PublicationsCali,
    /// Pure publication import with detected abstract language and workflow flags.
    PublicationsApproved,
    /// Pure publication import validated against the staging XSD.
    PublicationsStaging,
    /// Pure `upmproject` import, one project per `id_unico`.
    UpmProjects,
    /// Pure `piproject` import, one project per `id_unico`.
    PiProjects,
}

impl SchemaVariant {
    pub const ALL: [SchemaVariant; 7] = [
        SchemaVariant::Patentes,
        SchemaVariant::PublicationsBogota,
        SchemaVariant::PublicationsCali,
        SchemaVariant::PublicationsApproved,
        SchemaVariant::PublicationsStaging,
        SchemaVariant::UpmProjects,
        SchemaVariant::PiProjects,
    ];

    /// Kebab-case name used in configuration files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::Patentes => "patentes",
            SchemaVariant::PublicationsBogota => "publications-bogota",
            SchemaVariant::PublicationsCali => "publications-cali",
            SchemaVariant::PublicationsApproved => "publications-approved",
            SchemaVariant::PublicationsStaging => "publications-staging",
            SchemaVariant::UpmProjects => "upmprojects",
            SchemaVariant::PiProjects => "piprojects",
        }
    }

    /// The rule table driving the mapping of this variant.
    pub fn rules(&self) -> &'static mapping::RuleSet {
        mapping::variants::rule_set(*self)
    }

    /// Suffix appended to the date stamp of the output file name.
    pub fn default_suffix(&self) -> &'static str {
        match self {
            SchemaVariant::UpmProjects => "Bogota_SIAP",
            SchemaVariant::PiProjects => "piprojects",
            _ => "patentes",
        }
    }

    /// Directory the output file is written to when none is configured.
    pub fn default_output_dir(&self) -> &'static str {
        match self {
            SchemaVariant::PublicationsCali => "Resultado Cali",
            _ => "Resultado",
        }
    }
}

impl std::fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SchemaVariant {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        SchemaVariant::ALL
            .into_iter()
            .find(|variant| variant.as_str() == wanted)
            .ok_or_else(|| {
                ImportError::Config(format!(
                    "unknown schema variant '{}' (expected one of: {})",
                    s,
                    SchemaVariant::ALL.map(|v| v.as_str()).join(", ")
                ))
            })
    }
}

/// A single spreadsheet cell.
///
/// `Empty` marks an absent value and is distinct from `String("")`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Whether the cell holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the cell as text, or `None` for an empty cell.
    ///
    /// Integral floats render without a fraction and datetimes render as
    /// `YYYY-MM-DD HH:MM:SS`, so dates can be decomposed with [`DateParts::parse`].
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::String(s) => Some(s.clone()),
            CellValue::Int(i) => Some(i.to_string()),
            CellValue::Float(f) => Some(utils::format_float(*f)),
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::DateTime(dt) => Some(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::String(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

/// One spreadsheet row: column name to cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawRow {
    index: usize,
    cells: HashMap<String, CellValue>,
}

impl RawRow {
    /// Create an empty row at the given 0-based data row index.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            cells: HashMap::new(),
        }
    }

    /// Build a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(index: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let cells = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { index, cells }
    }

    /// Set the value of a column.
    pub fn insert(&mut self, column: impl Into<String>, value: CellValue) {
        self.cells.insert(column.into(), value);
    }

    /// 0-based position of the row among the sheet's data rows.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Whether every cell of the row is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(CellValue::is_empty)
    }

    /// Look up a column, failing when the sheet does not have it.
    pub fn cell(&self, key: &'static str, field: &'static str) -> Result<&CellValue, ValueError> {
        self.cells
            .get(key)
            .ok_or(ValueError::MissingColumn { field, key })
    }

    /// Look up a column as text; `Ok(None)` when the cell is empty.
    pub fn text(&self, key: &'static str, field: &'static str) -> Result<Option<String>, ValueError> {
        self.cell(key, field).map(CellValue::to_text)
    }
}

/// First and last name derived from a free-text full name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonName {
    pub first_name: String,
    /// Empty when the full name is a single word.
    pub last_name: String,
}

impl PersonName {
    /// Split a full name with the word-count heuristic.
    ///
    /// One word is a first name only, two words are first and last name, and
    /// with more words the last two are the last name. Returns `None` for a
    /// blank name.
    ///
    /// ```
    /// use pureimport::PersonName;
    ///
    /// let name = PersonName::from_full_name("Juan Carlos Pérez Gómez").unwrap();
    /// assert_eq!(name.first_name, "Juan Carlos");
    /// assert_eq!(name.last_name, "Pérez Gómez");
    /// ```
    pub fn from_full_name(full_name: &str) -> Option<Self> {
        utils::split_full_name(full_name).map(|(first_name, last_name)| Self {
            first_name,
            last_name,
        })
    }
}

/// A calendar date decomposed into its textual components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateParts {
    pub year: String,
    pub month: String,
    pub day: String,
}

impl DateParts {
    /// Decompose a `YYYY-MM-DD[ HH:MM:SS]` string.
    ///
    /// The components are kept verbatim. Anything that does not split into
    /// exactly three dash-separated parts yields `None`.
    ///
    /// ```
    /// use pureimport::DateParts;
    ///
    /// let date = DateParts::parse("2024-08-26 00:00:00").unwrap();
    /// assert_eq!((date.year.as_str(), date.month.as_str(), date.day.as_str()), ("2024", "08", "26"));
    /// assert!(DateParts::parse("2024/08/26").is_none());
    /// ```
    pub fn parse(value: &str) -> Option<Self> {
        utils::split_iso_date(value).map(|(year, month, day)| Self { year, month, day })
    }

    /// Parse a date written day-first (`26/08/2024`, `26-08-2024`) or in ISO
    /// form, zero-padding month and day.
    pub fn parse_day_first(value: &str) -> Option<Self> {
        utils::parse_day_first_date(value).map(|date| Self {
            year: date.format("%Y").to_string(),
            month: date.format("%m").to_string(),
            day: date.format("%d").to_string(),
        })
    }
}

/// A text value with optional language and country attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalizedText {
    pub text: String,
    pub language: Option<LanguageCode>,
    pub country: Option<String>,
}

impl LocalizedText {
    /// Text without language information.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// `lang_COUNTRY` locale tag, or just the language when no country is known.
    pub fn locale(&self) -> Option<String> {
        let language = self.language.as_ref()?;
        Some(match &self.country {
            Some(country) => format!("{}_{}", language, country),
            None => language.to_string(),
        })
    }
}

/// A person attached to a record (inventor, author, investigator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub role: Option<String>,
    pub name: PersonName,
}

/// An internal project participant referenced by employee id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub person_id: String,
    pub role: Option<String>,
}

/// Single-valued free-text fields of an [`OutputRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Field {
    PatentNumber,
    ApplicationNumber,
    PriorityDate,
    Jurisdiction,
    Ipc,
    ProcedureStatus,
    ResearchGroup,
    Link,
    StartDate,
    EndDate,
    ManagingOrganisation,
    FundingOrganisation,
    ExternalOrganisation,
}

/// Schema-agnostic result of mapping one spreadsheet row (or row group).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputRecord {
    /// Record identifier (patent number column or project id)
    pub id: Option<String>,
    /// Record sub-type, e.g. the asset type of a patent
    pub sub_type: Option<String>,
    /// Title of the record
    pub title: LocalizedText,
    /// Abstract or description
    pub abstract_text: Option<LocalizedText>,
    /// Locale tag of the record as a whole, e.g. `es_CO`
    pub language: Option<String>,
    /// Owning organisations
    pub organisations: Vec<String>,
    /// Organisational units (faculties, departments, research groups)
    pub organisational_units: Vec<String>,
    /// Inventors, authors and investigators
    pub persons: Vec<Person>,
    /// Internal participants referenced by id
    pub participants: Vec<Participant>,
    /// Filing or publication date
    pub publication_date: Option<DateParts>,
    /// Additional single-valued fields
    pub fields: BTreeMap<Field, String>,
}

impl OutputRecord {
    /// Create a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an auxiliary field.
    pub fn field(&self, field: Field) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }
}

/// The ordered set of records produced by one run, tagged with its variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub variant: SchemaVariant,
    pub records: Vec<OutputRecord>,
}

impl Document {
    pub fn new(variant: SchemaVariant) -> Self {
        Self {
            variant,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: OutputRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Trait for producing the rows of one sheet.
pub trait RowSource {
    /// Read every data row of the sheet, in sheet order.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::SourceRead`] if the file or sheet cannot be read.
    fn read_rows(&mut self) -> Result<Vec<RawRow>, ImportError>;
}

/// In-memory rows, handed out once.
impl RowSource for Vec<RawRow> {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, ImportError> {
        Ok(std::mem::take(self))
    }
}
