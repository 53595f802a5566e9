//! Declarative field rules.
//!
//! A [`RuleSet`] describes everything that differs between schema variants on
//! the reading side: which columns hold what, how they are split and
//! normalized, and how languages and countries are inferred. The mapper
//! interprets the rules in order; the rules themselves hold no logic beyond
//! [`Normalize::apply`].

use crate::language::CountryTable;
use crate::{Field, SchemaVariant, utils};

/// What to do with a row whose key was already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupMode {
    /// Drop later rows; the first one wins.
    FirstWins,
    /// Attach later rows to the first one (one row per project participant).
    Group,
}

/// Column providing the dedup key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRule {
    pub column: &'static str,
    /// Key used when the cell is empty. Grouping rules reject empty keys instead.
    pub sentinel: &'static str,
    pub mode: DedupMode,
}

/// Allow-list on an asset-type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeFilter {
    pub column: &'static str,
    pub allowed: &'static [&'static str],
}

impl TypeFilter {
    pub fn accepts(&self, value: &str) -> bool {
        self.allowed.contains(&value)
    }
}

/// Where the country of a fixed-language text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountrySource {
    Fixed(&'static str),
    /// Upper-cased cell value, `default` when the cell is empty
    Column {
        column: &'static str,
        default: &'static str,
    },
}

/// How the language attributes of a text are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePolicy {
    /// No language attributes.
    Plain,
    /// Detect the language; fall back to the base language for blank text or
    /// a language outside `allowed`.
    Detect {
        allowed: Option<&'static [&'static str]>,
        countries: CountryTable,
    },
    /// Always the same language.
    Fixed {
        language: &'static str,
        country: CountrySource,
    },
}

/// Text normalization applied to a cell before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Normalize {
    Verbatim,
    Trim,
    /// Line breaks become spaces, then trim.
    Newlines,
    /// Keep the text before the first space (drops a time of day).
    DatePrefix,
    /// Remove a literal ` 00:00:00` suffix.
    StripMidnight,
    RemoveSpaces,
    /// Replace the trimmed value through a table; values not in the table are dropped.
    Lookup(&'static [(&'static str, &'static str)]),
}

impl Normalize {
    /// Apply the normalization; `None` when a lookup has no entry.
    pub fn apply(&self, value: &str) -> Option<String> {
        match self {
            Normalize::Verbatim => Some(value.to_string()),
            Normalize::Trim => Some(value.trim().to_string()),
            Normalize::Newlines => Some(utils::collapse_newlines(value)),
            Normalize::DatePrefix => Some(utils::date_prefix(value).to_string()),
            Normalize::StripMidnight => Some(value.replace(" 00:00:00", "")),
            Normalize::RemoveSpaces => Some(value.replace(' ', "")),
            Normalize::Lookup(table) => table
                .iter()
                .find(|(from, _)| *from == value.trim())
                .map(|(_, to)| to.to_string()),
        }
    }
}

/// How a date cell is decomposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `YYYY-MM-DD[ HH:MM:SS]`, components kept verbatim
    Iso,
    /// Day-first or ISO dates, zero-padded
    DayFirst,
}

/// Which list an organisation rule fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgTarget {
    Organisations,
    Units,
}

/// One field-level transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Id {
        column: &'static str,
        default: Option<&'static str>,
    },
    Title {
        column: &'static str,
        language: LanguagePolicy,
    },
    /// Sub-type from a column, or the default when the column is `None` or empty.
    SubType {
        column: Option<&'static str>,
        default: &'static str,
    },
    /// Abstract or description. Blank values are treated as missing; the
    /// default text, when given, takes the base language without detection.
    Abstract {
        column: &'static str,
        language: LanguagePolicy,
        normalize: Normalize,
        default: Option<&'static str>,
    },
    /// Delimiter-joined organisation names; `None` keeps the cell as one name.
    Organisations {
        column: &'static str,
        delimiter: Option<&'static str>,
        target: OrgTarget,
    },
    /// Comma-joined full names.
    Persons {
        column: &'static str,
        role: Option<&'static str>,
    },
    /// Comma-joined first names zipped with comma-joined last names.
    PairedPersons {
        first_names: &'static str,
        last_names: &'static str,
        role: Option<&'static str>,
    },
    /// One participant per row of a group.
    Participants {
        id_column: &'static str,
        role_column: &'static str,
    },
    PublicationDate {
        column: &'static str,
        style: DateStyle,
    },
    /// Copy a cell into an auxiliary field.
    Text {
        column: &'static str,
        field: Field,
        normalize: Normalize,
        default: Option<&'static str>,
    },
}

/// How cells holding only blank text are read.
///
/// Empty cells are always absent. Some sheets also use a blank string for
/// "no value"; others emit the element with empty text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankCells {
    /// Blank text counts as absent.
    Missing,
    /// Blank text is a value like any other.
    Kept,
}

impl BlankCells {
    /// Whether `text` should be treated as a value.
    pub fn is_value(self, text: &str) -> bool {
        match self {
            BlankCells::Missing => !text.trim().is_empty(),
            BlankCells::Kept => true,
        }
    }
}

/// The complete rule table of one schema variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSet {
    pub variant: SchemaVariant,
    pub key: KeyRule,
    pub type_filter: Option<TypeFilter>,
    /// Language assumed for blank text or failed detection
    pub base_language: &'static str,
    /// Locale tag of every record, e.g. `es_CO`
    pub locale: Option<&'static str>,
    /// Reading of blank text in abstract and free-text cells
    pub blank_cells: BlankCells,
    pub rules: &'static [FieldRule],
}
