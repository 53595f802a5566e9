//! Duplicate suppression and asset-type filtering.
//!
//! The deduplicator is a fold over the rows of one sheet. The only state it
//! carries is a [`DedupState`] value, created per run and threaded through
//! every step, so two runs never share a seen-set.
//!
//! # Example
//!
//! ```
//! use pureimport::dedupe::Deduplicator;
//! use pureimport::RawRow;
//!
//! let rows = vec![
//!     RawRow::from_pairs(0, [("titulo", "Válvula")]),
//!     RawRow::from_pairs(1, [("titulo", "Válvula ")]),
//!     RawRow::from_pairs(2, [("titulo", "Sensor")]),
//! ];
//!
//! let kept = Deduplicator::new("titulo").filter(rows).into_kept();
//! let indexes: Vec<usize> = kept.iter().map(|k| k.index()).collect();
//! assert_eq!(indexes, vec![0, 2]);
//! ```

use crate::error::{RowError, ValueError, fields};
use crate::mapping::{DedupMode, RuleSet, TypeFilter};
use crate::{RawRow, UNTITLED};
use std::collections::HashMap;
use tracing::{debug, info};

/// A row that survived deduplication, together with the later rows sharing
/// its key when grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct KeptRow {
    row: RawRow,
    siblings: Vec<RawRow>,
}

impl KeptRow {
    pub fn new(row: RawRow) -> Self {
        Self {
            row,
            siblings: Vec::new(),
        }
    }

    /// Sheet index of the first row of the group.
    pub fn index(&self) -> usize {
        self.row.index()
    }

    /// The first row carrying the key.
    pub fn row(&self) -> &RawRow {
        &self.row
    }

    /// Later rows with the same key (always empty outside grouping mode).
    pub fn siblings(&self) -> &[RawRow] {
        &self.siblings
    }

    /// The first row followed by its siblings.
    pub fn rows(&self) -> impl Iterator<Item = &RawRow> {
        std::iter::once(&self.row).chain(self.siblings.iter())
    }
}

/// Accumulated result of folding rows through a [`Deduplicator`].
#[derive(Debug, Default)]
pub struct DedupState {
    /// key -> position in `kept`
    seen: HashMap<String, usize>,
    kept: Vec<KeptRow>,
    errors: Vec<RowError>,
    skipped: usize,
}

impl DedupState {
    /// Whether `key` has been seen.
    pub fn contains(&self, key: &str) -> bool {
        self.seen.contains_key(key)
    }

    /// Rows kept so far, in sheet order.
    pub fn kept(&self) -> &[KeptRow] {
        &self.kept
    }

    /// Rows whose key could not be read.
    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    /// Number of rows dropped by the type filter or as duplicates.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn into_kept(self) -> Vec<KeptRow> {
        self.kept
    }

    pub fn into_parts(self) -> (Vec<KeptRow>, Vec<RowError>) {
        (self.kept, self.errors)
    }
}

/// Keeps the first row per key and applies an optional type allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deduplicator {
    key_column: &'static str,
    sentinel: &'static str,
    mode: DedupMode,
    type_filter: Option<TypeFilter>,
}

impl Deduplicator {
    /// First-wins deduplication on `key_column`, with the untitled sentinel.
    pub fn new(key_column: &'static str) -> Self {
        Self {
            key_column,
            sentinel: UNTITLED,
            mode: DedupMode::FirstWins,
            type_filter: None,
        }
    }

    /// Deduplicator described by a variant's rule set.
    pub fn from_rules(rules: &RuleSet) -> Self {
        Self {
            key_column: rules.key.column,
            sentinel: rules.key.sentinel,
            mode: rules.key.mode,
            type_filter: rules.type_filter,
        }
    }

    pub fn with_mode(mut self, mode: DedupMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_sentinel(mut self, sentinel: &'static str) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_type_filter(mut self, filter: TypeFilter) -> Self {
        self.type_filter = Some(filter);
        self
    }

    /// The dedup key of a row: its trimmed key cell, or the sentinel.
    ///
    /// In [`DedupMode::Group`] an empty key cell is an error; grouping
    /// unrelated rows under the sentinel would merge them.
    pub fn key_for(&self, row: &RawRow) -> Result<String, ValueError> {
        let key = row
            .text(self.key_column, fields::TITLE)?
            .map(|value| value.trim().to_string());

        match (key, self.mode) {
            (Some(key), DedupMode::FirstWins) => Ok(key),
            (Some(key), DedupMode::Group) if !key.is_empty() => Ok(key),
            (_, DedupMode::Group) => Err(ValueError::MissingValue {
                field: fields::ID,
                key: self.key_column,
            }),
            (None, DedupMode::FirstWins) => Ok(self.sentinel.to_string()),
        }
    }

    /// Run every row through the filter.
    pub fn filter<I>(&self, rows: I) -> DedupState
    where
        I: IntoIterator<Item = RawRow>,
    {
        rows.into_iter()
            .fold(DedupState::default(), |state, row| self.step(state, row))
    }

    /// Process one row.
    pub fn step(&self, mut state: DedupState, row: RawRow) -> DedupState {
        match self.accepts_type(&row) {
            Ok(true) => {}
            Ok(false) => {
                state.skipped += 1;
                return state;
            }
            Err(error) => {
                state.errors.push(RowError::new(row.index(), error));
                return state;
            }
        }

        let key = match self.key_for(&row) {
            Ok(key) => key,
            Err(error) => {
                state.errors.push(RowError::new(row.index(), error));
                return state;
            }
        };

        match (state.seen.get(&key).copied(), self.mode) {
            (None, _) => {
                state.seen.insert(key, state.kept.len());
                state.kept.push(KeptRow::new(row));
            }
            (Some(_), DedupMode::FirstWins) => {
                info!(
                    "Record '{}' already processed, skipping row {}",
                    key,
                    row.index() + 1
                );
                state.skipped += 1;
            }
            (Some(position), DedupMode::Group) => {
                debug!("Row {} joins record '{}'", row.index() + 1, key);
                state.kept[position].siblings.push(row);
            }
        }
        state
    }

    fn accepts_type(&self, row: &RawRow) -> Result<bool, ValueError> {
        let Some(filter) = self.type_filter else {
            return Ok(true);
        };

        let value = row.text(filter.column, fields::SUB_TYPE)?.unwrap_or_default();
        if filter.accepts(&value) {
            Ok(true)
        } else {
            info!("Skipping asset type '{}' in row {}", value, row.index() + 1);
            Ok(false)
        }
    }
}
