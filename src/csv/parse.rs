//! CSV reading implementation.
//!
//! This module turns CSV text into [`RawRow`]s keyed by the header row.

use crate::csv::config::CsvConfig;
use crate::{CellValue, RawRow};
use csv::ReaderBuilder;
use itertools::Itertools;
use tracing::warn;

/// Parse CSV text into rows. Empty fields become [`CellValue::Empty`] and
/// rows without any value are skipped; row indexes stay those of the file.
pub fn csv_rows(text: &str, config: &CsvConfig) -> Result<Vec<RawRow>, String> {
    // Spreadsheet exports often start with a byte order mark.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    config
        .validate()
        .map_err(|msg| format!("Invalid CSV configuration: {}", msg))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(config.delimiter)
        .has_headers(true)
        .quote(config.quote)
        .trim(if config.trim {
            csv::Trim::Fields
        } else {
            csv::Trim::None
        })
        .flexible(config.flexible)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| format!("Header parsing error: {}", e))?
        .iter()
        .map(String::from)
        .collect();

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err("No headers found in CSV".to_string());
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result.map_err(|e| match e.position() {
            Some(position) => format!("CSV parsing error at line {}: {}", position.line(), e),
            None => format!("CSV parsing error: {}", e),
        })?;

        let mut row = RawRow::new(index);
        for (column, header) in headers.iter().enumerate() {
            if header.is_empty() {
                continue;
            }
            let value = match record.get(column) {
                Some("") | None => CellValue::Empty,
                Some(value) => CellValue::from(value),
            };
            row.insert(header.clone(), value);
        }

        if record.len() > headers.len() {
            warn!(
                "Row {} has {} fields but the header has {}",
                index + 1,
                record.len(),
                headers.len()
            );
        }

        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Detect the delimiter of a CSV sample.
///
/// Picks the candidate splitting the first lines into the same number of
/// fields with the highest total; defaults to a comma.
pub fn detect_csv_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];
    let sample: Vec<&str> = content.lines().take(5).collect();

    CANDIDATES
        .into_iter()
        .filter_map(|delimiter| {
            let counts: Vec<usize> = sample
                .iter()
                .map(|line| line.split(delimiter as char).count())
                .collect();
            counts
                .iter()
                .all_equal()
                .then(|| (delimiter, counts.iter().sum::<usize>()))
        })
        .fold((b',', 0), |best, candidate| {
            if candidate.1 > best.1 { candidate } else { best }
        })
        .0
}
