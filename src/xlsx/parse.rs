//! Worksheet range to rows.

use crate::{CellValue, RawRow};
use calamine::{Data, DataType, Range};
use std::collections::HashSet;
use tracing::warn;

/// Convert one calamine cell.
///
/// Error cells read as empty; date cells become [`CellValue::DateTime`] when
/// calamine can decode them.
pub fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::DateTime(dt),
            None => CellValue::String(cell.to_string()),
        },
        Data::DurationIso(s) => CellValue::String(s.clone()),
    }
}

/// Turn a used range into rows keyed by its first row.
///
/// Header cells are taken verbatim. Columns with an empty header are ignored
/// and only the first of several equal headers is kept. Blank rows are
/// skipped without renumbering the rows after them.
pub fn rows_from_range(range: &Range<Data>) -> Vec<RawRow> {
    let mut lines = range.rows();
    let Some(header_row) = lines.next() else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let headers: Vec<Option<String>> = header_row
        .iter()
        .map(|cell| {
            let name = cell.to_string();
            if name.is_empty() {
                None
            } else if !seen.insert(name.clone()) {
                warn!("Duplicate column {:?} ignored", name);
                None
            } else {
                Some(name)
            }
        })
        .collect();

    lines
        .enumerate()
        .map(|(index, cells)| {
            let mut row = RawRow::new(index);
            for (header, cell) in headers.iter().zip(cells) {
                if let Some(header) = header {
                    row.insert(header.clone(), cell_value(cell));
                }
            }
            row
        })
        .filter(|row| !row.is_blank())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = cells.len() as u32;
        let width = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let range = sheet(&[
            &[text("Numero de Solicitud "), text("No.")],
            &[text("NC2019/0001"), Data::Float(7.0)],
        ]);
        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].text("Numero de Solicitud ", "field").unwrap().as_deref(),
            Some("NC2019/0001")
        );
        assert_eq!(rows[0].text("No.", "id").unwrap().as_deref(), Some("7"));
    }

    #[test]
    fn test_blank_rows_keep_indexes() {
        let range = sheet(&[
            &[text("titulo")],
            &[text("A")],
            &[Data::Empty],
            &[text("B")],
        ]);
        let indexes: Vec<usize> = rows_from_range(&range).iter().map(RawRow::index).collect();
        assert_eq!(indexes, vec![0, 2]);
    }

    #[test]
    fn test_duplicate_and_empty_headers_are_ignored() {
        let range = sheet(&[
            &[text("titulo"), Data::Empty, text("titulo")],
            &[text("A"), text("x"), text("B")],
        ]);
        let rows = rows_from_range(&range);
        assert_eq!(rows[0].text("titulo", "title").unwrap().as_deref(), Some("A"));
    }

    #[test]
    fn test_error_cells_read_as_empty() {
        let value = cell_value(&Data::Error(calamine::CellErrorType::NA));
        assert_eq!(value, CellValue::Empty);
    }

    #[test]
    fn test_empty_range() {
        let range: Range<Data> = Range::empty();
        assert!(rows_from_range(&range).is_empty());
    }
}
