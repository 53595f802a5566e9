//! Workbook row source.
//!
//! Opens `.xlsx`, `.xls`, `.xlsb` and `.ods` files through calamine and reads
//! one named sheet. The first row of the sheet is the header.

mod parse;

use crate::{ImportError, RawRow, RowSource};
use calamine::{Reader, open_workbook_auto};
pub use parse::{cell_value, rows_from_range};
use std::path::PathBuf;
use tracing::debug;

/// Row source over one sheet of a workbook.
#[derive(Debug, Clone)]
pub struct XlsxSource {
    path: PathBuf,
    sheet: String,
}

impl XlsxSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, sheet: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: sheet.into(),
        }
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }
}

impl RowSource for XlsxSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, ImportError> {
        let mut workbook =
            open_workbook_auto(&self.path).map_err(|e| ImportError::source_read(&self.path, e))?;

        let sheets = workbook.sheet_names();
        if !sheets.iter().any(|name| name == &self.sheet) {
            return Err(ImportError::source_read(
                &self.path,
                format!("sheet {:?} not found (available: {})", self.sheet, sheets.join(", ")),
            ));
        }

        let range = workbook
            .worksheet_range(&self.sheet)
            .map_err(|e| ImportError::source_read(&self.path, e))?;
        debug!("Sheet {:?} spans {:?}", self.sheet, range.get_size());

        Ok(rows_from_range(&range))
    }
}
