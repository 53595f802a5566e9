//! End-to-end conversion.
//!
//! [`Converter`] turns rows into a [`Document`]; [`Converter::run`] adds the
//! reading and writing around it. Row-level failures are logged and counted,
//! they never abort a run.

use crate::dedupe::Deduplicator;
use crate::language::LanguageDetector;
use crate::mapping::{RecordMapper, RuleSet};
use crate::xml::{self, layout};
use crate::{Document, ImportError, RawRow, RowError, RowSource, SchemaVariant};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Where a run writes its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub dir: PathBuf,
    pub suffix: String,
    /// Date stamped into the file name
    pub date: NaiveDate,
}

impl OutputTarget {
    /// Target dated today (local time).
    pub fn new(dir: impl Into<PathBuf>, suffix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            suffix: suffix.into(),
            date: chrono::Local::now().date_naive(),
        }
    }

    /// The variant's default directory and suffix.
    pub fn for_variant(variant: SchemaVariant) -> Self {
        Self::new(variant.default_output_dir(), variant.default_suffix())
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn path(&self) -> PathBuf {
        xml::output_path(&self.dir, &self.suffix, self.date)
    }
}

/// Result of converting rows, before anything is written.
#[derive(Debug)]
pub struct Conversion {
    pub document: Document,
    pub rows_read: usize,
    /// Rows dropped by the type filter or as duplicates
    pub rows_skipped: usize,
    pub errors: Vec<RowError>,
}

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub path: PathBuf,
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub rows_failed: usize,
    pub records_written: usize,
}

/// Converts rows for one schema variant.
pub struct Converter<'a> {
    rules: &'a RuleSet,
    detector: &'a dyn LanguageDetector,
}

impl<'a> Converter<'a> {
    pub fn new(rules: &'a RuleSet, detector: &'a dyn LanguageDetector) -> Self {
        Self { rules, detector }
    }

    /// Convert rows into a document, dropping rows that fail.
    pub fn convert(&self, rows: Vec<RawRow>) -> Document {
        self.convert_rows(rows).document
    }

    /// Convert rows and keep the statistics.
    pub fn convert_rows(&self, rows: Vec<RawRow>) -> Conversion {
        let rows_read = rows.len();
        let state = Deduplicator::from_rules(self.rules).filter(rows);
        let rows_skipped = state.skipped();
        let (kept, mut errors) = state.into_parts();

        let mapper = RecordMapper::new(self.rules, self.detector);
        let mut document = Document::new(self.rules.variant);
        let total = kept.len();

        for (position, row) in kept.iter().enumerate() {
            debug!("Processing record {} of {} (row {})", position + 1, total, row.index() + 1);
            match mapper.map(row) {
                Ok(record) => document.push(record),
                Err(err) => errors.push(err),
            }
        }

        errors.sort_by_key(|err| err.index);
        for err in &errors {
            error!("{}", err);
        }

        Conversion {
            document,
            rows_read,
            rows_skipped,
            errors,
        }
    }

    /// Read, convert and write.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::SourceRead`] when the source cannot be read and
    /// [`ImportError::Write`] when the output cannot be written. Row errors
    /// are only logged.
    pub fn run<S: RowSource + ?Sized>(
        &self,
        source: &mut S,
        target: &OutputTarget,
    ) -> Result<RunSummary, ImportError> {
        let rows = source.read_rows()?;
        info!("Read {} rows", rows.len());

        let conversion = self.convert_rows(rows);
        let path = target.path();
        write(&conversion.document, &path)?;
        info!("XML file generated: {}", path.display());

        Ok(RunSummary {
            path,
            rows_read: conversion.rows_read,
            rows_skipped: conversion.rows_skipped,
            rows_failed: conversion.errors.len(),
            records_written: conversion.document.len(),
        })
    }
}

/// Lay out, indent and write a document.
pub fn write(document: &Document, path: &Path) -> Result<(), ImportError> {
    let mut root = layout::build(document);
    root.indent();
    xml::write_document(&root, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CellValue;
    use crate::language::NoDetection;
    use pretty_assertions::assert_eq;

    fn bogota_row(index: usize, title: &str, kind: &str) -> RawRow {
        RawRow::from_pairs(
            index,
            [
                ("Titulo de la Patente", CellValue::from(title)),
                ("Tipo de Activo De PI", CellValue::from(kind)),
                ("Titular", CellValue::from("Pontificia Universidad Javeriana")),
                ("Numero de Solicitud ", CellValue::from("NC2019/\n0001")),
                ("Descripcion", CellValue::Empty),
                ("Inventores/Autores", CellValue::from("Ana Gómez")),
                ("Investigador Principal", CellValue::Empty),
                ("Fecha de Solicitud", CellValue::from("2019-03-01 00:00:00")),
                ("Fecha de concesion", CellValue::Empty),
            ],
        )
    }

    #[test]
    fn test_convert_counts_rows() {
        let rows = vec![
            bogota_row(0, "A", "Patente - Invención"),
            bogota_row(1, "A", "Patente - Invención"),
            bogota_row(2, "B", "Diseño industrial"),
            RawRow::from_pairs(3, [("Titulo de la Patente", "C"), ("Tipo de Activo De PI", "Patente - PCT")]),
            bogota_row(4, "D", "Patente - PCT"),
        ];

        let converter = Converter::new(SchemaVariant::PublicationsBogota.rules(), &NoDetection);
        let conversion = converter.convert_rows(rows);

        assert_eq!(conversion.rows_read, 5);
        assert_eq!(conversion.rows_skipped, 2);
        assert_eq!(conversion.errors.len(), 1);
        assert_eq!(conversion.errors[0].index, 3);

        let titles: Vec<&str> = conversion
            .document
            .records
            .iter()
            .map(|r| r.title.text.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "D"]);
        assert_eq!(
            conversion.document.records[0].field(crate::Field::PatentNumber),
            Some("NC2019/ 0001")
        );
    }

    #[test]
    fn test_run_writes_dated_file() {
        let dir = tempfile::tempdir().unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 8, 26).unwrap();
        let target = OutputTarget::new(dir.path(), "patentes").with_date(date);

        let mut source = vec![bogota_row(0, "A", "Patente - PCT")];
        let converter = Converter::new(SchemaVariant::PublicationsBogota.rules(), &NoDetection);
        let summary = converter.run(&mut source, &target).unwrap();

        assert_eq!(summary.path, dir.path().join("2024_08_26_patentes.xml"));
        assert_eq!(summary.records_written, 1);
        assert_eq!(summary.rows_failed, 0);
        assert!(summary.path.exists());
    }

    #[test]
    fn test_projects_without_id_are_not_merged() {
        let project = |index: usize, id: CellValue, title: &str, employee: &str| {
            RawRow::from_pairs(
                index,
                [
                    ("id_unico", id),
                    ("Titulo del proyecto", CellValue::from(title)),
                    ("ID Empleado", CellValue::from(employee)),
                ],
            )
        };
        let rows = vec![
            project(0, CellValue::Empty, "Proyecto Uno", "E1"),
            project(1, CellValue::Empty, "Proyecto Dos", "E2"),
        ];

        let converter = Converter::new(SchemaVariant::UpmProjects.rules(), &NoDetection);
        let conversion = converter.convert_rows(rows);

        assert!(conversion.document.is_empty());
        let failed: Vec<usize> = conversion.errors.iter().map(|e| e.index).collect();
        assert_eq!(failed, vec![0, 1]);
    }

    #[test]
    fn test_default_target() {
        let target = OutputTarget::for_variant(SchemaVariant::UpmProjects);
        assert_eq!(target.dir, PathBuf::from("Resultado"));
        assert_eq!(target.suffix, "Bogota_SIAP");
    }
}
