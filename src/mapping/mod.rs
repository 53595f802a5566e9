//! Row to record mapping.
//!
//! [`RecordMapper`] interprets the [`FieldRule`]s of a [`RuleSet`] against a
//! [`KeptRow`]. Any rule failing aborts the whole row, so a record is either
//! complete or not produced at all.

mod rules;
pub mod variants;

pub use rules::{
    BlankCells, CountrySource, DateStyle, DedupMode, FieldRule, KeyRule, LanguagePolicy, Normalize, OrgTarget,
    RuleSet, TypeFilter,
};

use crate::dedupe::KeptRow;
use crate::error::{RowError, ValueError, fields};
use crate::language::{LanguageDetector, resolve_language};
use crate::{
    DateParts, LanguageCode, LocalizedText, OutputRecord, Participant, Person, PersonName, RawRow,
    UNTITLED, utils,
};
use tracing::{debug, warn};

/// Applies a rule set to kept rows.
pub struct RecordMapper<'a> {
    rules: &'a RuleSet,
    detector: &'a dyn LanguageDetector,
}

impl<'a> RecordMapper<'a> {
    pub fn new(rules: &'a RuleSet, detector: &'a dyn LanguageDetector) -> Self {
        Self { rules, detector }
    }

    /// Map one kept row (and its siblings) to a record.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] carrying the row index when a referenced column
    /// is missing or a value cannot be interpreted.
    pub fn map(&self, kept: &KeptRow) -> Result<OutputRecord, RowError> {
        let mut record = OutputRecord::new();
        record.title = LocalizedText::plain(UNTITLED);
        record.language = self.rules.locale.map(String::from);

        for rule in self.rules.rules {
            self.apply(rule, kept, &mut record)
                .map_err(|error| RowError::new(kept.index(), error))?;
        }

        Ok(record)
    }

    fn apply(
        &self,
        rule: &FieldRule,
        kept: &KeptRow,
        record: &mut OutputRecord,
    ) -> Result<(), ValueError> {
        let row = kept.row();

        match *rule {
            FieldRule::Id { column, default } => {
                record.id = row
                    .text(column, fields::ID)?
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .or_else(|| default.map(String::from));
            }
            FieldRule::Title { column, language } => {
                let title = row
                    .text(column, fields::TITLE)?
                    .unwrap_or_else(|| UNTITLED.to_string());
                record.title = self.localize(title, &language, row, fields::TITLE, true)?;
            }
            FieldRule::SubType { column, default } => {
                let value = match column {
                    Some(column) => row.text(column, fields::SUB_TYPE)?,
                    None => None,
                };
                record.sub_type = Some(value.unwrap_or_else(|| default.to_string()));
            }
            FieldRule::Abstract {
                column,
                language,
                normalize,
                default,
            } => {
                let text = row
                    .text(column, fields::ABSTRACT)?
                    .and_then(|text| normalize.apply(&text))
                    .filter(|text| self.rules.blank_cells.is_value(text));

                record.abstract_text = match (text, default) {
                    (Some(text), _) => {
                        Some(self.localize(text, &language, row, fields::ABSTRACT, true)?)
                    }
                    (None, Some(default)) => {
                        debug!("No abstract in row {}, using default text", row.index() + 1);
                        let text = default.to_string();
                        Some(self.localize(text, &language, row, fields::ABSTRACT, false)?)
                    }
                    (None, None) => None,
                };
            }
            FieldRule::Organisations {
                column,
                delimiter,
                target,
            } => {
                let field = match target {
                    OrgTarget::Organisations => fields::ORGANISATIONS,
                    OrgTarget::Units => fields::ORGANISATIONAL_UNITS,
                };
                if let Some(value) = row.text(column, field)? {
                    let names = utils::split_delimited(&value, delimiter);
                    match target {
                        OrgTarget::Organisations => record.organisations.extend(names),
                        OrgTarget::Units => record.organisational_units.extend(names),
                    }
                }
            }
            FieldRule::Persons { column, role } => {
                if let Some(value) = row.text(column, fields::PERSONS)? {
                    for full_name in value.split(',') {
                        let name = person_name(full_name, column, &value)?;
                        record.persons.push(Person {
                            role: role.map(String::from),
                            name,
                        });
                    }
                }
            }
            FieldRule::PairedPersons {
                first_names,
                last_names,
                role,
            } => {
                let firsts = row.text(first_names, fields::PERSONS)?;
                let lasts = row.text(last_names, fields::PERSONS)?;
                if let (Some(firsts), Some(lasts)) = (firsts, lasts) {
                    for (first, last) in firsts.split(',').zip(lasts.split(',')) {
                        let full_name = format!("{} {}", first, last);
                        let name = person_name(&full_name, first_names, &firsts)?;
                        record.persons.push(Person {
                            role: role.map(String::from),
                            name,
                        });
                    }
                }
            }
            FieldRule::Participants {
                id_column,
                role_column,
            } => {
                for member in kept.rows() {
                    let person_id = member
                        .text(id_column, fields::PARTICIPANTS)?
                        .map(|id| id.trim().to_string())
                        .filter(|id| !id.is_empty());
                    let Some(person_id) = person_id else {
                        debug!("Row {} has no participant id", member.index() + 1);
                        continue;
                    };
                    let role = member
                        .text(role_column, fields::PARTICIPANTS)?
                        .and_then(|role| Normalize::RemoveSpaces.apply(&role))
                        .filter(|role| !role.is_empty());
                    record.participants.push(Participant { person_id, role });
                }
            }
            FieldRule::PublicationDate { column, style } => {
                if let Some(value) = row.text(column, fields::PUBLICATION_DATE)? {
                    let parts = match style {
                        DateStyle::Iso => DateParts::parse(&value),
                        DateStyle::DayFirst => DateParts::parse_day_first(&value),
                    };
                    match parts {
                        Some(parts) => record.publication_date = Some(parts),
                        None => warn!(
                            "Malformed or incomplete date in row {}: {}",
                            row.index() + 1,
                            utils::date_prefix(&value)
                        ),
                    }
                }
            }
            FieldRule::Text {
                column,
                field,
                normalize,
                default,
            } => {
                let value = row
                    .text(column, fields::FIELD)?
                    .and_then(|value| normalize.apply(&value))
                    .filter(|value| self.rules.blank_cells.is_value(value))
                    .or_else(|| default.map(String::from));
                if let Some(value) = value {
                    record.fields.insert(field, value);
                }
            }
        }

        Ok(())
    }

    fn localize(
        &self,
        text: String,
        policy: &LanguagePolicy,
        row: &RawRow,
        field: &'static str,
        detect: bool,
    ) -> Result<LocalizedText, ValueError> {
        let localized = match *policy {
            LanguagePolicy::Plain => LocalizedText::plain(text),
            LanguagePolicy::Detect { allowed, countries } => {
                let sample = if detect { text.as_str() } else { "" };
                let language =
                    resolve_language(self.detector, sample, self.rules.base_language, allowed);
                let country = countries.country_for(&language).map(String::from);
                LocalizedText {
                    text,
                    language: Some(language),
                    country,
                }
            }
            LanguagePolicy::Fixed { language, country } => {
                let country = match country {
                    CountrySource::Fixed(country) => country.to_string(),
                    CountrySource::Column { column, default } => row
                        .text(column, field)?
                        .map(|country| country.trim().to_uppercase())
                        .filter(|country| !country.is_empty())
                        .unwrap_or_else(|| default.to_string()),
                };
                LocalizedText {
                    text,
                    language: Some(LanguageCode::new(language)),
                    country: Some(country),
                }
            }
        };
        Ok(localized)
    }
}

fn person_name(full_name: &str, key: &'static str, value: &str) -> Result<PersonName, ValueError> {
    PersonName::from_full_name(full_name).ok_or_else(|| ValueError::BadValue {
        field: fields::PERSONS,
        key,
        value: value.to_string(),
        reason: "empty person name".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::tests::FixedDetector;
    use crate::language::{CountryTable, NoDetection};
    use crate::{CellValue, Field, SchemaVariant};
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    fn rule_set(rules: &'static [FieldRule]) -> RuleSet {
        RuleSet {
            variant: SchemaVariant::PublicationsBogota,
            key: KeyRule {
                column: "titulo",
                sentinel: UNTITLED,
                mode: DedupMode::FirstWins,
            },
            type_filter: None,
            base_language: "es",
            locale: Some("es_CO"),
            blank_cells: BlankCells::Missing,
            rules,
        }
    }

    fn map_row(rules: &RuleSet, row: RawRow) -> Result<OutputRecord, RowError> {
        RecordMapper::new(rules, &NoDetection).map(&KeptRow::new(row))
    }

    const DETECT_US: LanguagePolicy = LanguagePolicy::Detect {
        allowed: None,
        countries: CountryTable::new(&[("es", "CO")], Some("US")),
    };

    #[test]
    fn test_title_falls_back_to_sentinel() {
        static RULES: &[FieldRule] = &[FieldRule::Title {
            column: "titulo",
            language: LanguagePolicy::Plain,
        }];
        let rules = rule_set(RULES);
        let record = map_row(&rules, RawRow::from_pairs(0, [("titulo", CellValue::Empty)])).unwrap();

        assert_eq!(record.title, LocalizedText::plain(UNTITLED));
        assert_eq!(record.language.as_deref(), Some("es_CO"));
    }

    #[test]
    fn test_organisations_split_on_delimiter() {
        static RULES: &[FieldRule] = &[FieldRule::Organisations {
            column: "Titular",
            delimiter: Some(" - "),
            target: OrgTarget::Organisations,
        }];
        let rules = rule_set(RULES);
        let row = RawRow::from_pairs(0, [("Titular", "Univ X - Univ Y")]);
        let record = map_row(&rules, row).unwrap();

        assert_eq!(record.organisations, vec!["Univ X", "Univ Y"]);
    }

    #[test]
    fn test_persons_get_uniform_role() {
        static RULES: &[FieldRule] = &[FieldRule::Persons {
            column: "Inventores/Autores",
            role: Some("inventor"),
        }];
        let rules = rule_set(RULES);
        let row = RawRow::from_pairs(
            0,
            [("Inventores/Autores", "Ana Gómez, Juan Carlos Pérez Ruiz")],
        );
        let record = map_row(&rules, row).unwrap();

        let names: Vec<(&str, &str)> = record
            .persons
            .iter()
            .map(|p| (p.name.first_name.as_str(), p.name.last_name.as_str()))
            .collect();
        assert_eq!(names, vec![("Ana", "Gómez"), ("Juan Carlos", "Pérez Ruiz")]);
        assert!(record.persons.iter().all(|p| p.role.as_deref() == Some("inventor")));
    }

    #[test]
    fn test_blank_person_aborts_the_row() {
        static RULES: &[FieldRule] = &[FieldRule::Persons {
            column: "Inventores/Autores",
            role: None,
        }];
        let rules = rule_set(RULES);
        let row = RawRow::from_pairs(7, [("Inventores/Autores", "Ana Gómez, ")]);
        let error = map_row(&rules, row).unwrap_err();

        assert_eq!(error.index, 7);
        assert!(matches!(error.error, ValueError::BadValue { key: "Inventores/Autores", .. }));
    }

    #[test]
    fn test_paired_persons_zip_columns() {
        static RULES: &[FieldRule] = &[FieldRule::PairedPersons {
            first_names: "nombres",
            last_names: "apellidos",
            role: None,
        }];
        let rules = rule_set(RULES);
        let row = RawRow::from_pairs(
            0,
            [("nombres", "Ana, Luis"), ("apellidos", "Gómez Ruiz, Mora")],
        );
        let record = map_row(&rules, row).unwrap();

        assert_eq!(record.persons.len(), 2);
        assert_eq!(record.persons[0].name.last_name, "Gómez Ruiz");
        assert_eq!(record.persons[1].name.first_name, "Luis");
    }

    #[test]
    fn test_missing_column_aborts_the_row() {
        static RULES: &[FieldRule] = &[FieldRule::Text {
            column: "Numero de Solicitud ",
            field: Field::PatentNumber,
            normalize: Normalize::Newlines,
            default: None,
        }];
        let rules = rule_set(RULES);
        let error = map_row(&rules, RawRow::from_pairs(2, [("titulo", "A")])).unwrap_err();

        assert_eq!(error.to_string(), "Error in row 3: Column \"Numero de Solicitud \" not found in sheet");
    }

    #[test]
    #[traced_test]
    fn test_malformed_date_is_omitted() {
        static RULES: &[FieldRule] = &[FieldRule::PublicationDate {
            column: "Fecha de Solicitud",
            style: DateStyle::Iso,
        }];
        let rules = rule_set(RULES);
        let record = map_row(&rules, RawRow::from_pairs(0, [("Fecha de Solicitud", "2024/08")])).unwrap();
        assert_eq!(record.publication_date, None);
        assert!(logs_contain("Malformed or incomplete date in row 1: 2024/08"));

        let record =
            map_row(&rules, RawRow::from_pairs(0, [("Fecha de Solicitud", "2024-08-26 00:00:00")]))
                .unwrap();
        assert_eq!(record.publication_date, DateParts::parse("2024-08-26"));
    }

    #[test]
    fn test_empty_abstract_uses_base_language_without_detection() {
        static RULES: &[FieldRule] = &[FieldRule::Abstract {
            column: "Descripcion",
            language: DETECT_US,
            normalize: Normalize::Verbatim,
            default: Some("Descripción no disponible"),
        }];
        let rules = rule_set(RULES);
        let detector = FixedDetector::new(Some("en"));
        let mapper = RecordMapper::new(&rules, &detector);

        let row = RawRow::from_pairs(0, [("Descripcion", "   ")]);
        let record = mapper.map(&KeptRow::new(row)).unwrap();
        let text = record.abstract_text.unwrap();

        assert_eq!(text.text, "Descripción no disponible");
        assert_eq!(text.locale().as_deref(), Some("es_CO"));
        assert_eq!(detector.calls.get(), 0);
    }

    #[test]
    fn test_blank_abstract_is_kept_when_blank_cells_are_values() {
        static RULES: &[FieldRule] = &[
            FieldRule::Abstract {
                column: "Descripcion",
                language: SPANISH,
                normalize: Normalize::Verbatim,
                default: None,
            },
            FieldRule::Text {
                column: "Numero de Solicitud ",
                field: Field::PatentNumber,
                normalize: Normalize::Newlines,
                default: None,
            },
        ];
        const SPANISH: LanguagePolicy = LanguagePolicy::Fixed {
            language: "es",
            country: CountrySource::Fixed("CO"),
        };
        let row = || {
            RawRow::from_pairs(
                0,
                [
                    ("Descripcion", CellValue::from("")),
                    ("Numero de Solicitud ", CellValue::from("")),
                ],
            )
        };

        let kept = RuleSet {
            blank_cells: BlankCells::Kept,
            ..rule_set(RULES)
        };
        let record = map_row(&kept, row()).unwrap();
        assert_eq!(record.abstract_text.clone().map(|text| text.text), Some(String::new()));
        assert_eq!(record.field(Field::PatentNumber), Some(""));

        let record = map_row(&rule_set(RULES), row()).unwrap();
        assert_eq!(record.abstract_text, None);
        assert_eq!(record.field(Field::PatentNumber), None);

        let empty = RawRow::from_pairs(0, [("Descripcion", CellValue::Empty), ("Numero de Solicitud ", CellValue::Empty)]);
        let record = map_row(&kept, empty).unwrap();
        assert_eq!(record.abstract_text, None);
    }

    #[test]
    fn test_detected_abstract_language_sets_country() {
        static RULES: &[FieldRule] = &[FieldRule::Abstract {
            column: "Descripcion",
            language: DETECT_US,
            normalize: Normalize::Verbatim,
            default: None,
        }];
        let rules = rule_set(RULES);
        let detector = FixedDetector::new(Some("en"));
        let mapper = RecordMapper::new(&rules, &detector);

        let row = RawRow::from_pairs(0, [("Descripcion", "A rotary valve")]);
        let record = mapper.map(&KeptRow::new(row)).unwrap();

        assert_eq!(record.abstract_text.unwrap().locale().as_deref(), Some("en_US"));
        assert_eq!(detector.calls.get(), 1);
    }

    #[test]
    fn test_fixed_language_reads_country_column() {
        static RULES: &[FieldRule] = &[FieldRule::Abstract {
            column: "resumen",
            language: LanguagePolicy::Fixed {
                language: "es",
                country: CountrySource::Column {
                    column: "pais",
                    default: "CO",
                },
            },
            normalize: Normalize::Verbatim,
            default: None,
        }];
        let rules = rule_set(RULES);

        let row = RawRow::from_pairs(0, [("resumen", "Un sensor"), ("pais", "mx")]);
        let text = map_row(&rules, row).unwrap().abstract_text.unwrap();
        assert_eq!(text.locale().as_deref(), Some("es_MX"));

        let row = RawRow::from_pairs(0, [("resumen", CellValue::from("Un sensor")), ("pais", CellValue::Empty)]);
        let text = map_row(&rules, row).unwrap().abstract_text.unwrap();
        assert_eq!(text.locale().as_deref(), Some("es_CO"));
    }

    #[test]
    fn test_participants_span_the_group() {
        static RULES: &[FieldRule] = &[FieldRule::Participants {
            id_column: "ID Empleado",
            role_column: "Rol en el proyecto",
        }];
        let rules = rule_set(RULES);

        let member = |index: usize, id: CellValue, role: &str| {
            RawRow::from_pairs(
                index,
                [
                    ("id_unico", CellValue::from("P1")),
                    ("ID Empleado", id),
                    ("Rol en el proyecto", CellValue::from(role)),
                ],
            )
        };
        let rows = vec![
            member(0, CellValue::Float(1020.0), "Investigador Principal"),
            member(1, CellValue::Empty, "Asesor"),
            member(2, CellValue::from("E-77"), "Co Investigador"),
        ];
        let kept = crate::dedupe::Deduplicator::new("id_unico")
            .with_mode(DedupMode::Group)
            .filter(rows)
            .into_kept()
            .remove(0);

        let record = RecordMapper::new(&rules, &NoDetection).map(&kept).unwrap();
        assert_eq!(
            record.participants,
            vec![
                Participant {
                    person_id: "1020".to_string(),
                    role: Some("InvestigadorPrincipal".to_string()),
                },
                Participant {
                    person_id: "E-77".to_string(),
                    role: Some("CoInvestigador".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_text_field_lookup() {
        const FUNDERS: &[(&str, &str)] = &[("PUJ", "PUJAV")];
        static RULES: &[FieldRule] = &[FieldRule::Text {
            column: "Tipo de financiador",
            field: Field::FundingOrganisation,
            normalize: Normalize::Lookup(FUNDERS),
            default: None,
        }];
        let rules = rule_set(RULES);

        let record = map_row(&rules, RawRow::from_pairs(0, [("Tipo de financiador", "PUJ")])).unwrap();
        assert_eq!(record.field(Field::FundingOrganisation), Some("PUJAV"));

        let record = map_row(&rules, RawRow::from_pairs(0, [("Tipo de financiador", "Otro")])).unwrap();
        assert_eq!(record.field(Field::FundingOrganisation), None);
    }
}
