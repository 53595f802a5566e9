//! Rule tables of the supported schema variants.

use super::{
    BlankCells, CountrySource, DateStyle, DedupMode, FieldRule, KeyRule, LanguagePolicy, Normalize, OrgTarget,
    RuleSet, TypeFilter,
};
use crate::language::CountryTable;
use crate::{Field, SchemaVariant, UNTITLED};

const TITLE_COLUMN: &str = "Titulo de la Patente";
const TYPE_COLUMN: &str = "Tipo de Activo De PI";
// The trailing space is part of the sheet's header.
const APPLICATION_NUMBER_COLUMN: &str = "Numero de Solicitud ";

const PATENT_TYPES: TypeFilter = TypeFilter {
    column: TYPE_COLUMN,
    allowed: &["Patente - Invención", "Patente - PCT"],
};

const BY_TITLE: KeyRule = KeyRule {
    column: TITLE_COLUMN,
    sentinel: UNTITLED,
    mode: DedupMode::FirstWins,
};

const BY_PROJECT: KeyRule = KeyRule {
    column: "id_unico",
    sentinel: "Desconocido",
    mode: DedupMode::Group,
};

const SPANISH_COLOMBIA: LanguagePolicy = LanguagePolicy::Fixed {
    language: "es",
    country: CountrySource::Fixed("CO"),
};

const PLAIN_TITLE: FieldRule = FieldRule::Title {
    column: TITLE_COLUMN,
    language: LanguagePolicy::Plain,
};

const PRIORITY_DATE: FieldRule = FieldRule::Text {
    column: "Fecha de concesion",
    field: Field::PriorityDate,
    normalize: Normalize::DatePrefix,
    default: None,
};

const APPLICATION_DATE: FieldRule = FieldRule::PublicationDate {
    column: "Fecha de Solicitud",
    style: DateStyle::Iso,
};

const HOLDERS: FieldRule = FieldRule::Organisations {
    column: "Titular",
    delimiter: Some(" - "),
    target: OrgTarget::Organisations,
};

const PATENT_NUMBER: FieldRule = FieldRule::Text {
    column: APPLICATION_NUMBER_COLUMN,
    field: Field::PatentNumber,
    normalize: Normalize::Newlines,
    default: None,
};

// Patentes: `en` and anything else maps to US.
const PATENTES_COUNTRIES: CountryTable = CountryTable::new(&[("es", "CO")], Some("US"));

static PATENTES: RuleSet = RuleSet {
    variant: SchemaVariant::Patentes,
    key: BY_TITLE,
    type_filter: None,
    base_language: "es",
    locale: None,
    blank_cells: BlankCells::Missing,
    rules: &[
        FieldRule::Id {
            column: "No.",
            default: Some("Desconocido"),
        },
        FieldRule::SubType {
            column: Some(TYPE_COLUMN),
            default: "Desconocido",
        },
        FieldRule::Title {
            column: TITLE_COLUMN,
            language: LanguagePolicy::Detect {
                allowed: None,
                countries: PATENTES_COUNTRIES,
            },
        },
        FieldRule::Abstract {
            column: "Descripcion",
            language: LanguagePolicy::Detect {
                allowed: Some(&["es", "en"]),
                countries: PATENTES_COUNTRIES,
            },
            normalize: Normalize::Verbatim,
            default: None,
        },
        FieldRule::Text {
            column: "Jurisdiccion",
            field: Field::Jurisdiction,
            normalize: Normalize::Verbatim,
            default: Some("Desconocido"),
        },
        FieldRule::Text {
            column: APPLICATION_NUMBER_COLUMN,
            field: Field::ApplicationNumber,
            normalize: Normalize::Verbatim,
            default: None,
        },
    ],
};

static PUBLICATIONS_BOGOTA: RuleSet = RuleSet {
    variant: SchemaVariant::PublicationsBogota,
    key: BY_TITLE,
    type_filter: Some(PATENT_TYPES),
    base_language: "es",
    locale: Some("es_CO"),
    blank_cells: BlankCells::Kept,
    rules: &[
        FieldRule::SubType {
            column: Some(TYPE_COLUMN),
            default: "",
        },
        PLAIN_TITLE,
        HOLDERS,
        PATENT_NUMBER,
        FieldRule::Abstract {
            column: "Descripcion",
            language: SPANISH_COLOMBIA,
            normalize: Normalize::Verbatim,
            default: None,
        },
        FieldRule::Persons {
            column: "Inventores/Autores",
            role: None,
        },
        FieldRule::Persons {
            column: "Investigador Principal",
            role: None,
        },
        APPLICATION_DATE,
        PRIORITY_DATE,
    ],
};

static PUBLICATIONS_CALI: RuleSet = RuleSet {
    variant: SchemaVariant::PublicationsCali,
    key: KeyRule {
        column: "titulo",
        sentinel: UNTITLED,
        mode: DedupMode::FirstWins,
    },
    type_filter: None,
    base_language: "es",
    locale: Some("es_CO"),
    blank_cells: BlankCells::Kept,
    rules: &[
        FieldRule::SubType {
            column: None,
            default: "Patente - Invención",
        },
        FieldRule::Title {
            column: "titulo",
            language: LanguagePolicy::Plain,
        },
        FieldRule::Organisations {
            column: "departamento",
            delimiter: Some(" - "),
            target: OrgTarget::Organisations,
        },
        FieldRule::Text {
            column: "Número de patente",
            field: Field::PatentNumber,
            normalize: Normalize::Newlines,
            default: None,
        },
        FieldRule::Abstract {
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
        },
        FieldRule::PairedPersons {
            first_names: "nombres",
            last_names: "apellidos",
            role: None,
        },
        FieldRule::PublicationDate {
            column: "fecha_publicacion",
            style: DateStyle::DayFirst,
        },
        FieldRule::Text {
            column: "fecha_prioridad",
            field: Field::PriorityDate,
            normalize: Normalize::DatePrefix,
            default: None,
        },
    ],
};

static PUBLICATIONS_APPROVED: RuleSet = RuleSet {
    variant: SchemaVariant::PublicationsApproved,
    key: BY_TITLE,
    type_filter: Some(PATENT_TYPES),
    base_language: "es",
    locale: Some("es_CO"),
    blank_cells: BlankCells::Missing,
    rules: &[
        FieldRule::SubType {
            column: Some(TYPE_COLUMN),
            default: "",
        },
        APPLICATION_DATE,
        PLAIN_TITLE,
        FieldRule::Abstract {
            column: "Descripcion",
            // English abstracts are filed as GB here.
            language: LanguagePolicy::Detect {
                allowed: None,
                countries: CountryTable::new(&[("es", "CO")], Some("GB")),
            },
            normalize: Normalize::Verbatim,
            default: Some("Descripción no disponible"),
        },
        FieldRule::Persons {
            column: "Inventores/Autores",
            role: Some("inventor"),
        },
        HOLDERS,
        PATENT_NUMBER,
        PRIORITY_DATE,
    ],
};

static PUBLICATIONS_STAGING: RuleSet = RuleSet {
    variant: SchemaVariant::PublicationsStaging,
    key: BY_TITLE,
    type_filter: None,
    base_language: "es",
    locale: Some("es_CO"),
    blank_cells: BlankCells::Kept,
    rules: &[
        PLAIN_TITLE,
        FieldRule::Abstract {
            column: "Descripcion",
            language: SPANISH_COLOMBIA,
            normalize: Normalize::Verbatim,
            default: None,
        },
        APPLICATION_DATE,
        FieldRule::Text {
            column: "Jurisdiccion",
            field: Field::Jurisdiction,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Text {
            column: APPLICATION_NUMBER_COLUMN,
            field: Field::PatentNumber,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Persons {
            column: "Inventores/Autores",
            role: Some("inventor"),
        },
        FieldRule::Organisations {
            column: "Facultad",
            delimiter: None,
            target: OrgTarget::Units,
        },
        FieldRule::Organisations {
            column: "Departamento/Instituto",
            delimiter: None,
            target: OrgTarget::Units,
        },
        FieldRule::Organisations {
            column: "Titular",
            delimiter: Some("-"),
            target: OrgTarget::Units,
        },
        FieldRule::Organisations {
            column: "Grupo De Investigacion",
            delimiter: None,
            target: OrgTarget::Units,
        },
        HOLDERS,
        FieldRule::Text {
            column: "IPC/CIP",
            field: Field::Ipc,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Text {
            column: "Estado actual del tramite",
            field: Field::ProcedureStatus,
            normalize: Normalize::Trim,
            default: None,
        },
        PRIORITY_DATE,
        FieldRule::Text {
            column: "Grupo De Investigacion",
            field: Field::ResearchGroup,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Text {
            column: "Link De Consulta",
            field: Field::Link,
            normalize: Normalize::Trim,
            default: None,
        },
    ],
};

// Projects: languages other than `en` and `es` get no country.
const PROJECT_COUNTRIES: CountryTable = CountryTable::new(&[("en", "US"), ("es", "CO")], None);

const PROJECT_ID: FieldRule = FieldRule::Id {
    column: "id_unico",
    default: None,
};

const PROJECT_TITLE: FieldRule = FieldRule::Title {
    column: "Titulo del proyecto",
    language: LanguagePolicy::Detect {
        allowed: None,
        countries: PROJECT_COUNTRIES,
    },
};

const PROJECT_DESCRIPTION: FieldRule = FieldRule::Abstract {
    column: "descripcion_final",
    language: LanguagePolicy::Detect {
        allowed: Some(&["es", "en"]),
        countries: PROJECT_COUNTRIES,
    },
    normalize: Normalize::Newlines,
    default: None,
};

const FUNDERS: &[(&str, &str)] = &[("PUJ", "PUJAV"), ("HUSI", "HUSI")];

static UPM_PROJECTS: RuleSet = RuleSet {
    variant: SchemaVariant::UpmProjects,
    key: BY_PROJECT,
    type_filter: None,
    base_language: "es",
    locale: None,
    blank_cells: BlankCells::Kept,
    rules: &[
        PROJECT_ID,
        PROJECT_TITLE,
        PROJECT_DESCRIPTION,
        FieldRule::Participants {
            id_column: "ID Empleado",
            role_column: "Rol en el proyecto",
        },
        FieldRule::Text {
            column: "Nombre patrocinador",
            field: Field::ExternalOrganisation,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Text {
            column: "Tipo de financiador",
            field: Field::FundingOrganisation,
            normalize: Normalize::Lookup(FUNDERS),
            default: None,
        },
        FieldRule::Text {
            column: "owner id",
            field: Field::ManagingOrganisation,
            normalize: Normalize::Trim,
            default: None,
        },
        FieldRule::Text {
            column: "Fecha de inicio",
            field: Field::StartDate,
            normalize: Normalize::StripMidnight,
            default: None,
        },
        FieldRule::Text {
            column: "Fecha final",
            field: Field::EndDate,
            normalize: Normalize::StripMidnight,
            default: None,
        },
    ],
};

static PI_PROJECTS: RuleSet = RuleSet {
    variant: SchemaVariant::PiProjects,
    key: BY_PROJECT,
    type_filter: None,
    base_language: "es",
    locale: None,
    blank_cells: BlankCells::Kept,
    rules: &[PROJECT_ID, PROJECT_TITLE, PROJECT_DESCRIPTION],
};

/// The rule set of a variant.
pub fn rule_set(variant: SchemaVariant) -> &'static RuleSet {
    match variant {
        SchemaVariant::Patentes => &PATENTES,
        SchemaVariant::PublicationsBogota => &PUBLICATIONS_BOGOTA,
        SchemaVariant::PublicationsCali => &PUBLICATIONS_CALI,
        SchemaVariant::PublicationsApproved => &PUBLICATIONS_APPROVED,
        SchemaVariant::PublicationsStaging => &PUBLICATIONS_STAGING,
        SchemaVariant::UpmProjects => &UPM_PROJECTS,
        SchemaVariant::PiProjects => &PI_PROJECTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_sets_match_their_variant() {
        for variant in SchemaVariant::ALL {
            assert_eq!(rule_set(variant).variant, variant);
        }
    }

    #[test]
    fn test_project_variants_group_rows() {
        assert_eq!(UPM_PROJECTS.key.mode, DedupMode::Group);
        assert_eq!(PI_PROJECTS.key.mode, DedupMode::Group);
        assert_eq!(PATENTES.key.mode, DedupMode::FirstWins);
    }

    #[test]
    fn test_type_filter_only_on_filtered_variants() {
        let filtered: Vec<SchemaVariant> = SchemaVariant::ALL
            .into_iter()
            .filter(|variant| rule_set(*variant).type_filter.is_some())
            .collect();
        assert_eq!(
            filtered,
            vec![SchemaVariant::PublicationsBogota, SchemaVariant::PublicationsApproved]
        );
    }

    #[test]
    fn test_blank_text_is_missing_for_patentes_and_approved() {
        let missing: Vec<SchemaVariant> = SchemaVariant::ALL
            .into_iter()
            .filter(|variant| rule_set(*variant).blank_cells == BlankCells::Missing)
            .collect();
        assert_eq!(
            missing,
            vec![SchemaVariant::Patentes, SchemaVariant::PublicationsApproved]
        );
    }
}
