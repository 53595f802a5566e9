//! Element layouts of the schema variants.
//!
//! Element names, attributes and nesting order are constants of each
//! vocabulary. Containers are only emitted when they have content, except for
//! the fixed status blocks every publication carries.

use super::Element;
use crate::{Document, Field, LocalizedText, OutputRecord, Person, SchemaVariant};

const PUBLICATION_NS: &str = "v1.publication-import.base-uk.pure.atira.dk";
const COMMONS_NS: &str = "v3.commons.pure.atira.dk";
const UPM_PROJECT_NS: &str = "v1.upmproject.pure.atira.dk";
const PI_PROJECT_NS: &str = "v1.piproject.pure.atira.dk";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const STAGING_SCHEMA_LOCATION: &str = "https://puj-staging.elsevierpure.com/ws/api/524 https://puj-staging.elsevierpure.com/ws/api/524/xsd/schema1.xsd";

const OWNER_ID: &str = "PUJAV";

/// Lay out a whole document. The result is not indented yet.
pub fn build(document: &Document) -> Element {
    let layout: fn(&OutputRecord) -> Element = match document.variant {
        SchemaVariant::Patentes => patente,
        SchemaVariant::PublicationsBogota | SchemaVariant::PublicationsCali => publication,
        SchemaVariant::PublicationsApproved => approved_publication,
        SchemaVariant::PublicationsStaging => staging_publication,
        SchemaVariant::UpmProjects => upm_project,
        SchemaVariant::PiProjects => pi_project,
    };

    root(document.variant).with_children(document.records.iter().map(layout))
}

/// The empty root element of a variant, with its namespace declarations.
pub fn root(variant: SchemaVariant) -> Element {
    match variant {
        SchemaVariant::Patentes => Element::new("patentes"),
        SchemaVariant::PublicationsBogota
        | SchemaVariant::PublicationsCali
        | SchemaVariant::PublicationsApproved => Element::new("publications")
            .with_attr("xmlns", PUBLICATION_NS)
            .with_attr("xmlns:ns2", COMMONS_NS),
        SchemaVariant::PublicationsStaging => Element::new("publications")
            .with_attr("xmlns:xsi", XSI_NS)
            .with_attr("xsi:schemaLocation", STAGING_SCHEMA_LOCATION)
            .with_attr("xmlns:ns2", COMMONS_NS),
        SchemaVariant::UpmProjects => Element::new("upmprojects")
            .with_attr("xmlns", UPM_PROJECT_NS)
            .with_attr("xmlns:ns2", COMMONS_NS),
        SchemaVariant::PiProjects => Element::new("piprojects")
            .with_attr("xmlns", PI_PROJECT_NS)
            .with_attr("xmlns:ns2", COMMONS_NS),
    }
}

fn ns2_text(text: impl Into<String>) -> Element {
    Element::new("ns2:text").with_text(text)
}

/// `<name><ns2:text>value</ns2:text></name>`
fn wrapped(name: &str, text: impl Into<String>) -> Element {
    Element::new(name).with_child(ns2_text(text))
}

fn leaf(name: &str, text: impl Into<String>) -> Element {
    Element::new(name).with_text(text)
}

/// Text element carrying `lang` and `country` attributes.
fn localized(name: &str, text: &LocalizedText) -> Element {
    Element::new(name)
        .with_attr_opt("lang", text.language.as_ref().map(|l| l.to_string()))
        .with_attr_opt("country", text.country.clone())
        .with_text(text.text.clone())
}

/// `<term formatted="false">` with English and Spanish labels.
fn term(english: impl Into<String>, spanish: impl Into<String>) -> Element {
    Element::new("term")
        .with_attr("formatted", "false")
        .with_child(ns2_text(english))
        .with_child(ns2_text(spanish))
}

fn field_element(record: &OutputRecord, field: Field, build: impl FnOnce(&str) -> Element) -> Option<Element> {
    record.field(field).map(build)
}

fn person(person: &Person) -> Element {
    Element::new("person")
        .with_child(leaf("firstName", person.name.first_name.clone()))
        .with_child(leaf("lastName", person.name.last_name.clone()))
}

fn persons(record: &OutputRecord) -> Option<Element> {
    Element::new("persons")
        .with_children(record.persons.iter().map(|p| {
            Element::new("author")
                .with_child_opt(p.role.as_deref().map(|role| leaf("role", role)))
                .with_child(person(p))
        }))
        .non_empty()
}

fn organisations(record: &OutputRecord) -> Option<Element> {
    Element::new("organisations")
        .with_children(record.organisations.iter().map(|name| {
            Element::new("organisation").with_child(wrapped("name", name.clone()))
        }))
        .non_empty()
}

fn owner() -> Element {
    Element::new("owner").with_attr("id", OWNER_ID)
}

fn abstract_element(record: &OutputRecord) -> Option<Element> {
    record
        .abstract_text
        .as_ref()
        .map(|text| Element::new("abstract").with_child(localized("ns2:text", text)))
}

/// `publicationStatuses` with the `ns2:year/month/day` date block.
fn publication_statuses(record: &OutputRecord) -> Element {
    let date = record.publication_date.as_ref().map(|date| {
        Element::new("date")
            .with_child(leaf("ns2:year", date.year.clone()))
            .with_child(leaf("ns2:month", date.month.clone()))
            .with_child(leaf("ns2:day", date.day.clone()))
    });

    Element::new("publicationStatuses").with_child(
        Element::new("publicationStatus")
            .with_child(leaf("statusType", "published"))
            .with_child_opt(date),
    )
}

fn language(record: &OutputRecord) -> Option<Element> {
    record.language.as_deref().map(|language| leaf("language", language))
}

fn patente(record: &OutputRecord) -> Element {
    Element::new("patente")
        .with_attr("id", record.id.clone().unwrap_or_default())
        .with_attr("type", record.sub_type.clone().unwrap_or_default())
        .with_child(Element::new("title").with_child(localized("text", &record.title)))
        .with_child_opt(
            record
                .abstract_text
                .as_ref()
                .map(|text| Element::new("description").with_child(localized("text", text))),
        )
        .with_child_opt(field_element(record, Field::Jurisdiction, |v| leaf("jurisdiccion", v)))
        .with_child_opt(field_element(record, Field::ApplicationNumber, |v| {
            leaf("numeroSolicitud", v)
        }))
}

fn patent(record: &OutputRecord) -> Element {
    Element::new("patent").with_attr_opt("subType", record.sub_type.clone())
}

fn publication(record: &OutputRecord) -> Element {
    patent(record)
        .with_child(wrapped("title", record.title.text.clone()))
        .with_child_opt(organisations(record))
        .with_child(owner())
        .with_child_opt(field_element(record, Field::PatentNumber, |v| wrapped("patentNumber", v)))
        .with_child_opt(abstract_element(record))
        .with_child_opt(persons(record))
        .with_child(publication_statuses(record))
        .with_child_opt(language(record))
        .with_child_opt(field_element(record, Field::PriorityDate, |v| wrapped("priorityDate", v)))
}

fn approved_publication(record: &OutputRecord) -> Element {
    patent(record)
        .with_child(leaf("peerReviewed", "false"))
        .with_child(leaf("workflow", "approved"))
        .with_child(publication_statuses(record))
        .with_child_opt(language(record))
        .with_child(wrapped("title", record.title.text.clone()))
        .with_child_opt(abstract_element(record))
        .with_child_opt(persons(record))
        .with_child_opt(organisations(record))
        .with_child(owner())
        .with_child_opt(field_element(record, Field::PatentNumber, |v| wrapped("patentNumber", v)))
        .with_child_opt(field_element(record, Field::PriorityDate, |v| wrapped("priorityDate", v)))
}

fn formatted_name(name: &str) -> Element {
    Element::new("name")
        .with_attr("formatted", "false")
        .with_child(ns2_text(name))
}

fn staging_publication(record: &OutputRecord) -> Element {
    let abstract_text = record.abstract_text.as_ref().map(|text| {
        Element::new("abstract").with_attr("formatted", "false").with_child(
            Element::new("text")
                .with_attr_opt("locale", text.locale())
                .with_cdata(text.text.clone()),
        )
    });

    let date = record.publication_date.as_ref().map(|date| {
        Element::new("publicationDate")
            .with_child(wrapped("year", date.year.clone()))
            .with_child(wrapped("month", date.month.clone()))
            .with_child(wrapped("day", date.day.clone()))
    });
    let statuses = Element::new("publicationStatuses").with_child(
        Element::new("publicationStatus")
            .with_attr("current", "true")
            .with_child(Element::new("publicationStatus").with_child(term("Published", "Publicada")))
            .with_child_opt(date),
    );

    let units = Element::new("organisationalUnits")
        .with_children(record.organisational_units.iter().map(|name| {
            Element::new("organisationalUnit")
                .with_child(formatted_name(name))
                .with_child(Element::new("type").with_child(term("Department", "Departamento")))
        }))
        .non_empty();

    Element::new("patent")
        .with_child(
            Element::new("title")
                .with_attr("formatted", "true")
                .with_child(ns2_text(record.title.text.clone())),
        )
        .with_child(Element::new("type").with_child(term("Invention patent", "Patente de Invención")))
        .with_child(Element::new("category").with_child(term("Research", "Investigación")))
        .with_child_opt(abstract_text)
        .with_child(statuses)
        .with_child(Element::new("language").with_child(term("Spanish", "Español")))
        .with_child_opt(field_element(record, Field::Jurisdiction, |v| {
            Element::new("country").with_child(term(v, v))
        }))
        .with_child_opt(field_element(record, Field::PatentNumber, |v| wrapped("patentNumber", v)))
        .with_child_opt(persons(record))
        .with_child_opt(units)
        .with_child_opt(organisations(record))
        .with_child_opt(field_element(record, Field::Ipc, |v| wrapped("ipc", v)))
        .with_child_opt(field_element(record, Field::ProcedureStatus, |v| {
            wrapped("estadoTramite", v)
        }))
        .with_child_opt(field_element(record, Field::PriorityDate, |v| wrapped("priorityDate", v)))
        .with_child_opt(field_element(record, Field::ResearchGroup, |v| {
            Element::new("managingOrganisationalUnit").with_child(formatted_name(v))
        }))
        .with_child_opt(field_element(record, Field::Link, |v| leaf("linkConsulta", v)))
}

fn project_title(record: &OutputRecord) -> Element {
    Element::new("title").with_child(localized("ns2:text", &record.title))
}

fn project_descriptions(record: &OutputRecord) -> Option<Element> {
    record.abstract_text.as_ref().map(|text| {
        Element::new("descriptions").with_child(
            Element::new("ns2:description")
                .with_attr("type", "projectdescription")
                .with_child(localized("ns2:text", text)),
        )
    })
}

fn project_ids(id: &str) -> Element {
    Element::new("ids").with_child(
        Element::new("ns2:id")
            .with_attr("type", "siap")
            .with_text(id),
    )
}

fn upm_project(record: &OutputRecord) -> Element {
    let id = record.id.clone().unwrap_or_default();

    let participants = Element::new("internalParticipants")
        .with_children(record.participants.iter().map(|participant| {
            Element::new("internalParticipant")
                .with_child(leaf("personId", participant.person_id.clone()))
                .with_child_opt(participant.role.as_deref().map(|role| leaf("role", role)))
        }))
        .non_empty();

    Element::new("upmproject")
        .with_attr("id", id.clone())
        .with_attr("type", "research")
        .with_child(project_title(record))
        .with_child_opt(project_descriptions(record))
        .with_child(project_ids(&id))
        .with_child_opt(participants)
        .with_child_opt(field_element(record, Field::ExternalOrganisation, |v| {
            Element::new("externalOrganisations").with_child(
                Element::new("ns2:externalOrganisationAssociation")
                    .with_child(leaf("ns2:externalOrgName", v)),
            )
        }))
        .with_child_opt(field_element(record, Field::FundingOrganisation, |v| {
            Element::new("organisations")
                .with_child(Element::new("organisation").with_attr("id", v))
        }))
        .with_child_opt(field_element(record, Field::ManagingOrganisation, |v| {
            Element::new("managedByOrganisation").with_attr("id", v)
        }))
        .with_child_opt(field_element(record, Field::StartDate, |v| leaf("startDate", v)))
        .with_child_opt(field_element(record, Field::EndDate, |v| leaf("endDate", v)))
        .with_child(leaf("visibility", "Public"))
        .with_child(leaf("workflow", "validated"))
}

fn pi_project(record: &OutputRecord) -> Element {
    let id = record.id.clone().unwrap_or_default();

    Element::new("piproject")
        .with_attr("id", id.clone())
        .with_child(project_title(record))
        .with_child_opt(project_descriptions(record))
        .with_child(project_ids(&id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DateParts, LanguageCode, Participant, PersonName};
    use pretty_assertions::assert_eq;

    fn spanish(text: &str) -> LocalizedText {
        LocalizedText {
            text: text.to_string(),
            language: Some(LanguageCode::new("es")),
            country: Some("CO".to_string()),
        }
    }

    fn patent_record() -> OutputRecord {
        let mut record = OutputRecord::new();
        record.sub_type = Some("Patente - Invención".to_string());
        record.title = LocalizedText::plain("Válvula rotativa");
        record.abstract_text = Some(spanish("Una válvula"));
        record.language = Some("es_CO".to_string());
        record.organisations = vec!["Univ X".to_string(), "Univ Y".to_string()];
        record.persons = vec![Person {
            role: Some("inventor".to_string()),
            name: PersonName::from_full_name("Ana Gómez").unwrap(),
        }];
        record.publication_date = DateParts::parse("2024-08-26");
        record.fields.insert(Field::PatentNumber, "NC2019/0001".to_string());
        record
    }

    fn names(element: &Element) -> Vec<&str> {
        element.children().iter().map(Element::name).collect()
    }

    #[test]
    fn test_publication_roots_declare_namespaces() {
        let root = root(SchemaVariant::PublicationsBogota);
        assert_eq!(root.name(), "publications");
        assert_eq!(root.attribute("xmlns"), Some(PUBLICATION_NS));
        assert_eq!(root.attribute("xmlns:ns2"), Some(COMMONS_NS));

        assert!(super::root(SchemaVariant::Patentes).attributes().is_empty());
        assert_eq!(
            super::root(SchemaVariant::PublicationsStaging).attribute("xsi:schemaLocation"),
            Some(STAGING_SCHEMA_LOCATION)
        );
    }

    #[test]
    fn test_publication_element_order() {
        let element = publication(&patent_record());
        assert_eq!(element.attribute("subType"), Some("Patente - Invención"));
        assert_eq!(
            names(&element),
            vec![
                "title",
                "organisations",
                "owner",
                "patentNumber",
                "abstract",
                "persons",
                "publicationStatuses",
                "language",
            ]
        );

        let abstract_text = element.find_path("abstract/ns2:text").unwrap();
        assert_eq!(abstract_text.attribute("lang"), Some("es"));
        assert_eq!(abstract_text.attribute("country"), Some("CO"));

        let organisations = element.find("organisations").unwrap();
        assert_eq!(organisations.children().len(), 2);
        assert_eq!(
            element.find_path("publicationStatuses/publicationStatus/date/ns2:month").unwrap().text(),
            Some("08")
        );
    }

    #[test]
    fn test_missing_date_omits_the_date_block() {
        let mut record = patent_record();
        record.publication_date = None;

        let element = publication(&record);
        let status = element.find_path("publicationStatuses/publicationStatus").unwrap();
        assert_eq!(names(status), vec!["statusType"]);
    }

    #[test]
    fn test_empty_containers_are_omitted() {
        let mut record = patent_record();
        record.persons.clear();
        record.organisations.clear();

        let element = approved_publication(&record);
        assert!(element.find("persons").is_none());
        assert!(element.find("organisations").is_none());
        assert_eq!(element.find("workflow").unwrap().text(), Some("approved"));
    }

    #[test]
    fn test_staging_abstract_is_cdata_with_locale() {
        let element = staging_publication(&patent_record());
        let text = element.find_path("abstract/text").unwrap();

        assert!(text.is_cdata());
        assert_eq!(text.attribute("locale"), Some("es_CO"));
        assert_eq!(element.attribute("subType"), None);
    }

    #[test]
    fn test_patente_layout() {
        let mut record = OutputRecord::new();
        record.id = Some("12".to_string());
        record.sub_type = Some("Desconocido".to_string());
        record.title = spanish("Sensor");
        record.fields.insert(Field::Jurisdiction, "Colombia".to_string());

        let element = patente(&record);
        assert_eq!(element.attribute("id"), Some("12"));
        assert_eq!(names(&element), vec!["title", "jurisdiccion"]);
        assert_eq!(element.find_path("title/text").unwrap().attribute("country"), Some("CO"));
    }

    #[test]
    fn test_upm_project_layout() {
        let mut record = OutputRecord::new();
        record.id = Some("P1".to_string());
        record.title = LocalizedText {
            text: "Proyecto".to_string(),
            language: Some(LanguageCode::new("fr")),
            country: None,
        };
        record.participants = vec![Participant {
            person_id: "1020".to_string(),
            role: Some("InvestigadorPrincipal".to_string()),
        }];
        record.fields.insert(Field::FundingOrganisation, "PUJAV".to_string());
        record.fields.insert(Field::ManagingOrganisation, "FAC-ING".to_string());

        let element = upm_project(&record);
        assert_eq!(
            names(&element),
            vec![
                "title",
                "ids",
                "internalParticipants",
                "organisations",
                "managedByOrganisation",
                "visibility",
                "workflow",
            ]
        );

        let title = element.find_path("title/ns2:text").unwrap();
        assert_eq!(title.attribute("lang"), Some("fr"));
        assert_eq!(title.attribute("country"), None);
        assert_eq!(element.find_path("ids/ns2:id").unwrap().text(), Some("P1"));
        assert_eq!(
            element.find_path("organisations/organisation").unwrap().attribute("id"),
            Some("PUJAV")
        );
    }

    #[test]
    fn test_build_keeps_record_order() {
        let mut document = Document::new(SchemaVariant::PiProjects);
        for id in ["B", "A"] {
            let mut record = OutputRecord::new();
            record.id = Some(id.to_string());
            document.push(record);
        }

        let root = build(&document);
        let ids: Vec<_> = root.children().iter().filter_map(|c| c.attribute("id")).collect();
        assert_eq!(ids, vec!["B", "A"]);
        assert_eq!(root.attribute("xmlns"), Some(PI_PROJECT_NS));
    }
}
