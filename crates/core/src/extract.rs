//! Field extraction from record trees.
//!
//! The fields pulled out of a record are described by [`FIELD_RULES`], a table of
//! `(target field, section path, pick)` entries evaluated by one generic walker. A change in
//! the service's section layout is a change to this table, not to control flow.
//!
//! Missing sections are not errors: a rule whose path does not resolve, or whose pick finds
//! nothing, contributes no field and never blocks the other rules.

use crate::constants::HAZARD_STATEMENT_SEPARATOR;
use drugchem_pubchem::{record_page_url, Record, Section};
use drugchem_types::{ExternalId, RecordKind};

/// Field holding the record title.
pub const NAME_FIELD: &str = "generic_name";

/// Field holding the record web page.
pub const URL_FIELD: &str = "url";

/// How a value is taken from the section a rule points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pick {
    /// First string of the first string-bearing entry.
    FirstString,
    /// Name of the first string-bearing entry.
    FirstEntryName,
    /// Every string of every entry with this name, joined by `separator`.
    JoinNamed {
        name: &'static str,
        separator: &'static str,
    },
}

/// One row of the extraction table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub path: &'static [&'static str],
    pub pick: Pick,
}

/// The extraction table, in output column order.
pub const FIELD_RULES: &[FieldRule] = &[
    FieldRule {
        field: "cas_no",
        path: &["Names and Identifiers", "Other Identifiers", "CAS"],
        pick: Pick::FirstString,
    },
    FieldRule {
        field: "unii_no",
        path: &["Names and Identifiers", "Other Identifiers", "UNII"],
        pick: Pick::FirstString,
    },
    FieldRule {
        field: "indication",
        path: &["Drug and Medication Information", "Drug Indication"],
        pick: Pick::FirstString,
    },
    FieldRule {
        field: "pharm_class",
        path: &[
            "Pharmacology and Biochemistry",
            "MeSH Pharmacological Classification",
        ],
        pick: Pick::FirstEntryName,
    },
    FieldRule {
        field: "pharm_desc",
        path: &[
            "Pharmacology and Biochemistry",
            "MeSH Pharmacological Classification",
        ],
        pick: Pick::FirstString,
    },
    FieldRule {
        field: "hazard_statements",
        path: &[
            "Safety and Hazards",
            "Hazards Identification",
            "GHS Classification",
        ],
        pick: Pick::JoinNamed {
            name: "GHS Hazard Statements",
            separator: HAZARD_STATEMENT_SEPARATOR,
        },
    },
];

/// Ordered flat mapping of extracted field → value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedFields {
    entries: Vec<(&'static str, String)>,
}

impl ExtractedFields {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.entries.iter().map(|(f, v)| (*f, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a value; blank values are dropped and a repeated field keeps its first value.
    fn insert(&mut self, field: &'static str, value: &str) {
        let value = value.trim();
        if value.is_empty() || self.get(field).is_some() {
            return;
        }
        self.entries.push((field, value.to_owned()));
    }
}

/// Extract [`FIELD_RULES`] plus the record title and page URL.
///
/// # Arguments
///
/// * `record` - The fetched record tree.
/// * `kind` - Collection the record belongs to; used for the page URL.
/// * `id` - Identifier the record was fetched with; used for the page URL.
pub fn extract_fields(record: &Record, kind: RecordKind, id: ExternalId) -> ExtractedFields {
    let mut fields = ExtractedFields::default();

    if let Some(title) = record.record_title.as_deref() {
        fields.insert(NAME_FIELD, title);
    }
    fields.insert(URL_FIELD, &record_page_url(kind, id));

    for rule in FIELD_RULES {
        let Some(section) = record.section_at(rule.path) else {
            continue;
        };
        if let Some(value) = apply_pick(section, rule.pick) {
            fields.insert(rule.field, &value);
        }
    }

    fields
}

fn apply_pick(section: &Section, pick: Pick) -> Option<String> {
    match pick {
        Pick::FirstString => section
            .first_string_entry()
            .and_then(|info| info.first_string())
            .map(str::to_owned),
        Pick::FirstEntryName => section
            .first_string_entry()
            .and_then(|info| info.name.clone()),
        Pick::JoinNamed { name, separator } => {
            let parts: Vec<&str> = section
                .information
                .iter()
                .filter(|info| info.name.as_deref() == Some(name))
                .flat_map(|info| info.strings())
                .collect();
            (!parts.is_empty()).then(|| parts.join(separator))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn string_value(s: &str) -> serde_json::Value {
        json!({"StringWithMarkup": [{"String": s}]})
    }

    fn full_record() -> Record {
        serde_json::from_value(json!({
            "RecordType": "CID",
            "RecordNumber": 2244,
            "RecordTitle": "Aspirin",
            "Section": [
                {
                    "TOCHeading": "Names and Identifiers",
                    "Section": [{
                        "TOCHeading": "Other Identifiers",
                        "Section": [
                            {"TOCHeading": "CAS", "Information": [
                                {"Value": string_value("50-78-2")},
                                {"Value": string_value("11126-35-5")}
                            ]},
                            {"TOCHeading": "UNII", "Information": [
                                {"Value": string_value("R16CO5Y76E")}
                            ]}
                        ]
                    }]
                },
                {
                    "TOCHeading": "Drug and Medication Information",
                    "Section": [{
                        "TOCHeading": "Drug Indication",
                        "Information": [{"Value": string_value("For the temporary relief of pain.")}]
                    }]
                },
                {
                    "TOCHeading": "Pharmacology and Biochemistry",
                    "Section": [{
                        "TOCHeading": "MeSH Pharmacological Classification",
                        "Information": [
                            {"Name": "Fibrinolytic Agents", "Value": string_value("Fibrinolysin or agents that convert plasminogen to fibrinolysin.")},
                            {"Name": "Anti-Inflammatory Agents, Non-Steroidal", "Value": string_value("Anti-inflammatory agents that are non-steroidal in nature.")}
                        ]
                    }]
                },
                {
                    "TOCHeading": "Safety and Hazards",
                    "Section": [{
                        "TOCHeading": "Hazards Identification",
                        "Section": [{
                            "TOCHeading": "GHS Classification",
                            "Information": [
                                {"Name": "Pictogram(s)", "Value": string_value("Irritant")},
                                {"Name": "GHS Hazard Statements", "Value": {"StringWithMarkup": [
                                    {"String": "H302: Harmful if swallowed [Warning Acute toxicity, oral]"},
                                    {"String": "H315: Causes skin irritation [Warning Skin corrosion/irritation]"}
                                ]}},
                                {"Name": "GHS Hazard Statements", "Value": string_value("H319: Causes serious eye irritation")}
                            ]
                        }]
                    }]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_extracts_every_field() {
        let fields = extract_fields(&full_record(), RecordKind::Compound, ExternalId::new(2244));

        assert_eq!(fields.get("generic_name"), Some("Aspirin"));
        assert_eq!(
            fields.get("url"),
            Some("https://pubchem.ncbi.nlm.nih.gov/compound/2244")
        );
        assert_eq!(fields.get("cas_no"), Some("50-78-2"));
        assert_eq!(fields.get("unii_no"), Some("R16CO5Y76E"));
        assert_eq!(
            fields.get("indication"),
            Some("For the temporary relief of pain.")
        );
        assert_eq!(fields.get("pharm_class"), Some("Fibrinolytic Agents"));
        assert_eq!(
            fields.get("pharm_desc"),
            Some("Fibrinolysin or agents that convert plasminogen to fibrinolysin.")
        );
        assert_eq!(
            fields.get("hazard_statements"),
            Some(
                "H302: Harmful if swallowed [Warning Acute toxicity, oral]; \
                 H315: Causes skin irritation [Warning Skin corrosion/irritation]; \
                 H319: Causes serious eye irritation"
            )
        );
    }

    #[test]
    fn test_field_order_follows_rule_table() {
        let fields = extract_fields(&full_record(), RecordKind::Compound, ExternalId::new(2244));
        let order: Vec<&str> = fields.iter().map(|(f, _)| f).collect();
        assert_eq!(
            order,
            vec![
                "generic_name",
                "url",
                "cas_no",
                "unii_no",
                "indication",
                "pharm_class",
                "pharm_desc",
                "hazard_statements"
            ]
        );
    }

    #[test]
    fn test_missing_section_omits_only_that_field() {
        let mut record = full_record();
        record
            .section
            .retain(|s| s.toc_heading != "Drug and Medication Information");

        let fields = extract_fields(&record, RecordKind::Compound, ExternalId::new(2244));
        assert_eq!(fields.get("indication"), None);
        assert_eq!(fields.get("cas_no"), Some("50-78-2"));
        assert_eq!(fields.get("pharm_class"), Some("Fibrinolytic Agents"));
        assert!(fields.get("hazard_statements").is_some());
    }

    #[test]
    fn test_empty_record_yields_url_only() {
        let record = Record::default();
        let fields = extract_fields(&record, RecordKind::Substance, ExternalId::new(4594));
        assert_eq!(fields.len(), 1);
        assert_eq!(
            fields.get("url"),
            Some("https://pubchem.ncbi.nlm.nih.gov/substance/4594")
        );
    }

    #[test]
    fn test_first_string_skips_non_string_entries() {
        let record: Record = serde_json::from_value(json!({
            "RecordTitle": "Example",
            "Section": [{
                "TOCHeading": "Pharmacology and Biochemistry",
                "Section": [{
                    "TOCHeading": "MeSH Pharmacological Classification",
                    "Information": [
                        {"Name": "Count", "Value": {"Number": [3]}},
                        {"Name": "Analgesics", "Value": string_value("Compounds that relieve pain.")}
                    ]
                }]
            }]
        }))
        .unwrap();

        let fields = extract_fields(&record, RecordKind::Compound, ExternalId::new(1));
        assert_eq!(fields.get("pharm_class"), Some("Analgesics"));
        assert_eq!(fields.get("pharm_desc"), Some("Compounds that relieve pain."));
    }

    #[test]
    fn test_ghs_section_without_statements_is_omitted() {
        let record: Record = serde_json::from_value(json!({
            "Section": [{
                "TOCHeading": "Safety and Hazards",
                "Section": [{
                    "TOCHeading": "Hazards Identification",
                    "Section": [{
                        "TOCHeading": "GHS Classification",
                        "Information": [{"Name": "Signal", "Value": string_value("Warning")}]
                    }]
                }]
            }]
        }))
        .unwrap();

        let fields = extract_fields(&record, RecordKind::Compound, ExternalId::new(1));
        assert_eq!(fields.get("hazard_statements"), None);
        assert_eq!(fields.get("generic_name"), None);
    }

    #[test]
    fn test_rule_paths_are_non_empty() {
        for rule in FIELD_RULES {
            assert!(!rule.path.is_empty(), "{} has an empty path", rule.field);
        }
    }
}
