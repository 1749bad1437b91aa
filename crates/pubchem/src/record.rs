//! PUG View record tree wire model.
//!
//! A record is a recursively nested tree of named sections. Every section may hold child
//! sections and a list of `Information` leaves; a leaf carries an optional name and a value
//! whose shape varies (marked-up strings, numbers, tables, external links, ...). Only the
//! string-bearing shape is modelled here; every other shape deserializes to an empty value.
//!
//! Unknown keys are ignored and absent collections default to empty.

use serde::Deserialize;

/// Top-level `{"Record": {...}}` envelope returned by the record view service.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RecordEnvelope {
    #[serde(rename = "Record")]
    pub record: Record,
}

/// A compound or substance record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    #[serde(default)]
    pub record_type: Option<String>,

    #[serde(default)]
    pub record_number: Option<u64>,

    /// Preferred display name of the record.
    #[serde(default)]
    pub record_title: Option<String>,

    #[serde(default)]
    pub section: Vec<Section>,
}

/// A named node of the record tree.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Section {
    #[serde(rename = "TOCHeading", default)]
    pub toc_heading: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub section: Vec<Section>,

    #[serde(default)]
    pub information: Vec<Information>,
}

/// A leaf entry of a section.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Information {
    #[serde(default)]
    pub reference_number: Option<u64>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub value: InformationValue,
}

/// Value of a leaf entry.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct InformationValue {
    #[serde(default)]
    pub string_with_markup: Vec<StringWithMarkup>,

    #[serde(default)]
    pub number: Vec<f64>,

    #[serde(default)]
    pub unit: Option<String>,
}

/// A plain string, optionally annotated with markup (links, styling) which is ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StringWithMarkup {
    #[serde(default)]
    pub string: String,
}

impl Record {
    /// Walk a path of section headings from the top of the record.
    ///
    /// At each level the first child whose heading matches is followed. Returns `None` as soon
    /// as a heading is absent; an empty path also yields `None`.
    pub fn section_at(&self, path: &[&str]) -> Option<&Section> {
        let (first, rest) = path.split_first()?;
        let top = find_child(&self.section, first)?;
        top.descend(rest)
    }
}

impl Section {
    /// First direct child with the given heading.
    pub fn child(&self, heading: &str) -> Option<&Section> {
        find_child(&self.section, heading)
    }

    /// Follow `path` below this section; an empty path returns `self`.
    pub fn descend(&self, path: &[&str]) -> Option<&Section> {
        path.iter()
            .try_fold(self, |section, heading| section.child(heading))
    }

    /// First leaf entry carrying a non-empty string value.
    pub fn first_string_entry(&self) -> Option<&Information> {
        self.information
            .iter()
            .find(|info| info.first_string().is_some())
    }
}

impl Information {
    /// First non-empty string of the value, trimmed.
    pub fn first_string(&self) -> Option<&str> {
        self.strings().next()
    }

    /// All non-empty strings of the value in document order, trimmed.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.value
            .string_with_markup
            .iter()
            .map(|s| s.string.trim())
            .filter(|s| !s.is_empty())
    }
}

fn find_child<'a>(sections: &'a [Section], heading: &str) -> Option<&'a Section> {
    sections.iter().find(|s| s.toc_heading == heading)
}
