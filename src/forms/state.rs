use std::collections::BTreeMap;

use crate::domain::FileRef;

/// One record of form values: the whole form, or one element of a list.
pub type Record = BTreeMap<String, FieldValue>;

/// A value held by a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    File(FileRef),
    /// Positional collection (ticket types, guests).
    List(Vec<Record>),
    /// Keyed collection (category name to discount percent).
    Map(BTreeMap<String, String>),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Booleans arrive either typed or as text from prompts.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(value) => Some(*value),
            FieldValue::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Some(true),
                "false" | "no" | "n" | "0" | "" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            FieldValue::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Record]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            FieldValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(value) => value.trim().is_empty(),
            FieldValue::Bool(_) => false,
            FieldValue::File(file) => file.is_empty(),
            FieldValue::List(items) => items.is_empty(),
            FieldValue::Map(entries) => entries.is_empty(),
        }
    }

    /// Short rendering for review summaries.
    pub fn summary(&self) -> String {
        match self {
            FieldValue::Text(value) if value.trim().is_empty() => "[unfilled]".into(),
            FieldValue::Text(value) => value.clone(),
            FieldValue::Bool(true) => "yes".into(),
            FieldValue::Bool(false) => "no".into(),
            FieldValue::File(file) => format!("{} ({} bytes)", file.file_name, file.len()),
            FieldValue::List(items) => format!("{} item(s)", items.len()),
            FieldValue::Map(entries) if entries.is_empty() => "none".into(),
            FieldValue::Map(entries) => entries
                .iter()
                .map(|(key, value)| format!("{key}: {value}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        FieldValue::File(value)
    }
}

/// Builds a record from `(key, value)` pairs.
pub fn record<K, V, I>(pairs: I) -> Record
where
    K: Into<String>,
    V: Into<FieldValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}

/// Text of a record field, empty when absent or not text.
pub fn record_text<'a>(record: &'a Record, key: &str) -> &'a str {
    record
        .get(key)
        .and_then(FieldValue::as_text)
        .unwrap_or_default()
}

pub fn record_flag(record: &Record, key: &str) -> bool {
    record
        .get(key)
        .and_then(FieldValue::as_bool)
        .unwrap_or(false)
}

/// Field values owned by a single wizard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormState {
    fields: Record,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(fields: Record) -> Self {
        Self { fields }
    }

    pub fn record(&self) -> &Record {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn text(&self, key: &str) -> &str {
        record_text(&self.fields, key)
    }

    pub fn flag(&self, key: &str) -> bool {
        record_flag(&self.fields, key)
    }

    pub fn file(&self, key: &str) -> Option<&FileRef> {
        self.fields.get(key).and_then(FieldValue::as_file)
    }

    pub fn list(&self, key: &str) -> &[Record] {
        self.fields
            .get(key)
            .and_then(FieldValue::as_list)
            .unwrap_or_default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn set_list(&mut self, key: impl Into<String>, items: Vec<Record>) {
        self.fields.insert(key.into(), FieldValue::List(items));
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }
}
