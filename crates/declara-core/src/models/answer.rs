use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single answer, typed to match the declaring field.
///
/// Untagged: variant order matters for deserialization — booleans and
/// integers must be tried before strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Flag(bool),
    Integer(i64),
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    /// Whether this answer counts as "not given": empty string, empty list,
    /// or an unticked checkbox. Numbers are always considered answered.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::List(items) => items.is_empty(),
            AnswerValue::Flag(ticked) => !ticked,
            AnswerValue::Integer(_) => false,
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Flag(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Integer(value)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(items: Vec<&str>) -> Self {
        AnswerValue::List(items.into_iter().map(str::to_string).collect())
    }
}

/// Metadata attached to an answer set when a submission is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub submission_time: jiff::Timestamp,
    pub form_version: String,
    pub validation_passed: bool,
}

/// The live mapping of field id → answer. Mutated by the renderer in
/// response to user input; read-only to the validator and composer.
///
/// Serializes with answers at the top level and the finalization metadata
/// under the reserved `_metadata` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerSet {
    #[serde(rename = "_metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<SubmissionMetadata>,

    #[serde(flatten)]
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_id: &str) -> Option<&AnswerValue> {
        self.values.get(field_id)
    }

    pub fn insert(&mut self, field_id: impl Into<String>, value: impl Into<AnswerValue>) {
        self.values.insert(field_id.into(), value.into());
    }

    pub fn remove(&mut self, field_id: &str) -> Option<AnswerValue> {
        self.values.remove(field_id)
    }

    pub fn contains(&self, field_id: &str) -> bool {
        self.values.contains_key(field_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn metadata(&self) -> Option<&SubmissionMetadata> {
        self.metadata.as_ref()
    }

    pub fn set_metadata(&mut self, metadata: SubmissionMetadata) {
        self.metadata = Some(metadata);
    }
}
