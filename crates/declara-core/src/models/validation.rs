use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-field validation findings, keyed by field id. Findings are data, not
/// errors — validation never aborts.
pub type ValidationReport = BTreeMap<String, Vec<ValidationError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorKind {
    MissingRequired,
    Contraindication,
    ConsentRequired,
}

/// One validation finding on one field. A field may carry zero, one, or
/// several of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub field_id: String,
    pub kind: ValidationErrorKind,
    pub message: String,
}

impl ValidationError {
    pub fn new(field_id: impl Into<String>, kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            field_id: field_id.into(),
            kind,
            message: message.into(),
        }
    }
}
