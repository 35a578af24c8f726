use thiserror::Error;

/// Raised while loading a form specification. Fatal for the session that
/// attempted the load — no partial engine state survives it.
#[derive(Debug, Error)]
pub enum SpecLoadError {
    #[error("specification is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("specification is missing required key '{0}'")]
    MissingKey(&'static str),

    #[error("field '{field_id}' has unrecognized type '{field_type}'")]
    UnknownFieldType { field_id: String, field_type: String },

    #[error("duplicate field id '{0}'")]
    DuplicateFieldId(String),

    #[error("field '{field_id}' has show_if referencing unknown field '{reference}'")]
    UnknownShowIfReference { field_id: String, reference: String },
}
