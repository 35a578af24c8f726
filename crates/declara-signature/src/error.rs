use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("signature serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
