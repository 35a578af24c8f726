use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("artifact store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("sidecar serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
