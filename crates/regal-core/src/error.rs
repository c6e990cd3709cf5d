use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RegalError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("failed to load parser config from {path}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error("invalid parser config: {0}")]
    ConfigInvalid(String),

    #[error("unrecognised view payload: {0}")]
    ViewPayload(String),

    #[error("processing job failed: {0}")]
    JobFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
