use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read input file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse input file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected configuration shape at '{path}': {reason}")]
    InvalidShape { path: String, reason: String },
}

impl ConfigError {
    pub(crate) fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidShape {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
