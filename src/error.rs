use std::path::PathBuf;

use crate::config::ConfigError;
use crate::middleware::MiddlewareError;
use thiserror::Error;

/// Top-level error type for the ext-settings library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("middleware error: {0}")]
    Middleware(#[from] MiddlewareError),

    #[error("failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
}
