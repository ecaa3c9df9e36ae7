use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MiddlewareError {
    #[error("no definition found for middleware '{0}'")]
    NotFound(String),

    #[error("middleware '{middleware}' has no version '{version}'")]
    VersionNotFound { middleware: String, version: String },

    #[error("middleware '{middleware}' has no variant '{variant}'")]
    VariantNotFound { middleware: String, variant: String },

    #[error("variant or variable selection was cancelled")]
    SelectionCancelled,

    #[error("no value given for variable '{0}' and it has no default")]
    MissingVariable(String),

    #[error("invalid value for variable '{name}': {reason}")]
    InvalidVariable { name: String, reason: String },

    #[error("failed to read middleware definitions at '{path}': {source}")]
    DefinitionRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse middleware definition '{path}': {source}")]
    DefinitionParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to parse middleware definition '{path}': {source}")]
    DefinitionParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid middleware fragment: {0}")]
    InvalidFragment(#[source] ConfigError),

    #[error("configuration is split into {0}; choose one of them as the merge target")]
    TargetRequired(String),

    #[error("cannot merge into sub-configuration '{0}' of a flat configuration")]
    TargetOnFlat(String),

    #[error("existing configuration cannot be merged into: {0}")]
    InvalidExisting(#[source] ConfigError),
}
