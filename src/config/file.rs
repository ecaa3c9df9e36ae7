//! Reading configuration input from disk.

use std::path::Path;

use serde_json::Value;

use super::{Config, ConfigError};

/// Reads an input file to a string.
///
/// A missing file is reported as [`ConfigError::FileNotFound`], any other
/// failure (including invalid UTF-8) as [`ConfigError::ReadError`].
pub fn read_input(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::FileNotFound(path.to_path_buf())
        } else {
            ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Loads and parses a JSON input file.
pub fn load_json_file(path: &Path) -> Result<Value, ConfigError> {
    let contents = read_input(path)?;
    serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Loads a JSON input file and ingests it as a [`Config`].
pub fn load_config_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let value = load_json_file(path.as_ref())?;
    Config::from_value(&value)
}
