//! Lookup of middleware definitions by name.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;

use super::{MiddlewareDefinition, MiddlewareError};

/// Middleware definitions keyed by case-insensitive name.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareRegistry {
    definitions: BTreeMap<String, MiddlewareDefinition>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under its `name`, replacing any earlier one.
    pub fn insert(&mut self, definition: MiddlewareDefinition) {
        self.definitions
            .insert(definition.name.to_lowercase(), definition);
    }

    pub fn get(&self, name: &str) -> Result<&MiddlewareDefinition, MiddlewareError> {
        self.definitions
            .get(&name.to_lowercase())
            .ok_or_else(|| MiddlewareError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.values().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Loads every `*.json` and `*.toml` definition in a directory.
    ///
    /// Other files are skipped. A definition without a `name` is named after
    /// its file stem.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, MiddlewareError> {
        let dir = dir.as_ref();
        let read_error = |e| MiddlewareError::DefinitionRead {
            path: dir.to_path_buf(),
            source: e,
        };

        let mut paths = std::fs::read_dir(dir)
            .map_err(read_error)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(read_error)?;
        paths.sort();

        let mut registry = Self::new();
        for path in paths {
            if !path.is_file() || definition_format(&path).is_none() {
                debug!("skipping {}", path.display());
                continue;
            }
            registry.insert(load_definition(&path)?);
        }
        Ok(registry)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn definition_format(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        ext if ext.eq_ignore_ascii_case("json") => Some(Format::Json),
        ext if ext.eq_ignore_ascii_case("toml") => Some(Format::Toml),
        _ => None,
    }
}

/// Loads a single JSON or TOML definition file.
pub fn load_definition(path: &Path) -> Result<MiddlewareDefinition, MiddlewareError> {
    let contents = std::fs::read_to_string(path).map_err(|e| MiddlewareError::DefinitionRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut definition: MiddlewareDefinition = match definition_format(path) {
        Some(Format::Toml) => toml::from_str(&contents).map_err(|e| {
            MiddlewareError::DefinitionParseToml {
                path: path.to_path_buf(),
                source: e,
            }
        })?,
        _ => serde_json::from_str(&contents).map_err(|e| MiddlewareError::DefinitionParse {
            path: path.to_path_buf(),
            source: e,
        })?,
    };

    if definition.name.is_empty() {
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            definition.name = stem.to_string();
        }
    }
    debug!(
        "loaded middleware '{}' ({} versions) from {}",
        definition.name,
        definition.versions.len(),
        path.display()
    );
    Ok(definition)
}
