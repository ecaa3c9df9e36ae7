//! Split/flat classification and ingest of the nested structure.
//!
//! A configuration is *flat* when at least one of its top-level keys is a
//! canonical section name, and *split* otherwise, in which case every
//! top-level key names a sub-configuration (usually a target or device)
//! holding its own sections. The decision is made once here, at ingest;
//! everything downstream matches on [`Config`].

use log::debug;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{CanonicalSection, ConfigError, Section, Sections, Table};

/// Result of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Flat,
    Split,
}

/// Classifies a configuration by its top-level keys.
///
/// An empty key set is `Split`; both shapes encode it to nothing.
pub fn classify<'a>(keys: impl IntoIterator<Item = &'a str>) -> Shape {
    if keys.into_iter().any(CanonicalSection::is_canonical) {
        Shape::Flat
    } else {
        Shape::Split
    }
}

/// A typed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Config {
    /// Sections directly at the top level.
    Flat(Sections),
    /// Named sub-configurations, each with its own sections.
    Split(Table<Sections>),
}

impl Config {
    /// A flat configuration with the three canonical sections, all empty.
    pub fn empty_flat() -> Self {
        Config::Flat(
            CanonicalSection::ALL
                .into_iter()
                .map(|section| (section.name(), Section::new()))
                .collect(),
        )
    }

    pub fn shape(&self) -> Shape {
        match self {
            Config::Flat(_) => Shape::Flat,
            Config::Split(_) => Shape::Split,
        }
    }

    /// Ingests a nested value, classifying it and checking its shape.
    ///
    /// Section values that are not lists are dropped: only lists have a
    /// representation in the flat format. List elements must be strings.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        match value {
            Value::Object(map) => Self::from_map(map),
            other => Err(ConfigError::shape(
                "$",
                format!("expected an object, found {}", kind(other)),
            )),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        match classify(map.keys().map(String::as_str)) {
            Shape::Flat => ingest_sections("", map).map(Config::Flat),
            Shape::Split => ingest_configs(map).map(Config::Split),
        }
    }

    /// Ingests the output of the flat-text decoder.
    ///
    /// Decoded text says what it is through its headers: `[Section]` yields
    /// an object of lists and `[Config:Section]` an object of objects. The
    /// shape is taken from that structure instead of from the key names, so
    /// a file holding only custom sections still reads as flat. No headers
    /// at all is an empty flat configuration.
    pub fn from_decoded(map: &Map<String, Value>) -> Result<Self, ConfigError> {
        let nested = map.values().filter(|value| is_sub_configuration(value)).count();
        if nested == 0 {
            ingest_sections("", map).map(Config::Flat)
        } else if nested == map.len() {
            ingest_configs(map).map(Config::Split)
        } else {
            Err(ConfigError::shape(
                "$",
                "mixes [Section] and [Config:Section] headers",
            ))
        }
    }

    /// True when no section holds any entry.
    pub fn is_blank(&self) -> bool {
        match self {
            Config::Flat(sections) => sections.iter().all(|(_, section)| section.is_empty()),
            Config::Split(configs) => configs.is_empty(),
        }
    }

    /// The nested JSON form of this configuration.
    pub fn to_value(&self) -> Result<Value, ConfigError> {
        Ok(serde_json::to_value(self)?)
    }
}

fn ingest_configs(map: &Map<String, Value>) -> Result<Table<Sections>, ConfigError> {
    let mut configs = Table::new();
    for (config_name, value) in map {
        let sections = value.as_object().ok_or_else(|| {
            ConfigError::shape(
                config_name.as_str(),
                format!("expected a sub-configuration object, found {}", kind(value)),
            )
        })?;
        configs.insert(config_name.as_str(), ingest_sections(config_name, sections)?);
    }
    Ok(configs)
}

/// A non-empty object whose every value is itself an object.
fn is_sub_configuration(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| !map.is_empty() && map.values().all(Value::is_object))
}

fn ingest_sections(prefix: &str, map: &Map<String, Value>) -> Result<Sections, ConfigError> {
    let mut sections = Sections::new();
    for (name, value) in map {
        let path = join_path(prefix, name);
        let entries = value.as_object().ok_or_else(|| {
            ConfigError::shape(
                path.as_str(),
                format!("expected a section object, found {}", kind(value)),
            )
        })?;
        sections.insert(name.as_str(), ingest_section(&path, entries)?);
    }
    Ok(sections)
}

fn ingest_section(path: &str, map: &Map<String, Value>) -> Result<Section, ConfigError> {
    let mut section = Section::new();
    for (key, value) in map {
        let Value::Array(items) = value else {
            debug!("dropping non-list value at '{}'", join_path(path, key));
            continue;
        };

        let values = items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ConfigError::shape(
                        join_path(path, key),
                        format!("list elements must be strings, found {}", kind(item)),
                    )
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        section.insert(key.as_str(), values);
    }
    Ok(section)
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
