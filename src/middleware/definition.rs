//! Middleware definitions: versions, variants, and variable declarations.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

use super::MiddlewareError;

/// Declared variables of a variant, by name.
pub type Declarations = BTreeMap<String, VariableDecl>;

/// A reusable configuration fragment with its versions and variants.
///
/// ```json
/// {
///   "name": "FreeRTOS",
///   "versions": [{
///     "version": "10.4.6",
///     "variants": [{
///       "name": "CM4F",
///       "config": {
///         "Groups": {"Middlewares/FreeRTOS": ["{root}/tasks.c"]},
///         "Others": {"Define": ["configTOTAL_HEAP_SIZE={heap}"]}
///       },
///       "variables": {
///         "root": {"type": "path", "default": "./Middlewares/FreeRTOS"},
///         "heap": {"type": "number", "default": 16384, "min": 1024}
///       }
///     }]
///   }]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MiddlewareDefinition {
    /// Defaults to the definition file's stem when loaded from disk.
    #[serde(default)]
    pub name: String,
    pub versions: Vec<MiddlewareVersion>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MiddlewareVersion {
    pub version: String,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Variant {
    pub name: String,
    /// Fragment with `{variable}` placeholders.
    #[serde(default)]
    pub config: Map<String, Value>,
    #[serde(default)]
    pub variables: Declarations,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VariableDecl {
    #[serde(flatten)]
    pub kind: VariableKind,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VariableKind {
    /// One of a fixed set of strings.
    Choice {
        choices: Vec<String>,
        #[serde(default)]
        default: Option<String>,
    },
    /// A number, optionally bounded.
    Number {
        #[serde(default)]
        default: Option<f64>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    /// A file system path, normalized before use.
    Path {
        #[serde(default)]
        default: Option<String>,
    },
}

impl VariableKind {
    /// The declared default, as it would be substituted.
    pub fn default_value(&self) -> Option<String> {
        match self {
            VariableKind::Choice { default, .. } | VariableKind::Path { default } => {
                default.clone()
            }
            VariableKind::Number { default, .. } => default.map(|n| n.to_string()),
        }
    }
}

/// Picks one variant out of a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantSelector {
    /// Exact version label; `None` takes the first version offering the variant.
    pub version: Option<String>,
    /// Variant name, matched case-insensitively.
    pub variant: String,
}

impl VariantSelector {
    pub fn new(variant: impl Into<String>) -> Self {
        Self {
            version: None,
            variant: variant.into(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

impl MiddlewareDefinition {
    pub fn version(&self, label: &str) -> Option<&MiddlewareVersion> {
        self.versions.iter().find(|v| v.version == label)
    }

    /// Resolves a selector to a version and one of its variants.
    pub fn select(
        &self,
        selector: &VariantSelector,
    ) -> Result<(&MiddlewareVersion, &Variant), MiddlewareError> {
        let variant_not_found = || MiddlewareError::VariantNotFound {
            middleware: self.name.clone(),
            variant: selector.variant.clone(),
        };

        match &selector.version {
            Some(label) => {
                let version = self
                    .version(label)
                    .ok_or_else(|| MiddlewareError::VersionNotFound {
                        middleware: self.name.clone(),
                        version: label.clone(),
                    })?;
                let variant = version.variant(&selector.variant).ok_or_else(variant_not_found)?;
                Ok((version, variant))
            }
            None => self
                .versions
                .iter()
                .find_map(|version| {
                    version
                        .variant(&selector.variant)
                        .map(|variant| (version, variant))
                })
                .ok_or_else(variant_not_found),
        }
    }
}

impl MiddlewareVersion {
    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|variant| variant.name.eq_ignore_ascii_case(name))
    }
}
