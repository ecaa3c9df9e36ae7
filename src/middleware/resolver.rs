//! The boundary between variable declarations and concrete values.
//!
//! Interactive prompting lives outside this crate; anything that can turn
//! declarations into values implements [`VariableResolver`].

use log::warn;

use super::{Declarations, MiddlewareError, VariableKind, Variables};

/// Produces a value for every declared variable.
///
/// Implementations return [`MiddlewareError::SelectionCancelled`] when the
/// user aborts, so a partial configuration is never written.
pub trait VariableResolver {
    fn resolve(&mut self, declarations: &Declarations) -> Result<Variables, MiddlewareError>;
}

impl<F> VariableResolver for F
where
    F: FnMut(&Declarations) -> Result<Variables, MiddlewareError>,
{
    fn resolve(&mut self, declarations: &Declarations) -> Result<Variables, MiddlewareError> {
        self(declarations)
    }
}

/// Non-interactive resolver: explicit overrides first, then declared defaults.
///
/// Values are checked against their declaration and path values are
/// normalized.
#[derive(Debug, Clone, Default)]
pub struct DefaultResolver {
    overrides: Variables,
}

impl DefaultResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(name.into(), value.into());
        self
    }

    pub fn with_overrides<I, K, V>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.overrides
            .extend(overrides.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

impl VariableResolver for DefaultResolver {
    fn resolve(&mut self, declarations: &Declarations) -> Result<Variables, MiddlewareError> {
        for name in self.overrides.keys() {
            if !declarations.contains_key(name) {
                warn!("ignoring value for undeclared variable '{name}'");
            }
        }

        let mut resolved = Variables::new();
        for (name, decl) in declarations {
            let raw = self
                .overrides
                .get(name)
                .cloned()
                .or_else(|| decl.kind.default_value())
                .ok_or_else(|| MiddlewareError::MissingVariable(name.clone()))?;

            resolved.insert(name.clone(), check_value(name, &decl.kind, raw)?);
        }
        Ok(resolved)
    }
}

fn check_value(name: &str, kind: &VariableKind, raw: String) -> Result<String, MiddlewareError> {
    let invalid = |reason: String| MiddlewareError::InvalidVariable {
        name: name.to_string(),
        reason,
    };

    match kind {
        VariableKind::Choice { choices, .. } => {
            if choices.iter().any(|choice| *choice == raw) {
                Ok(raw)
            } else {
                Err(invalid(format!(
                    "'{raw}' is not one of: {}",
                    choices.join(", ")
                )))
            }
        }
        VariableKind::Number { min, max, .. } => {
            let trimmed = raw.trim();
            let number = parse_number(trimmed)
                .ok_or_else(|| invalid(format!("'{raw}' is not a number")))?;
            if let Some(min) = min.filter(|min| number < *min) {
                return Err(invalid(format!("{number} is below the minimum of {min}")));
            }
            if let Some(max) = max.filter(|max| number > *max) {
                return Err(invalid(format!("{number} is above the maximum of {max}")));
            }
            Ok(trimmed.to_string())
        }
        VariableKind::Path { .. } => Ok(normalize_path(&raw)),
    }
}

fn parse_number(s: &str) -> Option<f64> {
    if looks_like_integer(s) {
        return s.parse::<i64>().ok().map(|i| i as f64);
    }
    if s.contains('.') {
        return s.parse::<f64>().ok().filter(|f| f.is_finite());
    }
    None
}

fn looks_like_integer(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Uses forward slashes and drops a leading `./`.
pub fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/");
    match path.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}
