use log::trace;
use serde_json::{Map, Value};

/// Decodes the flat sectioned text format into the nested structure.
///
/// Parsing is lenient: blank lines are skipped, and lines that are neither
/// a header nor a `key=value` pair are ignored, as are pairs that appear
/// before the first header. A header of the form `[Config:Section]` nests
/// the section under its sub-configuration; `[Section]` places it at the
/// top level.
pub fn decode(text: &str) -> Map<String, Value> {
    let mut root = Map::new();
    let mut current: Option<(Option<&str>, &str)> = None;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(path) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let target = match path.split_once(':') {
                Some((config_name, section_name)) => (Some(config_name), section_name),
                None => (None, path),
            };
            section_mut(&mut root, target);
            current = Some(target);
            continue;
        }

        if let Some((key, value)) = line.split_once('=') {
            let Some(target) = current else {
                trace!("line {}: key/value pair outside of a section", index + 1);
                continue;
            };
            section_mut(&mut root, target).insert(key.to_string(), split_values(value));
            continue;
        }

        trace!("line {}: skipping unrecognised line", index + 1);
    }

    root
}

/// Splits a value list, dropping one trailing `;` and any empty fragments.
fn split_values(value: &str) -> Value {
    let value = value.strip_suffix(';').unwrap_or(value);
    Value::Array(
        value
            .split(';')
            .filter(|fragment| !fragment.is_empty())
            .map(|fragment| Value::String(fragment.to_string()))
            .collect(),
    )
}

fn section_mut<'a>(
    root: &'a mut Map<String, Value>,
    (config_name, section_name): (Option<&str>, &str),
) -> &'a mut Map<String, Value> {
    match config_name {
        Some(config_name) => object_entry(object_entry(root, config_name), section_name),
        None => object_entry(root, section_name),
    }
}

/// Returns the object stored under `key`, replacing any non-object value.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> &'a mut Map<String, Value> {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    slot.as_object_mut().expect("slot was just made an object")
}
