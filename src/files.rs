//! File-level entry points: read input, convert or merge, write output.
//!
//! Nothing is written when a fatal error happens before encoding.

use std::path::Path;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::codec::{decode, encode};
use crate::config::{load_config_file, read_input, ConfigError};
use crate::middleware::{
    fragment_from_config, merge_into, MiddlewareMerge, MiddlewareRegistry, VariableResolver,
    VariantSelector,
};
use crate::Error;

/// Converts a JSON configuration file into a flat `.extSettings` file.
pub fn generate_file(json_path: impl AsRef<Path>, out_path: impl AsRef<Path>) -> Result<(), Error> {
    let config = load_config_file(json_path)?;
    debug!("input classified as {:?}", config.shape());
    write_output(out_path.as_ref(), &encode(&config))
}

/// Converts a JSON configuration file into a flat `.extSettings` file after
/// merging additional JSON fragments into it, in order.
///
/// Each addition is a flat fragment (`{"ProjectFiles": {...}}`); only its
/// canonical sections are merged. `target` names the sub-configuration of a
/// split input that receives them.
pub fn generate_merged_file<P: AsRef<Path>>(
    json_path: impl AsRef<Path>,
    additions: &[P],
    target: Option<&str>,
    out_path: impl AsRef<Path>,
) -> Result<(), Error> {
    let mut config = load_config_file(json_path)?;
    for addition in additions {
        let addition = addition.as_ref();
        let fragment = fragment_from_config(
            load_config_file(addition)?,
            &addition.display().to_string(),
        )?;
        debug!("merging {} into the input", addition.display());
        config = merge_into(config, target, fragment)?;
    }
    write_output(out_path.as_ref(), &encode(&config))
}

/// Reads a flat `.extSettings` file into the nested structure.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Map<String, Value>, Error> {
    let text = read_input(path.as_ref())?;
    Ok(decode(&text))
}

/// Reads a flat file and renders it as pretty-printed JSON.
pub fn parse_file_to_json(path: impl AsRef<Path>) -> Result<String, Error> {
    let doc = parse_file(path)?;
    serde_json::to_string_pretty(&doc).map_err(|e| Error::Config(ConfigError::Json(e)))
}

/// Merges the named middleware into the flat file at `out_path`.
///
/// A missing or unreadable output file is merged as if it were empty.
/// `target` names the sub-configuration of a split file to merge into.
pub fn apply_middleware_file(
    registry: &MiddlewareRegistry,
    name: &str,
    out_path: impl AsRef<Path>,
    selector: &VariantSelector,
    target: Option<&str>,
    resolver: &mut dyn VariableResolver,
) -> Result<(), Error> {
    let out_path = out_path.as_ref();
    let definition = registry.get(name)?;

    let mut merge = MiddlewareMerge::new(definition).selector(selector.clone());
    if let Some(text) = read_existing(out_path) {
        merge = merge.existing(text);
    }
    if let Some(target) = target {
        merge = merge.target(target);
    }
    let text = merge.apply(resolver)?;

    write_output(out_path, &text)?;
    info!("merged {} into {}", definition.name, out_path.display());
    Ok(())
}

fn read_existing(path: &Path) -> Option<String> {
    match read_input(path) {
        Ok(text) => Some(text),
        Err(ConfigError::FileNotFound(_)) => {
            warn!("{} does not exist; merging into an empty configuration", path.display());
            None
        }
        Err(e) => {
            warn!("{e}; merging into an empty configuration");
            None
        }
    }
}

pub fn write_output(path: &Path, contents: &str) -> Result<(), Error> {
    std::fs::write(path, contents).map_err(|e| Error::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}
