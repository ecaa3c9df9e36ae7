//! The flat `.extSettings` text format.
//!
//! ```text
//! [ProjectFiles]
//! HeaderPath=../../Inc;../../Another/Path;
//!
//! [Groups]
//! Doc=$PROJ_DIR$/../readme.txt;
//! ```
//!
//! Split configurations prefix each header with the sub-configuration name,
//! as in `[Cortex_M4:Groups]`.

mod decode;
mod encode;

pub use decode::decode;
pub use encode::encode;

use serde_json::{Map, Value};

use crate::config::{Config, ConfigError};

/// Ingests a nested structure and encodes it to flat text.
pub fn generate(input: &Value) -> Result<String, ConfigError> {
    Ok(encode(&Config::from_value(input)?))
}

/// Decodes flat text into the nested structure.
pub fn parse(text: &str) -> Map<String, Value> {
    decode(text)
}

/// Decodes flat text straight into a typed configuration, taking the shape
/// from the header structure (see [`Config::from_decoded`]).
pub fn decode_config(text: &str) -> Result<Config, ConfigError> {
    Config::from_decoded(&decode(text))
}
