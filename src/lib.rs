//! Conversion between JSON project configuration and the flat
//! `.extSettings` format, plus merging of middleware fragments.

pub mod codec;
pub mod config;
mod error;
pub mod files;
pub mod middleware;

pub use codec::{decode, encode, generate, parse};
pub use config::{CanonicalSection, Config, ConfigError, Shape};
pub use error::Error;
pub use middleware::{apply_middleware, MiddlewareError};
