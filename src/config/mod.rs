//! Configuration model: ordered tables, canonical sections, and the
//! split/flat classifier.

mod error;
mod file;
mod section;
mod shape;
mod table;

pub use error::ConfigError;
pub use file::{load_config_file, load_json_file, read_input};
pub use section::{terminator_for, CanonicalSection, Section, Sections, Terminator};
pub use shape::{classify, Config, Shape};
pub use table::Table;
