pub mod inspect;
pub mod parse;
pub mod select;
pub mod view;

use regal_core::config::{load_config, ParserConfig};
use regal_core::error::RegalError;
use std::path::Path;

/// Parser config from the given file, or the built-in defaults.
fn resolve_config(path: Option<&Path>) -> Result<ParserConfig, RegalError> {
    match path {
        Some(p) => load_config(p),
        None => Ok(ParserConfig::default()),
    }
}
