//! CLI commands for rail-translate
//!
//! - **translate**: Translate a source tree into another project space
//! - **config**: Print the effective configuration

pub mod config;
pub mod translate;

pub use config::run_config;
pub use translate::run_translate;

use rail_translate::core::config::TranslateConfig;
use rail_translate::core::error::RailResult;
use std::env;
use std::path::Path;

/// Load an explicit config file, or search rail.toml from the current directory
fn load_config(path: Option<&Path>) -> RailResult<TranslateConfig> {
  match path {
    Some(path) => TranslateConfig::load_file(path),
    None => TranslateConfig::discover(&env::current_dir()?),
  }
}
