use rail_translate::core::error::RailResult;
use std::path::PathBuf;

/// Run the config command
pub fn run_config(config: Option<PathBuf>) -> RailResult<()> {
  let config = super::load_config(config.as_deref())?;
  print!("{}", config.to_toml()?);
  Ok(())
}
