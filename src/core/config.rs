use crate::core::error::{ConfigError, RailError, RailResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for rail-translate
/// Searched in order: rail.toml, .rail.toml, .cargo/rail.toml, .config/rail.toml
///
/// Every section is optional; a workspace without any config file runs on defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateConfig {
  #[serde(default)]
  pub forward: ForwardConfig,
  #[serde(default)]
  pub reverse: ReverseConfig,
  #[serde(default)]
  pub temp: TempConfig,
}

/// Driver settings for the 2to3 (forward) translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardConfig {
  /// Interpreter named in the driver's shebang (resolved through `env`)
  #[serde(default = "default_interpreter")]
  pub interpreter: String,

  /// Fixer package handed to `lib2to3.main.main`
  #[serde(default = "default_fixer_package")]
  pub fixer_package: String,
}

fn default_interpreter() -> String {
  "python3".to_string()
}

fn default_fixer_package() -> String {
  "lib2to3.fixes".to_string()
}

impl Default for ForwardConfig {
  fn default() -> Self {
    Self {
      interpreter: default_interpreter(),
      fixer_package: default_fixer_package(),
    }
  }
}

/// Command settings for the 3to2 (reverse) translator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseConfig {
  /// Program name (looked up on PATH) or path of the rewriting tool
  #[serde(default = "default_reverse_command")]
  pub command: String,
}

fn default_reverse_command() -> String {
  "3to2".to_string()
}

impl Default for ReverseConfig {
  fn default() -> Self {
    Self {
      command: default_reverse_command(),
    }
  }
}

/// Process-wide temp root settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempConfig {
  /// Parent directory for the per-run temp root (default: system temp dir)
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub root: Option<PathBuf>,

  /// Name prefix of the per-run temp root
  #[serde(default = "default_temp_prefix")]
  pub prefix: String,
}

fn default_temp_prefix() -> String {
  "rail-translate-".to_string()
}

impl Default for TempConfig {
  fn default() -> Self {
    Self {
      root: None,
      prefix: default_temp_prefix(),
    }
  }
}

impl TranslateConfig {
  /// Find config file in search order: rail.toml, .rail.toml, .cargo/rail.toml, .config/rail.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = [
      path.join("rail.toml"),
      path.join(".rail.toml"),
      path.join(".cargo").join("rail.toml"),
      path.join(".config").join("rail.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from the first rail.toml found under `path`, or defaults if there is none
  pub fn discover(path: &Path) -> RailResult<Self> {
    match Self::find_config_path(path) {
      Some(config_path) => Self::load_file(&config_path),
      None => {
        tracing::debug!(dir = %path.display(), "no rail.toml found, using defaults");
        Ok(Self::default())
      }
    }
  }

  /// Load config from an explicit file
  pub fn load_file(config_path: &Path) -> RailResult<Self> {
    if !config_path.is_file() {
      return Err(RailError::Config(ConfigError::NotFound {
        path: config_path.to_path_buf(),
      }));
    }

    let content = fs::read_to_string(config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| match e {
      RailError::Config(inner) => RailError::Config(inner),
      other => RailError::Config(ConfigError::Parse {
        path: config_path.to_path_buf(),
        reason: other.to_string(),
      }),
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Parse and validate config from TOML text
  pub fn parse(content: &str) -> RailResult<Self> {
    let config: TranslateConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Render the config as TOML
  pub fn to_toml(&self) -> RailResult<String> {
    Ok(toml_edit::ser::to_string_pretty(self)?)
  }

  /// Validate configuration values
  pub fn validate(&self) -> RailResult<()> {
    let required = [
      ("forward.interpreter", &self.forward.interpreter),
      ("forward.fixer_package", &self.forward.fixer_package),
      ("reverse.command", &self.reverse.command),
      ("temp.prefix", &self.temp.prefix),
    ];

    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(RailError::Config(ConfigError::Invalid {
          field: field.to_string(),
          reason: "must not be empty".to_string(),
        }));
      }
    }

    if self.forward.interpreter.chars().any(char::is_whitespace) {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "forward.interpreter".to_string(),
        reason: format!("'{}' must be a single program name", self.forward.interpreter),
      }));
    }

    // Pasted into a python string literal by the driver
    let is_module_path = self
      .forward
      .fixer_package
      .split('.')
      .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    if !is_module_path {
      return Err(RailError::Config(ConfigError::Invalid {
        field: "forward.fixer_package".to_string(),
        reason: format!("'{}' is not a dotted python module path", self.forward.fixer_package),
      }));
    }

    Ok(())
  }
}
