//! Error types for rail-translate with contextual messages and exit codes
//!
//! Every translation failure is surfaced as a [`RailError`]. The translation
//! taxonomy lives in [`TranslateError`] so callers can tell a missing tool
//! apart from a tool that ran and failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for rail-translate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, missing files)
  User = 1,
  /// System error (external tool, I/O)
  System = 2,
  /// Validation failure (space mismatch, invalid config values)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for rail-translate
#[derive(Debug)]
pub enum RailError {
  /// Configuration errors
  Config(ConfigError),

  /// Translation errors
  Translate(TranslateError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl RailError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    RailError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  ///
  /// I/O errors are promoted to messages so the context is not lost.
  /// Categorized errors keep their kind untouched.
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      RailError::Message { message, context, help } => RailError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      RailError::Io(err) => RailError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      RailError::Config(ConfigError::Invalid { .. }) => ExitCode::Validation,
      RailError::Config(_) => ExitCode::User,
      RailError::Translate(TranslateError::SpaceMismatch { .. }) => ExitCode::Validation,
      RailError::Translate(_) => ExitCode::System,
      RailError::Io(_) => ExitCode::System,
      RailError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      RailError::Config(e) => e.help_message(),
      RailError::Translate(e) => e.help_message(),
      RailError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }

  /// The translation error behind this error, if any
  pub fn as_translate(&self) -> Option<&TranslateError> {
    match self {
      RailError::Translate(e) => Some(e),
      _ => None,
    }
  }
}

impl fmt::Display for RailError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RailError::Config(e) => write!(f, "{}", e),
      RailError::Translate(e) => write!(f, "{}", e),
      RailError::Io(e) => write!(f, "I/O error: {}", e),
      RailError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for RailError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      RailError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for RailError {
  fn from(err: io::Error) -> Self {
    RailError::Io(err)
  }
}

impl From<String> for RailError {
  fn from(msg: String) -> Self {
    RailError::message(msg)
  }
}

impl From<&str> for RailError {
  fn from(msg: &str) -> Self {
    RailError::message(msg)
  }
}

impl From<TranslateError> for RailError {
  fn from(err: TranslateError) -> Self {
    RailError::Translate(err)
  }
}

impl From<ConfigError> for RailError {
  fn from(err: ConfigError) -> Self {
    RailError::Config(err)
  }
}

impl From<toml_edit::de::Error> for RailError {
  fn from(err: toml_edit::de::Error) -> Self {
    RailError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<toml_edit::ser::Error> for RailError {
  fn from(err: toml_edit::ser::Error) -> Self {
    RailError::message(format!("TOML serialization error: {}", err))
  }
}

impl From<serde_json::Error> for RailError {
  fn from(err: serde_json::Error) -> Self {
    RailError::message(format!("JSON error: {}", err))
  }
}

impl From<walkdir::Error> for RailError {
  fn from(err: walkdir::Error) -> Self {
    RailError::message(format!("Directory walk error: {}", err))
  }
}

impl From<std::path::StripPrefixError> for RailError {
  fn from(err: std::path::StripPrefixError) -> Self {
    RailError::message(format!("Path strip prefix error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Explicitly requested config file does not exist
  NotFound { path: PathBuf },

  /// Config file exists but could not be parsed
  Parse { path: PathBuf, reason: String },

  /// Field present but with an unusable value
  Invalid { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NotFound { .. } => Some(
        "Omit --config to use rail.toml from the current directory, or the built-in defaults.".to_string(),
      ),
      ConfigError::Parse { .. } => Some("Run `rail-translate config` to print a valid configuration.".to_string()),
      ConfigError::Invalid { field, .. } => Some(format!(
        "Fix `{}` in rail.toml; `rail-translate config` prints the defaults.",
        field
      )),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NotFound { path } => {
        write!(f, "Configuration file not found: {}", path.display())
      }
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse config from {}\n{}", path.display(), reason)
      }
      ConfigError::Invalid { field, reason } => {
        write!(f, "Invalid config value for {}: {}", field, reason)
      }
    }
  }
}

/// Translation errors
#[derive(Debug)]
pub enum TranslateError {
  /// Driver file could not be created, written or made executable
  Setup { path: Option<PathBuf>, reason: String },

  /// Writable copy of the input codebase could not be materialized
  Copy { source: PathBuf, reason: String },

  /// External rewriting program could not be found
  ToolNotFound { program: String },

  /// External rewriting program exists but could not be started
  ToolLaunch { program: String, reason: String },

  /// External rewriting program exited unsuccessfully
  ToolFailed {
    program: String,
    /// Exit code, `None` when terminated by a signal
    status: Option<i32>,
    stdout: String,
    stderr: String,
  },

  /// Driver file could not be removed after a successful run
  Cleanup { path: PathBuf, reason: String },

  /// Input codebase is tagged with a different project space than the translator expects
  SpaceMismatch { expected: String, actual: String },
}

impl TranslateError {
  fn help_message(&self) -> Option<String> {
    match self {
      TranslateError::ToolNotFound { .. } => Some(
        "Install the rewriting tool and make sure it is on PATH. In rail.toml, `forward.interpreter` \
         names the python that runs 2to3 and `reverse.command` names the 3to2 program."
          .to_string(),
      ),
      TranslateError::ToolFailed { .. } => {
        Some("Re-run with RUST_LOG=rail_translate=debug to see the full tool invocation.".to_string())
      }
      TranslateError::Setup { .. } => Some("Check that the temp directory is writable (`temp.root` in rail.toml).".to_string()),
      TranslateError::SpaceMismatch { expected, .. } => {
        Some(format!("Pass a codebase in the `{}` project space.", expected))
      }
      _ => None,
    }
  }

  /// Whether this error came from the external rewriting program
  pub fn is_tool_error(&self) -> bool {
    matches!(
      self,
      TranslateError::ToolNotFound { .. } | TranslateError::ToolLaunch { .. } | TranslateError::ToolFailed { .. }
    )
  }
}

impl fmt::Display for TranslateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TranslateError::Setup { path, reason } => match path {
        Some(path) => write!(f, "Failed to prepare driver script {}: {}", path.display(), reason),
        None => write!(f, "Failed to prepare driver script: {}", reason),
      },
      TranslateError::Copy { source, reason } => {
        write!(f, "Failed to create writable copy of {}: {}", source.display(), reason)
      }
      TranslateError::ToolNotFound { program } => {
        write!(f, "Rewriting tool not found: {}", program)
      }
      TranslateError::ToolLaunch { program, reason } => {
        write!(f, "Failed to launch rewriting tool {}: {}", program, reason)
      }
      TranslateError::ToolFailed {
        program,
        status,
        stdout,
        stderr,
      } => {
        match status {
          Some(code) => write!(f, "Rewriting tool {} exited with status {}", program, code)?,
          None => write!(f, "Rewriting tool {} was terminated by a signal", program)?,
        }
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        } else if !stdout.trim().is_empty() {
          write!(f, "\n{}", stdout.trim_end())?;
        }
        Ok(())
      }
      TranslateError::Cleanup { path, reason } => {
        write!(f, "Failed to remove driver script {}: {}", path.display(), reason)
      }
      TranslateError::SpaceMismatch { expected, actual } => {
        write!(
          f,
          "Codebase is in project space '{}', translator expects '{}'",
          actual, expected
        )
      }
    }
  }
}

/// Result type alias for rail-translate
pub type RailResult<T> = Result<T, RailError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> RailResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<RailError>,
{
  fn context(self, ctx: impl Into<String>) -> RailResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> RailResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &RailError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}

/// Convert anyhow::Error to RailError
impl From<anyhow::Error> for RailError {
  fn from(err: anyhow::Error) -> Self {
    RailError::message(err.to_string())
  }
}
