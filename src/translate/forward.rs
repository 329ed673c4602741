//! Forward translation: python 2to3 through a generated driver script
//!
//! Each call writes a small launcher into the run's temp root, marks it
//! executable and runs it against a writable copy of the codebase:
//!
//! ```text
//! <driver> --write --nobackups --verbose <copy-root>
//! ```
//!
//! The driver is a `tempfile::TempPath`, so it is removed on every exit path.
//! After a successful run it is removed explicitly to surface cleanup errors.

use crate::core::codebase::{Codebase, ProjectSpace};
use crate::core::config::ForwardConfig;
use crate::core::context::RunContext;
use crate::core::error::{RailError, RailResult, TranslateError};
use crate::core::process::ToolCommand;
use crate::core::temp::TempAllocator;
use crate::translate::{Translator, discard_copy, ensure_source_space, rewrite_copy, task_description};
use std::fs;
use std::path::Path;
use tempfile::TempPath;

/// File name prefix of generated drivers inside the temp root
pub const DRIVER_PREFIX: &str = "rail-2to3-driver-";

const TOOL_LABEL: &str = "python 2to3";

/// Arguments passed to the driver before the codebase root
pub const DRIVER_ARGS: [&str; 3] = ["--write", "--nobackups", "--verbose"];

/// Body of the launcher that runs the rewriting tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverScript {
  body: String,
}

impl DriverScript {
  /// Launcher for `lib2to3.main.main` that exits with its status
  pub fn two_to_three(config: &ForwardConfig) -> Self {
    Self {
      body: format!(
        "#!/usr/bin/env {}\nimport sys\nfrom lib2to3.main import main\n\nsys.exit(main(\"{}\"))\n",
        config.interpreter, config.fixer_package
      ),
    }
  }

  /// Launcher with an arbitrary body (must start with a shebang to be executable)
  pub fn custom(body: impl Into<String>) -> Self {
    Self { body: body.into() }
  }

  pub fn body(&self) -> &str {
    &self.body
  }

  /// Write the driver into the temp root and make it executable
  ///
  /// Nothing is left behind on failure: the partially written file is removed
  /// when the `TempPath` drops.
  fn install(&self, temp: &dyn TempAllocator) -> RailResult<TempPath> {
    let driver = temp.allocate_file(DRIVER_PREFIX).map_err(|e| {
      RailError::Translate(TranslateError::Setup {
        path: None,
        reason: format!("cannot allocate driver in {}: {}", temp.root().display(), e),
      })
    })?;

    let setup_err = |stage: &str, e: std::io::Error| {
      RailError::Translate(TranslateError::Setup {
        path: Some(driver.to_path_buf()),
        reason: format!("{}: {}", stage, e),
      })
    };

    fs::write(&driver, &self.body).map_err(|e| setup_err("cannot write driver", e))?;
    set_executable(&driver).map_err(|e| setup_err("cannot mark driver executable", e))?;

    tracing::debug!(driver = %driver.display(), "installed driver script");
    Ok(driver)
  }
}

/// Delete the driver; one that is already gone counts as removed
fn remove_driver(driver: TempPath) -> std::io::Result<()> {
  match driver.close() {
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
    other => other,
  }
}

#[cfg(unix)]
fn set_executable(path: &Path) -> std::io::Result<()> {
  use std::os::unix::fs::PermissionsExt;
  fs::set_permissions(path, fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn set_executable(path: &Path) -> std::io::Result<()> {
  // Executability is decided by extension/association; just make sure the file is there
  fs::metadata(path).map(|_| ())
}

/// Translator that upcasts a codebase with python 2to3
#[derive(Debug, Clone)]
pub struct ForwardTranslator {
  from: ProjectSpace,
  to: ProjectSpace,
  driver: DriverScript,
}

impl ForwardTranslator {
  /// Translator using the default 2to3 driver
  pub fn new(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>) -> Self {
    Self::from_config(from, to, &ForwardConfig::default())
  }

  /// Translator using the `[forward]` settings for its driver
  pub fn from_config(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>, config: &ForwardConfig) -> Self {
    Self::with_driver(from, to, DriverScript::two_to_three(config))
  }

  /// Translator running a custom driver script
  pub fn with_driver(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>, driver: DriverScript) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      driver,
    }
  }

  pub fn driver(&self) -> &DriverScript {
    &self.driver
  }
}

impl Translator for ForwardTranslator {
  fn from_project_space(&self) -> &ProjectSpace {
    &self.from
  }

  fn to_project_space(&self) -> &ProjectSpace {
    &self.to
  }

  fn translate(&self, ctx: &RunContext, codebase: &Codebase) -> RailResult<Codebase> {
    ensure_source_space(&self.from, codebase)?;

    let driver = self.driver.install(ctx.temp.as_ref())?;
    let task = ctx.begin_immediate_task("translate", &task_description(&self.from, &self.to, TOOL_LABEL));

    let result = rewrite_copy(ctx, codebase, &self.to, |root| {
      ToolCommand::new(&*driver).args(DRIVER_ARGS).arg(root)
    });

    let driver_path = driver.to_path_buf();
    let removed = remove_driver(driver);

    // A rewriting failure wins over a cleanup failure
    let translated = match result {
      Ok(translated) => translated,
      Err(err) => {
        if let Err(e) = removed {
          tracing::warn!(driver = %driver_path.display(), error = %e, "failed to remove driver script");
        }
        return Err(err);
      }
    };

    if let Err(e) = removed {
      discard_copy(&translated);
      return Err(RailError::Translate(TranslateError::Cleanup {
        path: driver_path,
        reason: e.to_string(),
      }));
    }

    task.finish();
    Ok(translated)
  }
}
