//! Process-wide temporary storage
//!
//! A single [`TempRoot`] is created per run. Driver scripts and writable
//! codebase copies are allocated underneath it; everything left behind is
//! removed when the root is dropped at the end of the run.

use crate::core::config::TempConfig;
use crate::core::error::{RailResult, ResultExt};
use std::io;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, TempPath};

/// Allocation of uniquely named temp files and directories
pub trait TempAllocator: Send + Sync {
  /// Root directory all allocations live under
  fn root(&self) -> &Path;

  /// Create a new empty file; it is deleted when the returned path is dropped or closed
  fn allocate_file(&self, prefix: &str) -> io::Result<TempPath>;

  /// Create a new empty directory that lives as long as the temp root
  fn allocate_dir(&self, prefix: &str) -> io::Result<PathBuf>;
}

/// Temp root backed by a `tempfile::TempDir`
#[derive(Debug)]
pub struct TempRoot {
  dir: TempDir,
}

impl TempRoot {
  /// Create a fresh temp root under the system temp directory
  pub fn new() -> RailResult<Self> {
    Self::from_config(&TempConfig::default())
  }

  /// Create a fresh temp root according to `[temp]` settings
  pub fn from_config(config: &TempConfig) -> RailResult<Self> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(&config.prefix);

    let dir = match &config.root {
      Some(parent) => builder
        .tempdir_in(parent)
        .with_context(|| format!("Failed to create temp root under {}", parent.display()))?,
      None => builder.tempdir().context("Failed to create temp root")?,
    };

    tracing::debug!(root = %dir.path().display(), "created temp root");
    Ok(Self { dir })
  }

  /// Path of the temp root
  pub fn path(&self) -> &Path {
    self.dir.path()
  }
}

impl TempAllocator for TempRoot {
  fn root(&self) -> &Path {
    self.dir.path()
  }

  fn allocate_file(&self, prefix: &str) -> io::Result<TempPath> {
    let file = tempfile::Builder::new().prefix(prefix).tempfile_in(self.dir.path())?;
    Ok(file.into_temp_path())
  }

  fn allocate_dir(&self, prefix: &str) -> io::Result<PathBuf> {
    let dir = tempfile::Builder::new().prefix(prefix).tempdir_in(self.dir.path())?;
    Ok(dir.keep())
  }
}
