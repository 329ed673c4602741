//! Codebases and the project spaces they belong to
//!
//! A [`Codebase`] is a directory tree plus the [`ProjectSpace`] it is valid in.
//! Codebases are treated as values: translation never touches the tree it was
//! given, it works on a modifiable copy allocated in the run's temp root.

use crate::core::error::{RailError, RailResult, ResultExt, TranslateError};
use crate::core::temp::TempAllocator;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Name of one variant of a codebase (e.g. "internal", "public")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectSpace(String);

impl ProjectSpace {
  pub fn new(name: impl Into<String>) -> Self {
    Self(name.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ProjectSpace {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for ProjectSpace {
  fn from(name: &str) -> Self {
    Self::new(name)
  }
}

impl From<String> for ProjectSpace {
  fn from(name: String) -> Self {
    Self(name)
  }
}

/// Content digest of a codebase tree (SHA256 over sorted paths and file bytes)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fingerprint(String);

impl Fingerprint {
  /// Get the short form (first 12 characters)
  pub fn short(&self) -> &str {
    self.0.get(..12).unwrap_or(self.0.as_str())
  }
}

impl fmt::Display for Fingerprint {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A directory tree tagged with the project space it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codebase {
  root: PathBuf,
  project_space: ProjectSpace,
}

/// Kind of entry found while walking a codebase
enum Entry {
  Dir(PathBuf),
  File(PathBuf),
  Symlink(PathBuf),
}

impl Codebase {
  pub fn new(root: impl Into<PathBuf>, project_space: impl Into<ProjectSpace>) -> Self {
    Self {
      root: root.into(),
      project_space: project_space.into(),
    }
  }

  /// Filesystem root of the tree
  pub fn path(&self) -> &Path {
    &self.root
  }

  pub fn project_space(&self) -> &ProjectSpace {
    &self.project_space
  }

  /// Same tree, tagged with another project space
  pub fn with_project_space(self, project_space: impl Into<ProjectSpace>) -> Self {
    Self {
      root: self.root,
      project_space: project_space.into(),
    }
  }

  /// Relative paths of all regular files, sorted
  pub fn files(&self) -> RailResult<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = self
      .entries()?
      .into_iter()
      .filter_map(|entry| match entry {
        Entry::File(rel) => Some(rel),
        _ => None,
      })
      .collect();
    files.sort();
    Ok(files)
  }

  /// Create an independent, writable copy of this codebase in fresh temp storage
  ///
  /// The copy keeps this codebase's project space; the caller retags it.
  pub fn create_modifiable_copy(&self, temp: &dyn TempAllocator) -> RailResult<Codebase> {
    let copy_err = |reason: String| {
      RailError::Translate(TranslateError::Copy {
        source: self.root.clone(),
        reason,
      })
    };

    if !self.root.is_dir() {
      return Err(copy_err("not a directory".to_string()));
    }

    let dest = temp
      .allocate_dir("codebase-")
      .map_err(|e| copy_err(format!("cannot allocate temp directory: {}", e)))?;

    self.copy_tree(&dest).map_err(|e| {
      // Don't leave a half-populated copy behind
      let _ = fs::remove_dir_all(&dest);
      copy_err(e.to_string())
    })?;

    tracing::debug!(
      source = %self.root.display(),
      copy = %dest.display(),
      space = %self.project_space,
      "created modifiable copy"
    );

    Ok(Codebase {
      root: dest,
      project_space: self.project_space.clone(),
    })
  }

  /// Export the tree into `dest`, which must not exist or be empty
  pub fn copy_to(&self, dest: &Path) -> RailResult<()> {
    ensure_empty_destination(dest)?;
    fs::create_dir_all(dest).with_context(|| format!("Failed to create {}", dest.display()))?;
    self.copy_tree(dest)
  }

  /// SHA256 over every relative path and file content in the tree
  pub fn fingerprint(&self) -> RailResult<Fingerprint> {
    let mut entries: Vec<(PathBuf, Vec<u8>)> = self
      .entries()?
      .into_par_iter()
      .filter_map(|entry| match entry {
        Entry::Dir(_) => None,
        Entry::File(rel) => Some(fs::read(self.root.join(&rel)).map(|bytes| (rel, bytes))),
        Entry::Symlink(rel) => Some(
          fs::read_link(self.root.join(&rel)).map(|target| (rel, target.to_string_lossy().into_owned().into_bytes())),
        ),
      })
      .collect::<std::io::Result<Vec<_>>>()
      .with_context(|| format!("Failed to read codebase at {}", self.root.display()))?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (rel, bytes) in &entries {
      hasher.update(rel.to_string_lossy().as_bytes());
      hasher.update([0u8]);
      hasher.update((bytes.len() as u64).to_le_bytes());
      hasher.update(bytes);
    }
    Ok(Fingerprint(format!("{:x}", hasher.finalize())))
  }

  fn entries(&self) -> RailResult<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(&self.root).min_depth(1).follow_links(false) {
      let entry = entry?;
      let rel = entry.path().strip_prefix(&self.root)?.to_path_buf();
      let file_type = entry.file_type();
      if file_type.is_dir() {
        entries.push(Entry::Dir(rel));
      } else if file_type.is_symlink() {
        entries.push(Entry::Symlink(rel));
      } else if file_type.is_file() {
        entries.push(Entry::File(rel));
      } else {
        // FIFOs, sockets and devices are not source; copying them can block
        tracing::warn!(path = %entry.path().display(), "skipping special file");
      }
    }
    Ok(entries)
  }

  fn copy_tree(&self, dest: &Path) -> RailResult<()> {
    let entries = self.entries()?;

    // Directories first (walk order is parent-before-child), files in parallel after
    for entry in &entries {
      if let Entry::Dir(rel) = entry {
        let target = dest.join(rel);
        fs::create_dir_all(&target).with_context(|| format!("Failed to create {}", target.display()))?;
      }
    }

    entries.par_iter().try_for_each(|entry| -> RailResult<()> {
      match entry {
        Entry::Dir(_) => Ok(()),
        Entry::File(rel) => {
          let (from, to) = (self.root.join(rel), dest.join(rel));
          fs::copy(&from, &to)
            .map(|_| ())
            .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))
        }
        Entry::Symlink(rel) => copy_symlink(&self.root.join(rel), &dest.join(rel)),
      }
    })
  }
}

/// Fail unless `dest` is missing or an empty directory
pub fn ensure_empty_destination(dest: &Path) -> RailResult<()> {
  if !dest.exists() {
    return Ok(());
  }
  let mut contents = fs::read_dir(dest).with_context(|| format!("Failed to read {}", dest.display()))?;
  if contents.next().is_some() {
    return Err(RailError::with_help(
      format!("Output directory is not empty: {}", dest.display()),
      "Choose a new --output directory or remove the existing one.",
    ));
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> RailResult<()> {
  let target = fs::read_link(from).with_context(|| format!("Failed to read link {}", from.display()))?;
  std::os::unix::fs::symlink(&target, to).with_context(|| format!("Failed to create link {}", to.display()))
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> RailResult<()> {
  // No portable symlink creation; copy what the link points at
  if from.is_dir() {
    return Ok(());
  }
  fs::copy(from, to)
    .map(|_| ())
    .with_context(|| format!("Failed to copy {} to {}", from.display(), to.display()))
}
