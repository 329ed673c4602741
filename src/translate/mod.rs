//! Translators between project spaces
//!
//! A translator takes a codebase in one project space and produces a new
//! codebase in another by running an external rewriting tool over a writable
//! copy. The input codebase is never modified.
//!
//! Currently supports:
//! - Forward (python 2to3 via a generated driver script)
//! - Reverse (python 3to2 via an installed command)

use crate::core::codebase::{Codebase, ProjectSpace};
use crate::core::config::TranslateConfig;
use crate::core::context::RunContext;
use crate::core::error::{RailError, RailResult, TranslateError};
use crate::core::process::ToolCommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub mod forward;
pub mod reverse;

pub use forward::{DriverScript, ForwardTranslator};
pub use reverse::ReverseTranslator;

/// Rewrites codebases from one project space into another
pub trait Translator: Send + Sync {
  /// Project space this translator accepts
  fn from_project_space(&self) -> &ProjectSpace;

  /// Project space the translated codebase belongs to
  fn to_project_space(&self) -> &ProjectSpace;

  /// Produce a new codebase in [`Translator::to_project_space`] from `codebase`
  fn translate(&self, ctx: &RunContext, codebase: &Codebase) -> RailResult<Codebase>;
}

/// Available translator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TranslatorKind {
  /// Upcast with python 2to3
  Forward,
  /// Downcast with python 3to2
  Reverse,
}

impl TranslatorKind {
  /// Build a translator of this kind for a space pair
  pub fn build(
    self,
    from: impl Into<ProjectSpace>,
    to: impl Into<ProjectSpace>,
    config: &TranslateConfig,
  ) -> Box<dyn Translator> {
    match self {
      TranslatorKind::Forward => Box::new(ForwardTranslator::from_config(from, to, &config.forward)),
      TranslatorKind::Reverse => Box::new(ReverseTranslator::from_config(from, to, &config.reverse)),
    }
  }
}

/// Task description shown while a translation runs
pub(crate) fn task_description(from: &ProjectSpace, to: &ProjectSpace, tool: &str) -> String {
  format!("Translating from {} project space to {} (using {})", from, to, tool)
}

/// Reject codebases that are not in the translator's source space
pub(crate) fn ensure_source_space(expected: &ProjectSpace, codebase: &Codebase) -> RailResult<()> {
  if codebase.project_space() != expected {
    return Err(RailError::Translate(TranslateError::SpaceMismatch {
      expected: expected.to_string(),
      actual: codebase.project_space().to_string(),
    }));
  }
  Ok(())
}

/// Make a writable copy of `codebase` and run the tool built by `command` over its root
///
/// On success the copy is returned tagged with `to`. On failure the copy is removed;
/// a partially rewritten tree is never handed back.
pub(crate) fn rewrite_copy<F>(ctx: &RunContext, codebase: &Codebase, to: &ProjectSpace, command: F) -> RailResult<Codebase>
where
  F: FnOnce(&Path) -> ToolCommand,
{
  let copy = codebase.create_modifiable_copy(ctx.temp.as_ref())?;
  let tool = command(copy.path());

  match tool.run() {
    Ok(output) => {
      for line in output.stdout.lines().chain(output.stderr.lines()) {
        tracing::debug!(tool = %tool.program(), "{}", line);
      }
      Ok(copy.with_project_space(to.clone()))
    }
    Err(err) => {
      discard_copy(&copy);
      Err(err)
    }
  }
}

/// Best-effort removal of a copy that will not be returned
pub(crate) fn discard_copy(copy: &Codebase) {
  if let Err(e) = fs::remove_dir_all(copy.path()) {
    tracing::warn!(copy = %copy.path().display(), error = %e, "failed to remove discarded copy");
  }
}
