//! Run context - build once, pass everywhere
//!
//! # Design
//!
//! RunContext carries the process-wide resources a translation needs: the temp
//! root that driver scripts and codebase copies are allocated in, and the task
//! reporter progress goes to. The outer pipeline builds it once and passes it by
//! reference to every translator call; translators never reach for globals.
//!
//! ```text
//! main.rs / pipeline:
//!   RunContext::build(&config, reporter) -> RunContext
//!   |
//!   v
//! translate/forward.rs, reverse.rs:
//!   fn translate(&self, ctx: &RunContext, codebase: &Codebase)
//! ```

use crate::core::config::TranslateConfig;
use crate::core::error::RailResult;
use crate::core::temp::{TempAllocator, TempRoot};
use crate::ui::progress::{self, Task, TaskReporter};
use std::sync::Arc;

/// Shared resources for one translation run.
///
/// Cloning is cheap; clones share the same temp root and reporter.
#[derive(Clone)]
pub struct RunContext {
  /// Temp storage for driver scripts and writable copies
  pub temp: Arc<dyn TempAllocator>,

  /// Where task progress is reported
  pub reporter: Arc<dyn TaskReporter>,
}

impl RunContext {
  pub fn new(temp: Arc<dyn TempAllocator>, reporter: Arc<dyn TaskReporter>) -> Self {
    Self { temp, reporter }
  }

  /// Build a context with a fresh temp root per `[temp]` settings
  pub fn build(config: &TranslateConfig, reporter: Arc<dyn TaskReporter>) -> RailResult<Self> {
    let temp = Arc::new(TempRoot::from_config(&config.temp)?);
    Ok(Self::new(temp, reporter))
  }

  /// Begin a task that is reported as failed unless finished before it drops
  pub fn begin_immediate_task(&self, name: &str, description: &str) -> Task {
    progress::begin_immediate_task(&self.reporter, name, description)
  }
}
