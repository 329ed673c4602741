//! Reverse translation: python 3to2 through an installed command

use crate::core::codebase::{Codebase, ProjectSpace};
use crate::core::config::ReverseConfig;
use crate::core::context::RunContext;
use crate::core::error::RailResult;
use crate::core::process::ToolCommand;
use crate::translate::{Translator, ensure_source_space, rewrite_copy, task_description};

const TOOL_LABEL: &str = "python 3to2";

/// Arguments passed to the command before the codebase root
pub const COMMAND_ARGS: [&str; 2] = ["--write", "--nobackups"];

/// Translator that downcasts a codebase with python 3to2
///
/// The command is resolved on PATH when it is a bare name.
#[derive(Debug, Clone)]
pub struct ReverseTranslator {
  from: ProjectSpace,
  to: ProjectSpace,
  command: String,
}

impl ReverseTranslator {
  /// Translator running the default `3to2` command
  pub fn new(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>) -> Self {
    Self::from_config(from, to, &ReverseConfig::default())
  }

  /// Translator running the `[reverse]` command
  pub fn from_config(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>, config: &ReverseConfig) -> Self {
    Self::with_command(from, to, config.command.clone())
  }

  pub fn with_command(from: impl Into<ProjectSpace>, to: impl Into<ProjectSpace>, command: impl Into<String>) -> Self {
    Self {
      from: from.into(),
      to: to.into(),
      command: command.into(),
    }
  }

  pub fn command(&self) -> &str {
    &self.command
  }
}

impl Translator for ReverseTranslator {
  fn from_project_space(&self) -> &ProjectSpace {
    &self.from
  }

  fn to_project_space(&self) -> &ProjectSpace {
    &self.to
  }

  fn translate(&self, ctx: &RunContext, codebase: &Codebase) -> RailResult<Codebase> {
    ensure_source_space(&self.from, codebase)?;

    let task = ctx.begin_immediate_task("translate", &task_description(&self.from, &self.to, TOOL_LABEL));
    let translated = rewrite_copy(ctx, codebase, &self.to, |root| {
      ToolCommand::new(&self.command).args(COMMAND_ARGS).arg(root)
    })?;

    task.finish();
    Ok(translated)
  }
}
