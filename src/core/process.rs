//! External tool invocation
//!
//! Rewriting tools are untrusted: only their exit status decides success.
//! Output is captured so failures can be reported with diagnostics.

use crate::core::error::{RailError, RailResult, TranslateError};
use std::ffi::{OsStr, OsString};
use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Spawn attempts when the executable is still held open for writing elsewhere
const SPAWN_ATTEMPTS: u32 = 5;

#[cfg(any(target_os = "linux", target_os = "macos"))]
const ETXTBSY: i32 = 26;

/// Captured output of a successful tool run
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
  pub stdout: String,
  pub stderr: String,
}

/// A rewriting tool invocation: program plus arguments
#[derive(Debug, Clone)]
pub struct ToolCommand {
  program: OsString,
  args: Vec<OsString>,
}

impl ToolCommand {
  pub fn new(program: impl AsRef<OsStr>) -> Self {
    Self {
      program: program.as_ref().to_os_string(),
      args: Vec::new(),
    }
  }

  pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
    self.args.push(arg.as_ref().to_os_string());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
  {
    self.args.extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
    self
  }

  /// Program name as shown in errors
  pub fn program(&self) -> String {
    self.program.to_string_lossy().into_owned()
  }

  /// Full command line as shown in logs
  pub fn display(&self) -> String {
    std::iter::once(&self.program)
      .chain(self.args.iter())
      .map(|a| a.to_string_lossy())
      .collect::<Vec<_>>()
      .join(" ")
  }

  /// Run to completion, failing on a missing program or non-zero exit
  pub fn run(&self) -> RailResult<ToolOutput> {
    tracing::debug!(command = %self.display(), "running rewriting tool");

    let output = self.spawn_with_retry().map_err(|err| {
      let program = self.program();
      if err.kind() == io::ErrorKind::NotFound {
        RailError::Translate(TranslateError::ToolNotFound { program })
      } else {
        RailError::Translate(TranslateError::ToolLaunch {
          program,
          reason: err.to_string(),
        })
      }
    })?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
      tracing::debug!(command = %self.display(), status = ?output.status.code(), "rewriting tool failed");
      return Err(RailError::Translate(TranslateError::ToolFailed {
        program: self.program(),
        status: output.status.code(),
        stdout,
        stderr,
      }));
    }

    tracing::debug!(command = %self.display(), stdout_bytes = stdout.len(), "rewriting tool finished");
    Ok(ToolOutput { stdout, stderr })
  }

  fn command(&self) -> Command {
    let mut cmd = Command::new(&self.program);
    cmd.args(&self.args);
    cmd.stdin(Stdio::null());
    cmd
  }

  fn spawn_with_retry(&self) -> io::Result<std::process::Output> {
    retry_while_busy(|| self.command().output())
  }
}

/// Retry `spawn` while it fails with "text file busy", up to [`SPAWN_ATTEMPTS`] tries
fn retry_while_busy<T>(mut spawn: impl FnMut() -> io::Result<T>) -> io::Result<T> {
  let mut attempt = 1;
  loop {
    match spawn() {
      Err(err) if is_text_file_busy(&err) && attempt < SPAWN_ATTEMPTS => {
        // A freshly written executable can still be open in a concurrently forked child
        tracing::debug!(attempt, "executable busy, retrying");
        std::thread::sleep(Duration::from_millis(20 * u64::from(attempt)));
        attempt += 1;
      }
      result => return result,
    }
  }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn is_text_file_busy(err: &io::Error) -> bool {
  err.raw_os_error() == Some(ETXTBSY)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn is_text_file_busy(_err: &io::Error) -> bool {
  false
}
