//! Tests for the forward (2to3) translator

#![cfg(unix)]

use crate::helpers::*;
use anyhow::Result;
use rail_translate::core::context::RunContext;
use rail_translate::core::error::{RailError, TranslateError};
use rail_translate::translate::forward::DRIVER_PREFIX;
use rail_translate::translate::{DriverScript, ForwardTranslator, Translator};
use rail_translate::ui::{TaskOutcome, TaskReporter};
use std::sync::Arc;
use tempfile::TempDir;

fn translator_with(script: String) -> ForwardTranslator {
  ForwardTranslator::with_driver("internal", "public", DriverScript::custom(script))
}

#[test]
fn test_forward_rewrites_copy_and_leaves_input() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let logs = TempDir::new()?;
  let args_log = logs.path().join("args.log");
  let run = TestRun::new()?;

  let input = tree.codebase("internal");
  let before = input.fingerprint()?;

  let translator = translator_with(rewriting_script(&args_log));
  let output = translator.translate(&run.ctx, &input)?;

  // New codebase, new place, new space
  assert_ne!(output.path(), input.path());
  assert!(output.path().starts_with(run.temp.path()));
  assert_eq!(output.project_space().as_str(), "public");
  assert_eq!(std::fs::read_to_string(output.path().join("foo.py"))?, PY3_SOURCE);

  // Input untouched
  assert_eq!(input.project_space().as_str(), "internal");
  assert_eq!(input.fingerprint()?, before);
  assert_eq!(tree.read_file("foo.py")?, PY2_SOURCE);

  // Driver invoked with the rewrite flags against the copy
  assert_eq!(
    read_args(&args_log)?,
    vec![
      "--write".to_string(),
      "--nobackups".to_string(),
      "--verbose".to_string(),
      output.path().display().to_string(),
    ]
  );

  // Driver gone, task closed as succeeded
  assert!(run.temp_entries(DRIVER_PREFIX)?.is_empty());
  let tasks = run.tasks.records();
  assert_eq!(tasks.len(), 1);
  assert_eq!(tasks[0].name, "translate");
  assert_eq!(
    tasks[0].description,
    "Translating from internal project space to public (using python 2to3)"
  );
  assert_eq!(tasks[0].outcome, Some(TaskOutcome::Succeeded));

  Ok(())
}

#[test]
fn test_forward_tool_failure_surfaces_and_cleans_up() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let logs = TempDir::new()?;
  let run = TestRun::new()?;
  let input = tree.codebase("internal");
  let before = input.fingerprint()?;

  let translator = translator_with(failing_script(&logs.path().join("args.log"), 3));
  let err = translator.translate(&run.ctx, &input).unwrap_err();

  match err {
    RailError::Translate(TranslateError::ToolFailed { status, stderr, .. }) => {
      assert_eq!(status, Some(3));
      assert!(stderr.contains("Can't parse foo.py"));
    }
    other => panic!("expected ToolFailed, got: {other}"),
  }

  // No driver, no half-rewritten copy left behind
  assert!(run.temp_entries(DRIVER_PREFIX)?.is_empty());
  assert!(run.temp_entries("codebase-")?.is_empty());

  assert_eq!(input.fingerprint()?, before);
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Failed));
  assert_eq!(run.tasks.open_tasks(), 0);

  Ok(())
}

#[test]
fn test_forward_setup_failure_before_any_copy() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let root = TempDir::new()?;
  let tasks = Arc::new(rail_translate::ui::RecordingReporter::new());
  let ctx = RunContext::new(
    Arc::new(FullDisk {
      root: root.path().to_path_buf(),
    }),
    tasks.clone() as Arc<dyn TaskReporter>,
  );

  let translator = ForwardTranslator::new("internal", "public");
  let err = translator.translate(&ctx, &tree.codebase("internal")).unwrap_err();

  assert!(matches!(
    err,
    RailError::Translate(TranslateError::Setup { path: None, .. })
  ));
  assert!(err.to_string().contains("no space left on device"));
  assert!(tasks.records().is_empty(), "no task should be opened");
  assert_eq!(std::fs::read_dir(root.path())?.count(), 0);

  Ok(())
}

#[test]
fn test_forward_rejects_wrong_project_space() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let run = TestRun::new()?;

  let translator = ForwardTranslator::new("internal", "public");
  let err = translator.translate(&run.ctx, &tree.codebase("public")).unwrap_err();

  assert!(matches!(
    err,
    RailError::Translate(TranslateError::SpaceMismatch { .. })
  ));
  assert!(run.tasks.records().is_empty());
  assert!(run.temp_entries(DRIVER_PREFIX)?.is_empty());

  Ok(())
}

#[test]
fn test_forward_calls_are_independent() -> Result<()> {
  let tree = TestCodebase::python2()?;
  tree.write_file("pkg/bar.py", "print \"bar\"\n")?;
  let logs = TempDir::new()?;
  let run = TestRun::new()?;
  let input = tree.codebase("internal");
  let translator = translator_with(rewriting_script(&logs.path().join("args.log")));

  let first = translator.translate(&run.ctx, &input)?;
  let second = translator.translate(&run.ctx, &input)?;

  assert_ne!(first.path(), second.path());
  assert_eq!(first.fingerprint()?, second.fingerprint()?);
  assert_eq!(std::fs::read_to_string(second.path().join("pkg/bar.py"))?, "print(\"bar\")\n");
  assert_eq!(translator.from_project_space().as_str(), "internal");
  assert_eq!(translator.to_project_space().as_str(), "public");
  assert_eq!(run.tasks.records().len(), 2);
  assert!(run.temp_entries(DRIVER_PREFIX)?.is_empty());

  Ok(())
}

#[test]
fn test_forward_concurrent_calls_share_input() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let logs = TempDir::new()?;
  let run = TestRun::new()?;
  let input = tree.codebase("internal");
  let before = input.fingerprint()?;

  let a_log = logs.path().join("a.log");
  let b_log = logs.path().join("b.log");
  let a = translator_with(rewriting_script(&a_log));
  let b = translator_with(rewriting_script(&b_log));

  let (ra, rb) = std::thread::scope(|s| {
    let ha = s.spawn(|| a.translate(&run.ctx, &input));
    let hb = s.spawn(|| b.translate(&run.ctx, &input));
    (ha.join().expect("thread a"), hb.join().expect("thread b"))
  });
  let (ra, rb) = (ra?, rb?);

  assert_ne!(ra.path(), rb.path());
  assert_eq!(std::fs::read_to_string(ra.path().join("foo.py"))?, PY3_SOURCE);
  assert_eq!(std::fs::read_to_string(rb.path().join("foo.py"))?, PY3_SOURCE);
  assert_eq!(input.fingerprint()?, before);

  Ok(())
}

/// Driver that deletes itself and leaves a non-empty directory in its place
fn driver_replaced_by_directory(code: i32) -> String {
  format!("#!/bin/sh\nrm \"$0\"\nmkdir \"$0\"\ntouch \"$0/held\"\nexit {}\n", code)
}

#[test]
fn test_forward_cleanup_failure_discards_result() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let run = TestRun::new()?;
  let input = tree.codebase("internal");

  let translator = translator_with(driver_replaced_by_directory(0));
  let err = translator.translate(&run.ctx, &input).unwrap_err();

  match &err {
    RailError::Translate(TranslateError::Cleanup { path, .. }) => {
      assert!(path.starts_with(run.temp.path()));
      assert!(path.file_name().unwrap().to_string_lossy().starts_with(DRIVER_PREFIX));
    }
    other => panic!("expected Cleanup, got: {other}"),
  }

  // A good rewrite is still thrown away
  assert!(run.temp_entries("codebase-")?.is_empty());
  assert_eq!(tree.read_file("foo.py")?, PY2_SOURCE);
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Failed));
  assert_eq!(run.tasks.open_tasks(), 0);

  Ok(())
}

#[test]
fn test_forward_tool_failure_wins_over_cleanup_failure() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let run = TestRun::new()?;

  let translator = translator_with(driver_replaced_by_directory(4));
  let err = translator.translate(&run.ctx, &tree.codebase("internal")).unwrap_err();

  assert!(
    matches!(
      err,
      RailError::Translate(TranslateError::ToolFailed { status: Some(4), .. })
    ),
    "expected ToolFailed, got: {err}"
  );
  assert!(run.temp_entries("codebase-")?.is_empty());
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Failed));

  Ok(())
}

#[test]
fn test_forward_driver_already_gone_counts_as_removed() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let run = TestRun::new()?;

  let translator = translator_with("#!/bin/sh\nrm \"$0\"\nexit 0\n".to_string());
  let output = translator.translate(&run.ctx, &tree.codebase("internal"))?;

  assert_eq!(output.project_space().as_str(), "public");
  assert!(output.path().is_dir());
  assert!(run.temp_entries(DRIVER_PREFIX)?.is_empty());
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Succeeded));

  Ok(())
}

#[test]
fn test_forward_driver_write_failure_names_driver() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let slot = Arc::new(BlockedDriverSlot::new()?);
  let tasks = Arc::new(rail_translate::ui::RecordingReporter::new());
  let ctx = RunContext::new(slot.clone(), tasks.clone() as Arc<dyn TaskReporter>);

  let translator = ForwardTranslator::new("internal", "public");
  let err = translator.translate(&ctx, &tree.codebase("internal")).unwrap_err();

  match &err {
    RailError::Translate(TranslateError::Setup { path: Some(path), reason }) => {
      assert_eq!(path, &slot.slot());
      assert!(reason.contains("cannot write driver"));
    }
    other => panic!("expected Setup with a driver path, got: {other}"),
  }
  assert!(tasks.records().is_empty(), "no task should be opened");
  assert_eq!(tree.read_file("foo.py")?, PY2_SOURCE);

  Ok(())
}
