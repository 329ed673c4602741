//! Tests for the reverse (3to2) translator

use crate::helpers::*;
use anyhow::Result;
use rail_translate::core::error::{RailError, TranslateError};
use rail_translate::translate::{ReverseTranslator, Translator};
use rail_translate::ui::TaskOutcome;

#[test]
fn test_reverse_missing_command_is_not_found() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let run = TestRun::new()?;
  let input = tree.codebase("public");
  let before = input.fingerprint()?;

  let translator = ReverseTranslator::with_command("public", "internal", "rail-translate-missing-3to2");
  let err = translator.translate(&run.ctx, &input).unwrap_err();

  match &err {
    RailError::Translate(TranslateError::ToolNotFound { program }) => {
      assert_eq!(program, "rail-translate-missing-3to2");
    }
    other => panic!("expected ToolNotFound, got: {other}"),
  }
  assert!(err.to_string().contains("not found"));
  assert!(err.help_message().unwrap().contains("reverse.command"));

  // Input untouched, nothing left in the temp root
  assert_eq!(input.fingerprint()?, before);
  assert_eq!(tree.read_file("foo.py")?, PY2_SOURCE);
  assert!(run.temp_entries("codebase-")?.is_empty());

  let tasks = run.tasks.records();
  assert_eq!(tasks.len(), 1);
  assert_eq!(
    tasks[0].description,
    "Translating from public project space to internal (using python 3to2)"
  );
  assert_eq!(tasks[0].outcome, Some(TaskOutcome::Failed));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_reverse_rewrites_copy() -> Result<()> {
  let tree = TestCodebase::python2()?;
  tree.write_file("lib/util.py", "print \"util\"\n")?;
  tree.write_file("README", "print \"not python\"\n")?;
  let tool = FakeTool::rewriting()?;
  let run = TestRun::new()?;
  let input = tree.codebase("public");
  let before = input.fingerprint()?;

  let translator = ReverseTranslator::with_command("public", "internal", tool.path.display().to_string());
  let output = translator.translate(&run.ctx, &input)?;

  assert_ne!(output.path(), input.path());
  assert_eq!(output.project_space().as_str(), "internal");
  assert_eq!(std::fs::read_to_string(output.path().join("foo.py"))?, PY3_SOURCE);
  assert_eq!(
    std::fs::read_to_string(output.path().join("lib/util.py"))?,
    "print(\"util\")\n"
  );
  assert_eq!(
    std::fs::read_to_string(output.path().join("README"))?,
    "print \"not python\"\n"
  );
  assert_eq!(output.files()?, input.files()?);

  assert_eq!(
    tool.recorded_args()?,
    vec![
      "--write".to_string(),
      "--nobackups".to_string(),
      output.path().display().to_string(),
    ]
  );

  assert_eq!(input.fingerprint()?, before);
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Succeeded));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_reverse_nonzero_exit_is_distinct_from_not_found() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let tool = FakeTool::failing(1)?;
  let run = TestRun::new()?;
  let input = tree.codebase("public");

  let translator = ReverseTranslator::with_command("public", "internal", tool.path.display().to_string());
  let err = translator.translate(&run.ctx, &input).unwrap_err();

  let translate_err = err.as_translate().expect("translate error");
  assert!(translate_err.is_tool_error());
  assert!(matches!(
    translate_err,
    TranslateError::ToolFailed { status: Some(1), .. }
  ));
  assert!(!err.to_string().contains("not found"));

  // The partial rewrite must not survive anywhere
  assert!(run.temp_entries("codebase-")?.is_empty());
  assert_eq!(tree.read_file("foo.py")?, PY2_SOURCE);
  assert_eq!(run.tasks.open_tasks(), 0);

  Ok(())
}

#[test]
fn test_reverse_copy_failure_is_propagated() -> Result<()> {
  let run = TestRun::new()?;
  let input = rail_translate::core::codebase::Codebase::new("/rail-translate/does/not/exist", "public");

  let translator = ReverseTranslator::new("public", "internal");
  let err = translator.translate(&run.ctx, &input).unwrap_err();

  assert!(matches!(err, RailError::Translate(TranslateError::Copy { .. })));
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Failed));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_reverse_unlaunchable_command_is_launch_error() -> Result<()> {
  let tree = TestCodebase::python2()?;
  let tool = FakeTool::not_executable()?;
  let run = TestRun::new()?;

  let translator = ReverseTranslator::with_command("public", "internal", tool.path.display().to_string());
  let err = translator.translate(&run.ctx, &tree.codebase("public")).unwrap_err();

  match err.as_translate() {
    Some(TranslateError::ToolLaunch { program, .. }) => {
      assert_eq!(program, &tool.path.display().to_string());
    }
    other => panic!("expected ToolLaunch, got: {other:?}"),
  }
  assert!(!err.to_string().contains("not found"));
  assert!(tool.recorded_args().is_err(), "tool must not have run");
  assert!(run.temp_entries("codebase-")?.is_empty());
  assert_eq!(run.tasks.records()[0].outcome, Some(TaskOutcome::Failed));

  Ok(())
}
