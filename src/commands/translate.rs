use rail_translate::core::codebase::{Codebase, Fingerprint, ensure_empty_destination};
use rail_translate::core::context::RunContext;
use rail_translate::core::error::{RailResult, ResultExt};
use rail_translate::translate::TranslatorKind;
use rail_translate::ui::{ConsoleReporter, RecordingReporter, TaskRecord, TaskReporter};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Result of a translate run, printed with --json
#[derive(Debug, Serialize)]
struct TranslationSummary {
  source: PathBuf,
  output: PathBuf,
  from: String,
  to: String,
  direction: TranslatorKind,
  files: usize,
  source_fingerprint: Fingerprint,
  output_fingerprint: Fingerprint,
  tasks: Vec<TaskRecord>,
}

/// Run the translate command
#[allow(clippy::too_many_arguments)]
pub fn run_translate(
  source: PathBuf,
  from: String,
  to: String,
  direction: TranslatorKind,
  output: PathBuf,
  config: Option<PathBuf>,
  json: bool,
) -> RailResult<()> {
  let config = super::load_config(config.as_deref())?;
  ensure_empty_destination(&output)?;
  let source = source
    .canonicalize()
    .with_context(|| format!("Source tree not found: {}", source.display()))?;

  let recorder = Arc::new(RecordingReporter::new());
  let reporter: Arc<dyn TaskReporter> = if json {
    recorder.clone()
  } else {
    Arc::new(ConsoleReporter::new())
  };
  let ctx = RunContext::build(&config, reporter)?;

  let translator = direction.build(from, to, &config);
  let codebase = Codebase::new(&source, translator.from_project_space().clone());
  let source_fingerprint = codebase.fingerprint()?;

  if !json {
    println!(
      "🔁 Translating {} ({} → {})",
      source.display(),
      translator.from_project_space(),
      translator.to_project_space()
    );
  }

  let translated = translator.translate(&ctx, &codebase)?;
  translated.copy_to(&output)?;

  let summary = TranslationSummary {
    source,
    output,
    from: translator.from_project_space().to_string(),
    to: translator.to_project_space().to_string(),
    direction,
    files: translated.files()?.len(),
    source_fingerprint,
    output_fingerprint: translated.fingerprint()?,
    tasks: recorder.records(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&summary)?);
  } else {
    println!(
      "📦 Wrote {} files in project space '{}' to {}",
      summary.files,
      summary.to,
      summary.output.display()
    );
    println!(
      "   source {} → output {}",
      summary.source_fingerprint, summary.output_fingerprint
    );
  }

  Ok(())
}
