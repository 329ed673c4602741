//! Translate codebases between project spaces
//!
//! A project space is one variant of a codebase (e.g. "internal" vs "public").
//! Translators rewrite a codebase from one space into another by running an
//! external rewriting tool over a writable copy; the input is never modified.
//!
//! ```no_run
//! use rail_translate::core::codebase::Codebase;
//! use rail_translate::core::config::TranslateConfig;
//! use rail_translate::core::context::RunContext;
//! use rail_translate::translate::{ForwardTranslator, Translator};
//! use rail_translate::ui::ConsoleReporter;
//! use std::sync::Arc;
//!
//! # fn main() -> rail_translate::core::error::RailResult<()> {
//! let ctx = RunContext::build(&TranslateConfig::default(), Arc::new(ConsoleReporter::new()))?;
//! let translator = ForwardTranslator::new("internal", "public");
//! let public = translator.translate(&ctx, &Codebase::new("./src-tree", "internal"))?;
//! println!("{}", public.path().display());
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod translate;
pub mod ui;
