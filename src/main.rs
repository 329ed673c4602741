mod commands;
mod logging;

use clap::{Parser, Subcommand};
use rail_translate::core::error::{RailError, print_error};
use rail_translate::translate::TranslatorKind;
use std::path::PathBuf;

/// Translate codebases between project spaces
#[derive(Parser)]
#[command(name = "rail-translate")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Translate a source tree into another project space
  Translate {
    /// Root of the codebase to translate (left untouched)
    source: PathBuf,
    /// Project space the source tree belongs to
    #[arg(long)]
    from: String,
    /// Project space to translate into
    #[arg(long)]
    to: String,
    /// Which rewriting tool to run
    #[arg(long, value_enum)]
    direction: TranslatorKind,
    /// Directory to write the translated tree to (must not exist or be empty)
    #[arg(short, long)]
    output: PathBuf,
    /// Config file (default: rail.toml search from the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output the task report in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Print the effective configuration
  Config {
    /// Config file (default: rail.toml search from the current directory)
    #[arg(long)]
    config: Option<PathBuf>,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  logging::init();
  let cli = Cli::parse();

  let result = match cli.command {
    Commands::Translate {
      source,
      from,
      to,
      direction,
      output,
      config,
      json,
    } => commands::run_translate(source, from, to, direction, output, config, json),
    Commands::Config { config } => commands::run_config(config),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: RailError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
