//! sleet CLI - indentation linter for component-template documents

use anyhow::Context;
use clap::{Parser, ValueEnum};
use colored::Colorize;
use glob::glob;
use sleet::config::Config;
use sleet::document::TemplateDocument;
use sleet::engine::Engine;
use sleet::fixer::{FixOutcome, Fixer};
use sleet::output::{JsonFormatter, OutputFormatter, TextFormatter};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "sleet",
    version,
    about = "Indentation linter for component-template documents",
    long_about = "Validates and fixes the indentation of component-template documents.\n\
                  Input files are parser-produced document files (JSON); fixes are\n\
                  written back to the original template sources."
)]
struct Cli {
    /// Document files or glob patterns to lint
    files: Vec<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: Format,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Apply fixes to the template sources
    #[arg(long)]
    fix: bool,

    /// With --fix: report what would change without writing
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            2
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = match &cli.config {
        Some(path) => {
            Config::load(path).with_context(|| format!("loading config {}", path.display()))?
        }
        None => {
            let cwd = std::env::current_dir().context("resolving working directory")?;
            Config::discover(&cwd).context("loading project config")?
        }
    };

    let files = expand_files(&cli.files)?;
    if files.is_empty() {
        anyhow::bail!("no input files (pass document files or glob patterns)");
    }

    let engine = Engine::new(config);
    let result = engine.lint(&files);

    if cli.fix {
        let fixer = Fixer::new(cli.dry_run);
        let mut outcome = FixOutcome::default();
        for file in &files {
            match TemplateDocument::load(file) {
                Ok(doc) => {
                    let diagnostics = engine.check_document(&doc);
                    fixer.fix_document(&doc, &diagnostics, &mut outcome);
                }
                Err(_) => continue, // already reported by the lint pass
            }
        }
        let verb = if cli.dry_run { "would fix" } else { "fixed" };
        eprintln!(
            "{} {} issue(s) in {} file(s), {} skipped",
            verb, outcome.fixes_applied, outcome.files_modified, outcome.fixes_skipped
        );
        for error in &outcome.errors {
            eprintln!("{} {}", "error:".red().bold(), error);
        }
    }

    let formatter: Box<dyn OutputFormatter> = match cli.format {
        Format::Text => {
            let mut text = TextFormatter::new();
            text.colored = !cli.no_color;
            Box::new(text)
        }
        Format::Json => Box::new(JsonFormatter::new().pretty()),
    };
    print!("{}", formatter.format(&result));

    Ok(result.exit_code())
}

/// Expand literal paths and glob patterns into the file list.
fn expand_files(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = PathBuf::from(pattern);
        if path.is_file() {
            files.push(path);
            continue;
        }
        let matches =
            glob(pattern).with_context(|| format!("invalid glob pattern {:?}", pattern))?;
        for entry in matches {
            match entry {
                Ok(p) if p.is_file() => files.push(p),
                _ => {}
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
