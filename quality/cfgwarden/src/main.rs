//! cfgwarden CLI - validate economy config files
//!
//! All file I/O lives here; the library core only sees content strings.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

use cfgwarden::{
    EngineConfig, JsonFormatter, OutputFormatter, TextFormatter, ValidationEngine,
};

#[derive(Parser)]
#[command(
    name = "cfgwarden",
    version,
    about = "Schema-aware validator for game-server economy config files",
    long_about = "Validates types/events/spawnabletypes/globals XML and cfggameplay/cfgeffectarea \
                  JSON files. The schema is detected from content; no flags needed."
)]
struct Cli {
    /// Files or glob patterns to validate
    files: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputKind,

    /// Write auto-corrected content back to the file when a fix applies
    #[arg(long)]
    fix: bool,

    /// Target game release for version-dependent rules (e.g. "1.26")
    #[arg(long)]
    schema_version: Option<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    Text,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            std::process::exit(2);
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    if cli.no_color {
        colored::control::set_override(false);
    }

    let files = expand_globs(&cli.files)?;
    if files.is_empty() {
        anyhow::bail!("no input files matched");
    }

    let config = EngineConfig {
        target_version: cli.schema_version.clone(),
        ..EngineConfig::default()
    };
    let engine = ValidationEngine::new(config);

    let formatter: Box<dyn OutputFormatter> = match cli.format {
        OutputKind::Text => {
            let mut text = TextFormatter::new();
            text.colored = !cli.no_color;
            Box::new(text)
        }
        OutputKind::Json => Box::new(JsonFormatter::new()),
    };

    let mut exit_code = 0;

    for path in &files {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let filename = path.to_string_lossy();
        let result = engine.validate_named(&content, Some(&filename));

        if cli.verbose {
            log::info!(
                "{}: detected {} ({}) at confidence {:.2}",
                path.display(),
                result.classification.format,
                result.classification.schema.as_deref().unwrap_or("-"),
                result.classification.confidence
            );
        }

        print!("{}", formatter.format(&result, &filename));

        if cli.fix {
            if let Some(corrected) = &result.corrected_content {
                std::fs::write(path, corrected)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!(
                    "{}: applied {} fix(es)",
                    path.display(),
                    result.applied_fixes.len()
                );
            }
        }

        exit_code = exit_code.max(result.exit_code());
    }

    Ok(exit_code)
}

/// Expand glob patterns; plain paths pass through
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for pattern in patterns {
        let path = PathBuf::from(pattern);
        if path.exists() {
            files.push(path);
            continue;
        }

        let matches = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?;
        for entry in matches {
            files.push(entry.with_context(|| format!("failed to resolve {}", pattern))?);
        }
    }

    Ok(files)
}
