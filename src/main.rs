//! ghwf CLI - check and dump GitHub Actions workflow files

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use walkdir::WalkDir;

use ghwf::{parse_str, Diagnostics, FixSuggestion, ParseConfig};

const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";

#[derive(Parser)]
#[command(name = "ghwf")]
#[command(about = "Position-tracking parser for GitHub Actions workflow files")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Parser config file (default: .github/ghwf.yaml or .ghwf.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Construct every workflow and report diagnostics
    Check {
        /// Files, directories or glob patterns (default: .github/workflows)
        paths: Vec<String>,
    },

    /// Print the syntax tree of one workflow
    Dump {
        /// Path to a workflow file
        file: PathBuf,

        #[arg(short, long, value_enum, default_value_t = DumpFormat::Json)]
        format: DumpFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DumpFormat {
    Json,
    Yaml,
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let result = load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Check { paths } => check(&paths, &config),
        Commands::Dump { file, format } => dump(&file, format, &config),
    });

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ParseConfig> {
    match path {
        Some(path) => ParseConfig::from_file(path),
        None => {
            let cwd = std::env::current_dir().context("Failed to read current directory")?;
            ParseConfig::discover(&cwd)
        }
    }
}

/// Expand CLI arguments into workflow files, sorted and deduplicated
fn collect_files(paths: &[String]) -> Result<Vec<PathBuf>> {
    let defaults = [DEFAULT_WORKFLOW_DIR.to_string()];
    let paths = if paths.is_empty() { &defaults[..] } else { paths };

    let mut files = Vec::new();
    for arg in paths {
        let path = Path::new(arg);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).follow_links(true) {
                let entry = entry.with_context(|| format!("Failed to walk {}", arg))?;
                if entry.file_type().is_file() && is_workflow_file(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else {
            let matches = glob::glob(arg).with_context(|| format!("Invalid pattern {}", arg))?;
            let before = files.len();
            for m in matches {
                let m = m.with_context(|| format!("Failed to expand {}", arg))?;
                if m.is_file() {
                    files.push(m);
                }
            }
            if files.len() == before {
                bail!("No workflow files match '{}'", arg);
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn is_workflow_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml" | "yaml")
    )
}

fn print_diagnostics(file: &Path, diagnostics: &Diagnostics) {
    for error in diagnostics.iter() {
        eprintln!(
            "{}:{}: {}",
            file.display().to_string().bold(),
            error.pos(),
            error.to_string().red()
        );
        if let Some(suggestion) = error.fix_suggestion() {
            eprintln!("  {} {}", "Fix:".yellow(), suggestion);
        }
    }
}

/// Returns false when any file has diagnostics
fn check(paths: &[String], config: &ParseConfig) -> Result<bool> {
    let files = collect_files(paths)?;
    if files.is_empty() {
        bail!("No workflow files found");
    }

    let mut failed = 0;
    let mut errors = 0;
    for file in &files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read workflow {}", file.display()))?;
        match parse_str(&source, config) {
            Ok(workflow) => {
                tracing::debug!(file = %file.display(), jobs = workflow.jobs.len(), "ok");
                println!("{} {}", "✓".green(), file.display());
            }
            Err(diagnostics) => {
                failed += 1;
                errors += diagnostics.len();
                print_diagnostics(file, &diagnostics);
            }
        }
    }

    if failed == 0 {
        println!("{} {} workflow(s) valid", "✓".green(), files.len());
        Ok(true)
    } else {
        eprintln!(
            "{} {} error(s) in {} of {} workflow(s)",
            "✗".red(),
            errors,
            failed,
            files.len()
        );
        Ok(false)
    }
}

fn dump(file: &Path, format: DumpFormat, config: &ParseConfig) -> Result<bool> {
    let source = fs::read_to_string(file)
        .with_context(|| format!("Failed to read workflow {}", file.display()))?;
    let workflow = match parse_str(&source, config) {
        Ok(workflow) => workflow,
        Err(diagnostics) => {
            print_diagnostics(file, &diagnostics);
            return Ok(false);
        }
    };
    let text = match format {
        DumpFormat::Json => {
            serde_json::to_string_pretty(&workflow).context("Failed to serialize as JSON")?
        }
        DumpFormat::Yaml => serde_yaml::to_string(&workflow).context("Failed to serialize as YAML")?,
    };
    println!("{}", text);
    Ok(true)
}
