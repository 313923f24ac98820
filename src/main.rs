mod cli;
mod tui;

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rag::{Config, Difficulty, QuestionType};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TUI_LOG_FILE: &str = "qbank.log";

#[derive(Parser)]
#[command(name = "qbank", version, about = "Generate exam question banks from PDF documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive terminal interface (default)
    Tui,
    /// Upload and index PDF files or directories of PDFs
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List uploaded documents
    Documents,
    /// Generate questions for an uploaded document
    Generate {
        document: String,
        #[arg(short, long, default_value = "beginner")]
        difficulty: Difficulty,
        #[arg(short = 't', long = "type", default_value = "mcq")]
        q_type: QuestionType,
        #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u16).range(1..=20))]
        count: u16,
        /// Append the generated questions to the document's question bank
        #[arg(long)]
        save: bool,
    },
    /// Show a document's question bank
    Bank { document: String },
    /// Assemble an exam paper from a document's question bank
    Exam {
        document: String,
        #[arg(short, long, default_value = "beginner")]
        difficulty: Difficulty,
        #[arg(long, default_value_t = 5)]
        mcq: usize,
        #[arg(long, default_value_t = 3)]
        true_false: usize,
        #[arg(long, default_value_t = 2)]
        short: usize,
        #[arg(long, default_value_t = 1)]
        long: usize,
        /// Print the exam as JSON
        #[arg(long)]
        json: bool,
        /// Also write the exam JSON to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load().context("failed to load configuration")?;
    let command = cli.command.unwrap_or(Command::Tui);
    init_tracing(&config, matches!(command, Command::Tui))?;
    info!("{}", config_notice(&Config::default_path()));

    match command {
        Command::Tui => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(tui::run(config))?;
        }
        Command::Ingest { paths } => cli::ingest(&config, &paths)?,
        Command::Documents => cli::documents(&config),
        Command::Generate {
            document,
            difficulty,
            q_type,
            count,
            save,
        } => cli::generate(&config, &document, difficulty, q_type, count as usize, save)?,
        Command::Bank { document } => cli::bank(&config, &document),
        Command::Exam {
            document,
            difficulty,
            mcq,
            true_false,
            short,
            long,
            json,
            output,
        } => {
            let counts = rag::ExamCounts {
                mcq,
                true_false,
                short,
                long,
            };
            cli::exam(&config, &document, difficulty, counts, json, output.as_deref())?
        }
    }

    Ok(())
}

fn config_notice(path: &Path) -> String {
    if path.exists() {
        format!("loaded config from {}", path.display())
    } else {
        format!("no config file at {}, using defaults", path.display())
    }
}

/// CLI commands log to stderr; the TUI logs to a file so the screen stays intact.
fn init_tracing(config: &Config, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    if to_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(TUI_LOG_FILE)
            .with_context(|| format!("failed to open {}", TUI_LOG_FILE))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_notice_reports_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("qbank.toml");
        assert!(config_notice(&missing).starts_with("no config file at"));
        std::fs::write(&missing, "top_k = 4\n").unwrap();
        assert!(config_notice(&missing).starts_with("loaded config from"));
    }
}
