//! CLI entry point.
//!
//! # Responsibility
//! - `ping`: verify `dictionary_core` linkage with deterministic output.
//! - `reindex`: rebuild the search index from the record store.

use clap::{Parser, Subcommand};
use dictionary_cli::{reindex, CliError, DEFAULT_BATCH_SIZE};
use dictionary_core::{default_log_level, init_logging, LogTarget};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dictionary_cli", about = "Dictionary maintenance tool", version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "DICTIONARY_LOG_LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage information
    Ping,
    /// Rebuild the search index from the record store
    Reindex {
        #[arg(long, env = "DICTIONARY_DB", default_value = "dictionary.sqlite3")]
        db: PathBuf,
        #[arg(long, env = "DICTIONARY_INDEX", default_value = "dictionary_index.sqlite3")]
        index: PathBuf,
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u32,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dictionary_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Ping => {
            println!("dictionary_core ping={}", dictionary_core::ping());
            println!("dictionary_core version={}", dictionary_core::core_version());
        }
        Command::Reindex {
            db,
            index,
            batch_size,
        } => {
            let level = cli.log_level.as_deref().unwrap_or(default_log_level());
            init_logging(level, &LogTarget::Stderr)?;

            let report = reindex(&db, &index, batch_size.max(1))?;
            println!(
                "reindexed categories={} words={}",
                report.categories, report.words
            );
        }
    }
    Ok(())
}
