//! Server entry point.
//!
//! # Responsibility
//! - Parse configuration, start logging, open both stores and serve.
//! - Report startup failures on stderr with a non-zero exit code.

use clap::Parser;
use dictionary_core::init_logging;
use dictionary_server::{serve, AppState, Cli, ServerConfig, StartupError};
use log::{error, info};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = ServerConfig::from(Cli::parse());

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={}", err);
            eprintln!("dictionary_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &ServerConfig) -> Result<(), StartupError> {
    init_logging(&config.log_level, &config.log_target)?;
    info!(
        "event=server_boot module=server status=start storage={:?} log_target={}",
        config.storage, config.log_target
    );

    let state = AppState::open(config)?;
    serve(config, state).await
}
