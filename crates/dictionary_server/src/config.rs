//! Server configuration.
//!
//! Command-line flags and `DICTIONARY_*` environment variables are parsed by
//! [`Cli`] and folded into a plain [`ServerConfig`].

use clap::Parser;
use dictionary_core::{default_log_level, LogTarget};
use std::net::SocketAddr;
use std::path::PathBuf;

pub const DEFAULT_APP_NAME: &str = "dictionaryApp";

#[derive(Debug, Parser)]
#[command(
    name = "dictionary_server",
    about = "Bilingual dictionary REST server",
    version
)]
pub struct Cli {
    /// Socket address to listen on
    #[arg(long, env = "DICTIONARY_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,
    /// Record store database file
    #[arg(long, env = "DICTIONARY_DB", default_value = "dictionary.sqlite3")]
    pub db: PathBuf,
    /// Search index database file
    #[arg(long, env = "DICTIONARY_INDEX", default_value = "dictionary_index.sqlite3")]
    pub index: PathBuf,
    /// Keep both stores in memory; nothing survives a restart.
    /// Overrides `--db` and `--index` when given.
    #[arg(long)]
    pub in_memory: bool,
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DICTIONARY_LOG_LEVEL")]
    pub log_level: Option<String>,
    /// Absolute directory for rotating log files; stderr when unset
    #[arg(long, env = "DICTIONARY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// Application name used in alert header names
    #[arg(long, env = "DICTIONARY_APP_NAME", default_value = DEFAULT_APP_NAME)]
    pub app_name: String,
}

/// Where the two stores live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    InMemory,
    Files { db: PathBuf, index: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub log_level: String,
    pub log_target: LogTarget,
    pub app_name: String,
}

impl ServerConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            storage: StorageConfig::Files {
                db: PathBuf::from("dictionary.sqlite3"),
                index: PathBuf::from("dictionary_index.sqlite3"),
            },
            log_level: default_log_level().to_string(),
            log_target: LogTarget::Stderr,
            app_name: DEFAULT_APP_NAME.to_string(),
        }
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_target(mut self, target: LogTarget) -> Self {
        self.log_target = target;
        self
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = app_name.into();
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        let storage = if cli.in_memory {
            StorageConfig::InMemory
        } else {
            StorageConfig::Files {
                db: cli.db,
                index: cli.index,
            }
        };
        let log_target = cli
            .log_dir
            .map_or(LogTarget::Stderr, LogTarget::Directory);

        let mut config = ServerConfig::new(cli.bind)
            .with_storage(storage)
            .with_log_target(log_target)
            .with_app_name(cli.app_name);
        if let Some(level) = cli.log_level {
            config = config.with_log_level(level);
        }
        config
    }
}
