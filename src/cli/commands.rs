//! CLI command implementations
//!
//! `init` creates the library directory; `start` boots the HTTP server
//! over it. Both read the same JSON configuration file.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::http_server::{DocumentState, HttpServer, HttpServerConfig};
use crate::observability::Logger;

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Library directory holding one subdirectory per document (required)
    pub library_dir: String,

    /// Whether POST to an absent document creates it (default: true)
    #[serde(default = "default_create_on_append")]
    pub create_on_append: bool,

    /// Host to bind (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: empty, permissive)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_create_on_append() -> bool {
    true
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    fn validate(&self) -> CliResult<()> {
        if self.library_dir.is_empty() {
            return Err(CliError::config_error("library_dir must not be empty"));
        }
        if self.port == 0 {
            return Err(CliError::config_error("port must be > 0"));
        }
        Ok(())
    }

    /// The library directory as a path
    pub fn library_path(&self) -> &Path {
        Path::new(&self.library_dir)
    }

    fn http_config(&self) -> HttpServerConfig {
        HttpServerConfig {
            host: self.host.clone(),
            port: self.port,
            cors_origins: self.cors_origins.clone(),
        }
    }
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Init { config } => init(&config),
        Command::Start { config } => start(&config),
    }
}

/// Create the library directory
pub fn init(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let library = config.library_path();

    if library.is_dir() {
        return Err(CliError::already_initialized(&config.library_dir));
    }

    fs::create_dir_all(library).map_err(|e| {
        CliError::boot_failed(format!("Failed to create library directory: {}", e))
    })?;

    Logger::info("LIBRARY_INITIALIZED", &[("library", &config.library_dir)]);
    Ok(())
}

/// Boot the HTTP server and serve until terminated
pub fn start(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let library = config.library_path();

    if !library.is_dir() {
        return Err(CliError::not_initialized(&config.library_dir));
    }

    let state = Arc::new(DocumentState::new(library, config.create_on_append));
    let server = HttpServer::new(config.http_config(), state);

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(async {
        server
            .start()
            .await
            .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })?;

    Ok(())
}
