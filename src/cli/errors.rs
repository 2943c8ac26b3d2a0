//! CLI-specific error types
//!
//! All CLI errors are fatal; main prints them and exits non-zero.

use std::fmt;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// Library already initialized
    AlreadyInitialized,
    /// Library not initialized
    NotInitialized,
    /// Boot failed
    BootFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "FOLIO_CLI_CONFIG_ERROR",
            Self::AlreadyInitialized => "FOLIO_CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "FOLIO_CLI_NOT_INITIALIZED",
            Self::BootFailed => "FOLIO_CLI_BOOT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Library already initialized
    pub fn already_initialized(library: impl Into<String>) -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            format!("Library already exists: {}", library.into()),
        )
    }

    /// Library not initialized
    pub fn not_initialized(library: impl Into<String>) -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            format!("Library does not exist, run `folio init`: {}", library.into()),
        )
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// The error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// The human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}
