//! CLI module for folio
//!
//! Provides command-line interface for:
//! - init: Create the library directory
//! - start: Boot the HTTP server over it

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, start, Config};
pub use errors::{CliError, CliResult};
