//! CLI argument definitions using clap
//!
//! Commands:
//! - folio init --config <path>
//! - folio start --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// folio - A minimal, self-hostable HTML fragment document server
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a new folio library directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./folio.json")]
        config: PathBuf,
    },

    /// Start the folio server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./folio.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
