//! CLI argument definitions using clap
//!
//! Commands:
//! - tripdb ingest --config <path>
//! - tripdb query <id> --config <path>
//! - tripdb queries
//! - tripdb inspect --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tripdb - deterministic ingestion and analytics for taxi trip records
#[derive(Parser, Debug)]
#[command(name = "tripdb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Rebuild the store from the configured sources and zone lookup
    Ingest {
        /// Path to configuration file
        #[arg(long, default_value = "./tripdb.json")]
        config: PathBuf,
    },

    /// Run one analytical query and print its result
    Query {
        /// Query id (see `tripdb queries`)
        id: String,

        /// Path to configuration file
        #[arg(long, default_value = "./tripdb.json")]
        config: PathBuf,
    },

    /// List the available queries and their columns
    Queries,

    /// Verify the store and describe its tables
    Inspect {
        /// Path to configuration file
        #[arg(long, default_value = "./tripdb.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
