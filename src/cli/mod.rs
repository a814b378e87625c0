//! CLI module for tripdb
//!
//! Provides command-line interface for:
//! - ingest: Rebuild the store from sources
//! - query: One-shot query execution
//! - queries: List the query registry
//! - inspect: Verify and describe the store

mod args;
mod commands;
mod config;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{ingest, inspect, queries, query, run, run_command};
pub use config::Config;
pub use errors::{CliError, CliResult};
pub use io::{write_error, write_response};
