//! CLI command implementations
//!
//! Each command prints exactly one JSON envelope on success. Failures are
//! returned to the caller, which prints the error envelope.

use std::path::Path;

use serde_json::json;

use crate::executor::{execute, QueryKind};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Ingest { config } => ingest(&config),
        Command::Query { id, config } => query(&config, &id),
        Command::Queries => queries(),
        Command::Inspect { config } => inspect(&config),
    }
}

/// Rebuild the store and print the ingestion report
pub fn ingest(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let report = config
        .ingestor()
        .ingest(&config.sources, &config.lookup_path)?;
    write_response(serde_json::to_value(&report)?)
}

/// Run one registry query and print its result
pub fn query(config_path: &Path, id: &str) -> CliResult<()> {
    let kind: QueryKind = id.parse()?;
    let config = Config::load(config_path)?;
    let result = execute(kind, &config.store())?;
    write_response(serde_json::to_value(&result)?)
}

/// Print the query registry
pub fn queries() -> CliResult<()> {
    let listing: Vec<_> = QueryKind::ALL
        .iter()
        .map(|kind| {
            json!({
                "id": kind.id(),
                "description": kind.description(),
                "columns": kind.columns(),
            })
        })
        .collect();
    write_response(json!(listing))
}

/// Verify the store and print its table shapes
pub fn inspect(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let store = config.store();
    let tables = store.inspect().map_err(|source| CliError::Inspect {
        path: store.path().to_path_buf(),
        source,
    })?;
    write_response(json!({
        "store_path": store.path(),
        "tables": tables,
    }))
}
