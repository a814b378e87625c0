//! tripdb CLI entry point
//!
//! This is a minimal entrypoint that:
//! 1. Installs the stderr log subscriber
//! 2. Dispatches to CLI commands (via cli::run)
//! 3. Prints the error envelope on failure
//! 4. Exits with non-zero on failure
//!
//! All logic is delegated to the CLI module.

use tripdb::{cli, observability};

fn main() {
    if let Err(e) = observability::init_logging() {
        eprintln!("logging disabled: {}", e);
    }

    if let Err(e) = cli::run() {
        if cli::write_error(e.code(), &e.to_string()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(1);
    }
}
