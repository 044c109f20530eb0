// SPDX-FileCopyrightText: 2026 Suvidha Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suvidha - offline transaction queue and sync engine for civic service kiosks.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod serve;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use suvidha_config::SuvidhaConfig;
use suvidha_core::TransactionStatus;

/// Suvidha - offline transaction queue and sync engine.
#[derive(Parser, Debug)]
#[command(name = "suvidha", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Queue a transaction payload for replay.
    Enqueue {
        /// Payload as inline JSON.
        #[arg(conflicts_with = "file")]
        payload: Option<String>,
        /// Read the payload from a JSON file.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// List pending transactions, oldest first.
    Pending,
    /// List transactions, optionally filtered by status.
    List {
        #[arg(long, value_parser = parse_status)]
        status: Option<TransactionStatus>,
    },
    /// Show one transaction.
    Show { id: i64 },
    /// Queue counts and store health.
    Status,
    /// Run one sync cycle now.
    Sync {
        /// Skip the reachability probe and treat the backend as online.
        #[arg(long)]
        assume_online: bool,
    },
    /// Move failed transactions below the attempt cap back to pending.
    Requeue {
        #[arg(long)]
        max_attempts: Option<u32>,
    },
    /// Delete synced transactions older than the retention window.
    Cleanup {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Inspect or manage the bill cache.
    Bills {
        #[command(subcommand)]
        action: BillsAction,
    },
    /// Run the sync engine until interrupted.
    Serve,
}

#[derive(Subcommand, Debug)]
pub(crate) enum BillsAction {
    /// List cached bills.
    List {
        /// Only bills owned by this user.
        #[arg(long)]
        user: Option<String>,
    },
    /// Show one cached bill.
    Get { id: String },
    /// Cache bill records from a JSON array file.
    Cache { file: PathBuf },
    /// Remove every cached bill.
    Clear,
}

fn parse_status(raw: &str) -> Result<TransactionStatus, String> {
    raw.parse::<TransactionStatus>()
        .map_err(|_| format!("unknown status `{raw}` (pending, in_flight, synced, failed)"))
}

fn load_config(path: Option<&std::path::Path>) -> SuvidhaConfig {
    let loaded = match path {
        Some(path) => suvidha_config::load_and_validate_path(path),
        None => suvidha_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            suvidha_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    serve::init_tracing(&config.kiosk.log_level);

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(command) => commands::run(command, &config).await,
        None => {
            println!("suvidha: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports epoch advance; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn status_filter_parses_snake_case() {
        assert_eq!(parse_status("in_flight").unwrap(), TransactionStatus::InFlight);
        assert!(parse_status("done").is_err());
    }

    #[test]
    fn inline_payload_and_file_conflict() {
        let parsed = Cli::try_parse_from(["suvidha", "enqueue", "{}", "--file", "p.json"]);
        assert!(parsed.is_err());
    }
}
