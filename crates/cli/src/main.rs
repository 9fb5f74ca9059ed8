use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use bookswap_db::{Store, Table};
use bookswap_kernel::settings::Settings;
use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Debug, Parser)]
#[command(name = "bookswap-cli", version, about = "Operate the bookswap backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// List durable tables and their row counts
    Tables {
        /// Data directory; defaults to the configured `storage.data_dir`
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Print every stored value of a table, one JSON document per line, in key order
    Dump {
        table: String,
        /// Data directory; defaults to the configured `storage.data_dir`
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookswap settings")?;

    match cli.command {
        Command::Serve => {
            bookswap_telemetry::init(&settings.telemetry)?;
            bookswap_app::app::serve(settings).await
        }
        Command::Tables { data_dir } => {
            let store = inspect_store(&settings, data_dir);
            let mut out = std::io::stdout().lock();
            for name in store.table_names()? {
                let table = store.table::<Value>(&name)?;
                writeln!(out, "{}\t{}", name, table.len()?)?;
            }
            Ok(())
        }
        Command::Dump { table, data_dir } => {
            let store = inspect_store(&settings, data_dir);
            if !store.table_names()?.contains(&table) {
                anyhow::bail!("no table '{}' in {}", table, store.data_dir().display());
            }
            let rows = store.table::<Value>(&table)?;
            let mut out = std::io::stdout().lock();
            for value in rows.values()? {
                writeln!(out, "{}", value)?;
            }
            Ok(())
        }
    }
}

/// Read-only view of the configured (or overridden) data directory.
fn inspect_store(settings: &Settings, data_dir: Option<PathBuf>) -> Store {
    Store::open_read_only(data_dir.unwrap_or_else(|| settings.storage.data_dir.clone()))
}
