// SPDX-License-Identifier: AGPL-3.0
// Currency Desk CLI - Terminal frontend
//
// Browse currencies, convert amounts and manage favorites from the shell.

mod commands;
mod state;

use clap::{Parser, Subcommand};
use currency_desk_core::{AppError, ClientConfig};
use state::AppState;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "currency-desk", version, about = "Fiat currency rates and conversion")]
struct Cli {
    /// Directory holding options.json (defaults to the platform config dir)
    #[arg(long = "config-dir", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all fiat currencies, sorted by name
    Currencies {
        /// Currency code to list first
        #[arg(long)]
        selected: Option<String>,
    },
    /// Convert an amount from one currency to another
    Convert {
        from: String,
        to: String,
        amount: String,
    },
    /// Show favorite currencies with rates against the base currency
    Favorites,
    /// Show base currency, favorites and the full catalog
    Options,
    /// Set the base currency
    Base { code: String },
    /// Add a favorite currency
    Add { code: String },
    /// Remove a favorite currency
    Remove { code: String },
}

async fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let state = AppState::new(cli.config_dir, ClientConfig::from_env())?;

    match cli.command {
        Command::Currencies { selected } => commands::currencies(&state, selected).await,
        Command::Convert { from, to, amount } => {
            commands::convert(&state, &from.to_uppercase(), &to.to_uppercase(), &amount).await
        }
        Command::Favorites => commands::favorites(&state).await,
        Command::Options => commands::options(&state).await,
        Command::Base { code } => commands::set_base(&state, &code).await,
        Command::Add { code } => commands::add_favorite(&state, &code).await,
        Command::Remove { code } => commands::remove_favorite(&state, &code),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("currency_desk_cli=info".parse().unwrap())
                .add_directive("currency_desk_core=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!("Starting Currency Desk v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(code) => code,
        Err(AppError::InvalidAmount(reason)) => {
            eprintln!("Invalid amount: {}", reason);
            ExitCode::FAILURE
        }
        Err(e) => {
            // Options that cannot be saved leave no safe way to continue
            tracing::error!("Fatal: {}", e);
            eprintln!("Fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}
