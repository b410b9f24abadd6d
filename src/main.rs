//! # Milonga API Main Entry Point
//!
//! `milonga serve` (the default) runs the HTTP API; `milonga migrate` applies
//! pending database migrations and exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use milonga::{
    config::ConfigLoader,
    db,
    migration::{Migrator, MigratorTrait},
    server::run_server,
    telemetry,
};

#[derive(Debug, Parser)]
#[command(name = "milonga", version, about = "Artists and events API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        /// Apply pending migrations before accepting traffic
        #[arg(long)]
        migrate: bool,
    },
    /// Apply pending migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load()
        .context("loading configuration")?;
    telemetry::init_tracing(&config).context("initialising telemetry")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = db::init_pool(&config)
        .await
        .context("initializing database connection pool")?;

    match cli.command.unwrap_or(Command::Serve { migrate: false }) {
        Command::Migrate => {
            Migrator::up(&db, None).await.context("applying migrations")?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Serve { migrate } => {
            if migrate {
                Migrator::up(&db, None).await.context("applying migrations")?;
                tracing::info!("Migrations applied");
            }
            run_server(config, db).await
        }
    }
}
