//! Binary entry point: loads configuration and environment variables, then
//! either runs a one-shot CLI subcommand or starts the gRPC server.

use clap::{Parser, Subcommand};

use tab_server::core::{self, Config};
use tab_server::db::DbService;

#[derive(Parser)]
#[command(name = "tab-server", about = "Restaurant ordering backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Applies pending database migrations and exits.
    Migrate,
    /// Loads development fixtures from ./seed and exits.
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider (required before any TLS operations)
    // SAFETY: called once at process start; `install_default` is idempotent (returns Err if already installed)
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    dotenvy::dotenv().ok();

    let config = Config::from_env();

    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_json = config.is_production();
    let log_dir = std::env::var("LOG_DIR").ok();
    let _logging_guard = core::init_logging(&log_level, log_json, log_dir.as_deref())?;

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Command::Migrate) => {
            let db = DbService::connect(&config.database.connection_string()).await?;
            db.migrate().await?;
            Ok(())
        }
        Some(Command::Seed) => {
            let db = DbService::connect(&config.database.connection_string()).await?;
            db.seed().await?;
            Ok(())
        }
        None => {
            tracing::info!("tab-server starting");
            let shutdown = async {
                let _ = tokio::signal::ctrl_c().await;
                tracing::info!("shutdown signal received");
            };
            core::run(config, shutdown).await.map_err(Into::into)
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "tab-server exited with an error");
    }

    result
}
