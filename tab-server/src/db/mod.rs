//! The durable tier: a Postgres-backed system of record, accessed through
//! free functions in [`repository`] that take a `&mut PgConnection` so they
//! compose into multi-step transactions.

pub mod repository;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::core::error::{Result, ServerError};

/// Owns the Postgres connection pool.
#[derive(Clone)]
pub struct DbService {
    pub pool: PgPool,
}

impl DbService {
    pub async fn connect(connection_string: &str) -> Result<Self> {
        let pool = PgPoolOptions::new().max_connections(20).connect(connection_string).await?;
        tracing::info!("database connection established");
        Ok(Self { pool })
    }

    /// Runs every migration under `./migrations` that hasn't already been
    /// applied. Safe to call on every startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    /// Loads development fixtures from `./seed`. Intended for the `seed`
    /// CLI subcommand, not for production startup.
    pub async fn seed(&self) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir("./seed")
            .map_err(|e| ServerError::Config(format!("cannot read ./seed: {e}")))?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "sql"))
            .collect();
        entries.sort();

        for path in entries {
            let sql = std::fs::read_to_string(&path)
                .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
            sqlx::raw_sql(&sql).execute(&self.pool).await?;
            tracing::info!(file = %path.display(), "seed file applied");
        }
        Ok(())
    }
}
