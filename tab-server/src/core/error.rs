//! Server bootstrap errors: configuration, database/cache connection,
//! migration failures. Request-path errors use [`shared::CoreError`]
//! instead, which converts directly to [`tonic::Status`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
