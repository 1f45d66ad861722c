//! Free functions for Postgres CRUD via sqlx. Each function takes a
//! `&mut PgConnection`, so callers can pass either a pooled connection or a
//! `Transaction` (which derefs to one) depending on whether the call needs
//! to participate in a larger atomic unit of work.

pub mod customer;
pub mod menu;
pub mod order;
pub mod tab;

use shared::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already closed or already sent")]
    FailedPrecondition,

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for CoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(resource) => CoreError::not_found(resource),
            DbError::FailedPrecondition => {
                CoreError::failed_precondition("tab or order in a terminal state")
            }
            DbError::Sqlx(sqlx::Error::RowNotFound) => CoreError::not_found("row"),
            DbError::Sqlx(e) => CoreError::internal(e.to_string()),
        }
    }
}

fn row_not_found(resource: impl Into<String>) -> DbError {
    DbError::NotFound(resource.into())
}
