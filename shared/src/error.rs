//! Error types shared by the tab/order core and its gRPC adapter.

use thiserror::Error;

/// The error taxonomy surfaced by the core. Each variant maps to exactly one
/// gRPC status code at the RPC boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed input: bad id, empty name, quantity < 1, out-of-range scope.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Referenced entity does not exist.
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// The operation would violate an invariant (unavailable menu item, empty order on send).
    #[error("failed precondition: {message}")]
    FailedPrecondition { message: String },

    /// The tab has a terminal `closed_at` and cannot accept the operation.
    #[error("tab closed")]
    TabClosed,

    /// The order has a terminal `sent_at` and cannot accept the mutation.
    #[error("order already sent")]
    OrderAlreadySent,

    /// Optimistic cache retries were exhausted.
    #[error("conflict, retry exhausted")]
    Conflict,

    /// No credentials presented where required.
    #[error("unauthenticated")]
    Unauthenticated,

    /// Credentials presented but insufficient for the operation.
    #[error("permission denied")]
    PermissionDenied,

    /// Storage failure, serialization bug, or anything else unexpected.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument { message: message.into() }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    pub fn failed_precondition(message: impl Into<String>) -> Self {
        Self::FailedPrecondition { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

impl From<CoreError> for tonic::Status {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidArgument { message } => tonic::Status::invalid_argument(message),
            CoreError::NotFound { resource } => {
                tonic::Status::not_found(format!("{resource} not found"))
            }
            CoreError::FailedPrecondition { message } => {
                tonic::Status::failed_precondition(message)
            }
            CoreError::TabClosed => tonic::Status::failed_precondition("tab closed"),
            CoreError::OrderAlreadySent => tonic::Status::failed_precondition("order already sent"),
            CoreError::Conflict => tonic::Status::aborted("conflict, try again"),
            CoreError::Unauthenticated => tonic::Status::unauthenticated("authentication required"),
            CoreError::PermissionDenied => tonic::Status::permission_denied("not authorized"),
            CoreError::Internal { message } => {
                tracing::error!(error = %message, "internal error");
                tonic::Status::internal("internal error")
            }
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
