//! Configuration and bootstrap error types, plus gRPC server assembly.

pub mod config;
pub mod error;
pub mod logging;
pub mod server;

pub use config::Config;
pub use error::{Result, ServerError};
pub use logging::{LoggingGuard, init as init_logging};
pub use server::run;
