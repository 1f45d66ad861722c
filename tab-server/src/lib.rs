//! Serving-side core of a restaurant ordering backend.
//!
//! # Module structure
//!
//! ```text
//! tab-server/src/
//! ├── core/      # configuration, bootstrap error, TLS/gRPC server
//! ├── auth/      # JWT issuance/verification, gRPC auth middleware
//! ├── db/        # durable (Postgres) repository, migrate/seed
//! ├── cache/     # cache (Redis) repository, key scheme, watch/transact
//! ├── warmer.rs  # single-flight + keyed-mutex cache rehydration
//! ├── services/  # TabService / OrderService / MenuService / CustomerService
//! └── grpc/      # tonic service implementations wrapping services/
//! ```

pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod grpc;
pub mod services;
pub mod warmer;

pub mod pb {
    tonic::include_proto!("restaurant");
}

pub use core::{Config, ServerError};
