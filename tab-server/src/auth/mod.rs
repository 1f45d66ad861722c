//! Authentication and authorization: JWT issuance/verification and the gRPC
//! auth middleware that enforces the open/admin method partitioning.

pub mod interceptor;
pub mod jwt;

pub use interceptor::{AuthLayer, claims_from_request};
pub use jwt::{Claims, JwtConfig, JwtError, JwtService, Role};
