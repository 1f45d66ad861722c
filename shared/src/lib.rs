//! Domain types shared between the tab/order core and its gRPC adapter:
//! composite identifiers, domain structs, and the core error taxonomy.

pub mod error;
pub mod ids;
pub mod model;

pub use error::{CoreError, CoreResult};
