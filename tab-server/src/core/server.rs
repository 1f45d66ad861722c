//! gRPC server assembly: wires the durable and cache tiers into the core
//! services, wraps each in its tonic adapter, and serves them behind the
//! timeout and auth middleware with optional TLS.

use std::sync::Arc;
use std::time::Duration;

use tonic::transport::{Identity, Server as TonicServer, ServerTlsConfig};
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;

use crate::auth::{AuthLayer, JwtService};
use crate::cache::RedisCacheRepo;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::grpc::{auth::AuthServiceImpl, customer::CustomerServiceImpl, menu::MenuServiceImpl, order::OrderServiceImpl, tab::TabServiceImpl};
use crate::pb::auth_service_server::AuthServiceServer;
use crate::pb::customer_service_server::CustomerServiceServer;
use crate::pb::menu_service_server::MenuServiceServer;
use crate::pb::order_service_server::OrderServiceServer;
use crate::pb::tab_service_server::TabServiceServer;
use crate::services::{CustomerService, MenuService, OrderService, TabService};
use crate::warmer::Warmer;

/// Upper bound on a single RPC's end-to-end handling time, covering pool
/// acquisition and cache round-trips. No individual service awaits longer
/// than this without the request being cut loose.
const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Boots the durable and cache tiers, assembles every gRPC service, and
/// serves them until the given shutdown future resolves.
pub async fn run(config: Config, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> Result<()> {
    let db = DbService::connect(&config.database.connection_string()).await?;
    let cache = RedisCacheRepo::connect(&config.cache.connection_string())
        .await
        .map_err(|e| ServerError::Config(e.to_string()))?;
    let cache: Arc<dyn crate::cache::CacheRepo> = Arc::new(cache);

    let warmer = Arc::new(Warmer::new(cache.clone(), db.pool.clone()));
    let jwt = Arc::new(JwtService::new(config.jwt.clone()));

    let customer_service = CustomerService::new(db.pool.clone());
    let menu_service = MenuService::new(db.pool.clone());
    let tab_service = TabService::new(db.pool.clone(), cache.clone(), warmer.clone());
    let order_service = OrderService::new(db.pool.clone(), cache.clone(), warmer.clone());

    let layers = ServiceBuilder::new().layer(TimeoutLayer::new(RPC_TIMEOUT)).layer(AuthLayer::new(jwt.clone()));

    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ServerError::Config(format!("invalid server address: {e}")))?;

    let mut builder = TonicServer::builder().layer(layers);

    match (&config.server.tls_cert_path, &config.server.tls_key_path) {
        (Some(cert_path), Some(key_path)) => {
            let cert = std::fs::read(cert_path).map_err(|e| ServerError::Config(format!("cannot read {cert_path}: {e}")))?;
            let key = std::fs::read(key_path).map_err(|e| ServerError::Config(format!("cannot read {key_path}: {e}")))?;
            let identity = Identity::from_pem(cert, key);

            tracing::info!(%addr, "gRPC server starting with TLS");
            builder = builder
                .tls_config(ServerTlsConfig::new().identity(identity))
                .map_err(|e| ServerError::Other(e.into()))?;
        }
        (None, None) => {
            tracing::warn!(%addr, "TLS_CERT_PATH/TLS_KEY_PATH unset, gRPC server starting in plaintext");
        }
        _ => {
            return Err(ServerError::Config(
                "TLS_CERT_PATH and TLS_KEY_PATH must both be set or both unset".into(),
            ));
        }
    }

    builder
        .add_service(CustomerServiceServer::new(CustomerServiceImpl::new(customer_service.clone())))
        .add_service(AuthServiceServer::new(AuthServiceImpl::new(customer_service, jwt)))
        .add_service(MenuServiceServer::new(MenuServiceImpl::new(menu_service)))
        .add_service(TabServiceServer::new(TabServiceImpl::new(tab_service)))
        .add_service(OrderServiceServer::new(OrderServiceImpl::new(order_service)))
        .serve_with_shutdown(addr, shutdown)
        .await
        .map_err(|e| ServerError::Other(e.into()))?;

    Ok(())
}
