//! gRPC auth middleware: partitions full method names into open / customer /
//! admin, attaches [`Claims`] to the request extensions on success.
//!
//! Implemented as a `tower::Layer` rather than a `tonic::Interceptor`
//! because a single server multiplexes several generated services and only
//! the raw HTTP path (`/restaurant.TabService/CreateTab`) tells them apart.

use std::sync::Arc;
use std::task::{Context, Poll};

use http::{Request, Response};
use tonic::Status;
use tonic::body::BoxBody;
use tower::{Layer, Service};

use super::jwt::{Claims, JwtService, Role};

const OPEN_METHODS: &[&str] = &[
    "/restaurant.CustomerService/CreateCustomer",
    "/restaurant.AuthService/GenerateToken",
    "/restaurant.MenuService/GetMenuItem",
    "/restaurant.MenuService/ListMenuItems",
    "/restaurant.OrderService/CreateOrderItem",
    "/restaurant.OrderService/DeleteOrderItem",
    "/restaurant.OrderService/UpdateOrderItemModifiers",
    "/restaurant.OrderService/UpdateOrderItemQuantity",
    "/restaurant.OrderService/AddOrderItemGuestOwner",
    "/restaurant.OrderService/RemoveOrderItemGuestOwner",
    "/restaurant.OrderService/AddOrderItemCustomerOwner",
    "/restaurant.OrderService/RemoveOrderItemCustomerOwner",
    "/restaurant.OrderService/SendOrder",
    "/restaurant.TabService/CreateGuest",
    "/restaurant.TabService/UpdateGuestName",
    "/restaurant.TabService/GetOpenTab",
    "/restaurant.TabService/CloseTab",
];

const ADMIN_METHODS: &[&str] = &[
    "/restaurant.MenuService/CreateMenuItem",
    "/restaurant.MenuService/UpdateMenuItem",
    "/restaurant.MenuService/DeleteMenuItem",
    "/restaurant.TabService/CreateTab",
];

#[derive(Clone)]
pub struct AuthLayer {
    jwt: Arc<JwtService>,
}

impl AuthLayer {
    pub fn new(jwt: Arc<JwtService>) -> Self {
        Self { jwt }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthMiddleware { inner, jwt: self.jwt.clone() }
    }
}

#[derive(Clone)]
pub struct AuthMiddleware<S> {
    inner: S,
    jwt: Arc<JwtService>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for AuthMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<BoxBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<Box<dyn std::error::Error + Send + Sync>> + Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let path = req.uri().path().to_string();
        let jwt = self.jwt.clone();
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            if OPEN_METHODS.contains(&path.as_str()) {
                return inner.call(req).await;
            }

            match authenticate(&jwt, &req, &path) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    inner.call(req).await
                }
                Err(status) => Ok(status.to_http()),
            }
        })
    }
}

fn authenticate<B>(jwt: &JwtService, req: &Request<B>, path: &str) -> Result<Claims, Status> {
    let header = req
        .headers()
        .get("authorization")
        .ok_or_else(|| Status::unauthenticated("authorization metadata missing"))?
        .to_str()
        .map_err(|_| Status::invalid_argument("malformed authorization header"))?;

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| Status::unauthenticated("missing bearer prefix"))?;

    let claims = jwt
        .validate_token(token)
        .map_err(|_| Status::unauthenticated("invalid token"))?;

    if ADMIN_METHODS.contains(&path) && claims.role != Role::Admin {
        return Err(Status::permission_denied("not authorized"));
    }

    Ok(claims)
}

pub fn claims_from_request<T>(req: &tonic::Request<T>) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}
