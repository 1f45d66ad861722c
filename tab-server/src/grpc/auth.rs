use std::sync::Arc;

use tonic::{Request, Response, Status};

use crate::auth::{JwtService, Role};
use crate::pb;
use crate::services::CustomerService;

pub struct AuthServiceImpl {
    customers: CustomerService,
    jwt: Arc<JwtService>,
}

impl AuthServiceImpl {
    pub fn new(customers: CustomerService, jwt: Arc<JwtService>) -> Self {
        Self { customers, jwt }
    }
}

#[tonic::async_trait]
impl pb::auth_service_server::AuthService for AuthServiceImpl {
    async fn generate_token(
        &self,
        request: Request<pb::GenerateTokenRequest>,
    ) -> Result<Response<pb::GenerateTokenResponse>, Status> {
        let req = request.into_inner();
        let customer_id = self.customers.verify_login(&req.login_id, &req.password).await?;
        let token = self
            .jwt
            .generate_token(&customer_id.to_string(), Role::Customer)
            .map_err(|e| Status::internal(e.to_string()))?;
        Ok(Response::new(pb::GenerateTokenResponse { token }))
    }
}
