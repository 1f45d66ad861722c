use tonic::{Request, Response, Status};

use shared::model::CreateCustomerParams;

use crate::pb;
use crate::services::CustomerService as CoreCustomerService;

use super::{parse_id, to_pb_customer};

pub struct CustomerServiceImpl {
    service: CoreCustomerService,
}

impl CustomerServiceImpl {
    pub fn new(service: CoreCustomerService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl pb::customer_service_server::CustomerService for CustomerServiceImpl {
    async fn create_customer(
        &self,
        request: Request<pb::CreateCustomerRequest>,
    ) -> Result<Response<pb::CreateCustomerResponse>, Status> {
        let req = request.into_inner();
        let customer = self
            .service
            .create(CreateCustomerParams {
                login_id: req.login_id,
                email: req.email,
                password: req.password,
                name: req.name,
                phone_number: req.phone_number,
            })
            .await?;
        Ok(Response::new(pb::CreateCustomerResponse { customer: Some(to_pb_customer(&customer)) }))
    }

    async fn get_customer_by_id(
        &self,
        request: Request<pb::GetCustomerByIdRequest>,
    ) -> Result<Response<pb::GetCustomerByIdResponse>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.id)?;
        let customer = self.service.get_by_id(id).await?;
        Ok(Response::new(pb::GetCustomerByIdResponse { customer: Some(to_pb_customer(&customer)) }))
    }
}
