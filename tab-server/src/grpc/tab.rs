use tonic::{Request, Response, Status};

use crate::auth::claims_from_request;
use crate::pb;
use crate::services::TabService as CoreTabService;

use super::{parse_id, to_pb_guest, to_pb_tab};

pub struct TabServiceImpl {
    service: CoreTabService,
}

impl TabServiceImpl {
    pub fn new(service: CoreTabService) -> Self {
        Self { service }
    }
}

/// `VisitTab` and `GetVisitedTabs` require the bearer token's subject to
/// match the customer id in the request; the auth middleware only
/// partitions by method path, so this check happens here where the parsed
/// request and the claims are both in scope.
fn require_matching_subject<T>(request: &Request<T>, customer: shared::ids::CustomerId) -> Result<(), Status> {
    let claims = claims_from_request(request).ok_or_else(|| Status::unauthenticated("missing claims"))?;
    if claims.sub != customer.to_string() {
        return Err(Status::permission_denied("token subject does not match customer id"));
    }
    Ok(())
}

#[tonic::async_trait]
impl pb::tab_service_server::TabService for TabServiceImpl {
    async fn create_tab(
        &self,
        _request: Request<pb::CreateTabRequest>,
    ) -> Result<Response<pb::CreateTabResponse>, Status> {
        let tab_id = self.service.create_tab().await?;
        Ok(Response::new(pb::CreateTabResponse { tab_id: tab_id.to_string() }))
    }

    async fn visit_tab(
        &self,
        request: Request<pb::VisitTabRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let tab_id = parse_id(&request.get_ref().tab_id)?;
        let customer_id = parse_id(&request.get_ref().customer_id)?;
        require_matching_subject(&request, customer_id)?;
        self.service.visit_tab(tab_id, customer_id).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn create_guest(
        &self,
        request: Request<pb::CreateGuestRequest>,
    ) -> Result<Response<pb::CreateGuestResponse>, Status> {
        let req = request.into_inner();
        let tab_id = parse_id(&req.tab_id)?;
        let guest_id = self.service.create_guest(tab_id).await?;
        Ok(Response::new(pb::CreateGuestResponse {
            guest: Some(to_pb_guest(guest_id, String::new())),
        }))
    }

    async fn update_guest_name(
        &self,
        request: Request<pb::UpdateGuestNameRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let guest_id = parse_id(&req.guest_id)?;
        self.service.update_guest_name(guest_id, &req.custom_name).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_open_tab(
        &self,
        request: Request<pb::GetOpenTabRequest>,
    ) -> Result<Response<pb::GetOpenTabResponse>, Status> {
        let req = request.into_inner();
        let tab_id = parse_id(&req.tab_id)?;
        let tab = self.service.get_open_tab(tab_id).await?;
        Ok(Response::new(pb::GetOpenTabResponse { tab: Some(to_pb_tab(&tab)) }))
    }

    async fn close_tab(
        &self,
        request: Request<pb::CloseTabRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let tab_id = parse_id(&req.tab_id)?;
        self.service.close_tab(tab_id).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_visited_tabs(
        &self,
        request: Request<pb::GetVisitedTabsRequest>,
    ) -> Result<Response<pb::GetVisitedTabsResponse>, Status> {
        let customer_id = parse_id(&request.get_ref().customer_id)?;
        require_matching_subject(&request, customer_id)?;
        let tabs = self.service.get_visited_tabs(customer_id).await?;
        Ok(Response::new(pb::GetVisitedTabsResponse {
            tabs: tabs.iter().map(to_pb_tab).collect(),
        }))
    }
}
