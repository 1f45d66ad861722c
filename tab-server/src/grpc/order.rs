use tonic::{Request, Response, Status};

use shared::model::CreateOrderItemParams;

use crate::pb;
use crate::services::OrderService as CoreOrderService;

use super::{parse_id, to_pb_order_item};

fn menu_item_id(raw: i32) -> Result<shared::ids::MenuItemId, Status> {
    i16::try_from(raw)
        .map(shared::ids::MenuItemId)
        .map_err(|_| Status::invalid_argument("menu item id out of range"))
}

fn quantity(raw: i32) -> Result<i16, Status> {
    i16::try_from(raw).map_err(|_| Status::invalid_argument("quantity out of range"))
}

pub struct OrderServiceImpl {
    service: CoreOrderService,
}

impl OrderServiceImpl {
    pub fn new(service: CoreOrderService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl pb::order_service_server::OrderService for OrderServiceImpl {
    async fn create_order_item(
        &self,
        request: Request<pb::CreateOrderItemRequest>,
    ) -> Result<Response<pb::CreateOrderItemResponse>, Status> {
        let req = request.into_inner();
        let order_id = parse_id(&req.order_id)?;
        let guest_owner_ids = req
            .guest_owner_ids
            .iter()
            .map(|s| parse_id(s))
            .collect::<Result<Vec<_>, _>>()?;
        let customer_owner_ids = req
            .customer_owner_ids
            .iter()
            .map(|s| parse_id(s))
            .collect::<Result<Vec<_>, _>>()?;

        let item = self
            .service
            .create_order_item(CreateOrderItemParams {
                order_id,
                menu_item_id: menu_item_id(req.menu_item_id)?,
                quantity: quantity(req.quantity)?,
                modifiers: req.modifiers,
                guest_owner_ids,
                customer_owner_ids,
            })
            .await?;

        Ok(Response::new(pb::CreateOrderItemResponse { order_item: Some(to_pb_order_item(&item)) }))
    }

    async fn delete_order_item(
        &self,
        request: Request<pb::DeleteOrderItemRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        self.service.delete_order_item(id).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn update_order_item_quantity(
        &self,
        request: Request<pb::UpdateOrderItemQuantityRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        self.service.update_order_item_quantity(id, quantity(req.quantity)?).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn update_order_item_modifiers(
        &self,
        request: Request<pb::UpdateOrderItemModifiersRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        self.service.update_order_item_modifiers(id, &req.modifiers).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn add_order_item_guest_owner(
        &self,
        request: Request<pb::OrderItemGuestOwnerRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        let guest = parse_id(&req.guest_id)?;
        self.service.add_order_item_guest_owner(id, guest).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn remove_order_item_guest_owner(
        &self,
        request: Request<pb::OrderItemGuestOwnerRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        let guest = parse_id(&req.guest_id)?;
        self.service.remove_order_item_guest_owner(id, guest).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn add_order_item_customer_owner(
        &self,
        request: Request<pb::OrderItemCustomerOwnerRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        let customer = parse_id(&req.customer_id)?;
        self.service.add_order_item_customer_owner(id, customer).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn remove_order_item_customer_owner(
        &self,
        request: Request<pb::OrderItemCustomerOwnerRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = parse_id(&req.order_item_id)?;
        let customer = parse_id(&req.customer_id)?;
        self.service.remove_order_item_customer_owner(id, customer).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn send_order(
        &self,
        request: Request<pb::SendOrderRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let order_id = parse_id(&req.order_id)?;
        self.service.send_order(order_id).await?;
        Ok(Response::new(pb::Empty {}))
    }
}
