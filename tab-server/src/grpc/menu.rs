use tonic::{Request, Response, Status};

use shared::model::CreateMenuItemParams;

use crate::pb;
use crate::services::MenuService as CoreMenuService;

use super::to_pb_menu_item;

fn menu_item_id(raw: i32) -> Result<shared::ids::MenuItemId, Status> {
    i16::try_from(raw)
        .map(shared::ids::MenuItemId)
        .map_err(|_| Status::invalid_argument("menu item id out of range"))
}

pub struct MenuServiceImpl {
    service: CoreMenuService,
}

impl MenuServiceImpl {
    pub fn new(service: CoreMenuService) -> Self {
        Self { service }
    }
}

#[tonic::async_trait]
impl pb::menu_service_server::MenuService for MenuServiceImpl {
    async fn create_menu_item(
        &self,
        request: Request<pb::CreateMenuItemRequest>,
    ) -> Result<Response<pb::CreateMenuItemResponse>, Status> {
        let req = request.into_inner();
        let item = self
            .service
            .create_menu_item(CreateMenuItemParams {
                name: req.name,
                description: req.description,
                photo_pathinfo: req.photo_pathinfo,
                price: req.price,
                portion_size: req.portion_size as i16,
                available: req.available,
                modifiers_config: req.modifiers_config,
            })
            .await?;
        Ok(Response::new(pb::CreateMenuItemResponse { menu_item: Some(to_pb_menu_item(&item)) }))
    }

    async fn update_menu_item(
        &self,
        request: Request<pb::UpdateMenuItemRequest>,
    ) -> Result<Response<pb::UpdateMenuItemResponse>, Status> {
        let req = request.into_inner();
        let id = menu_item_id(req.id)?;
        let item = self
            .service
            .update_menu_item(
                id,
                CreateMenuItemParams {
                    name: req.name,
                    description: req.description,
                    photo_pathinfo: req.photo_pathinfo,
                    price: req.price,
                    portion_size: req.portion_size as i16,
                    available: req.available,
                    modifiers_config: req.modifiers_config,
                },
            )
            .await?;
        Ok(Response::new(pb::UpdateMenuItemResponse { menu_item: Some(to_pb_menu_item(&item)) }))
    }

    async fn delete_menu_item(
        &self,
        request: Request<pb::DeleteMenuItemRequest>,
    ) -> Result<Response<pb::Empty>, Status> {
        let req = request.into_inner();
        let id = menu_item_id(req.id)?;
        self.service.delete_menu_item(id).await?;
        Ok(Response::new(pb::Empty {}))
    }

    async fn get_menu_item(
        &self,
        request: Request<pb::GetMenuItemRequest>,
    ) -> Result<Response<pb::GetMenuItemResponse>, Status> {
        let req = request.into_inner();
        let id = menu_item_id(req.id)?;
        let item = self.service.get_menu_item(id).await?;
        Ok(Response::new(pb::GetMenuItemResponse { menu_item: Some(to_pb_menu_item(&item)) }))
    }

    async fn list_menu_items(
        &self,
        _request: Request<pb::ListMenuItemsRequest>,
    ) -> Result<Response<pb::ListMenuItemsResponse>, Status> {
        let items = self.service.list_menu_items().await?;
        Ok(Response::new(pb::ListMenuItemsResponse {
            menu_items: items.iter().map(to_pb_menu_item).collect(),
        }))
    }
}
