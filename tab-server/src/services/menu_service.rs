use sqlx::PgPool;

use shared::ids::MenuItemId;
use shared::model::{CreateMenuItemParams, MenuItem, UpdateMenuItemParams};
use shared::{CoreError, CoreResult};

use crate::db::repository::menu;

#[derive(Clone)]
pub struct MenuService {
    pool: PgPool,
}

impl MenuService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_menu_item(&self, params: CreateMenuItemParams) -> CoreResult<MenuItem> {
        validate(&params)?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        Ok(menu::create_menu_item(&mut conn, &params).await?)
    }

    pub async fn update_menu_item(&self, id: MenuItemId, params: UpdateMenuItemParams) -> CoreResult<MenuItem> {
        validate(&params)?;
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        Ok(menu::update_menu_item(&mut conn, id, &params).await?)
    }

    pub async fn delete_menu_item(&self, id: MenuItemId) -> CoreResult<()> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        menu::soft_delete_menu_item(&mut conn, id).await?;
        Ok(())
    }

    pub async fn get_menu_item(&self, id: MenuItemId) -> CoreResult<MenuItem> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let item = menu::get_menu_item(&mut conn, id).await?;
        if item.deleted_at.is_some() {
            return Err(CoreError::not_found(format!("menu item {id}")));
        }
        Ok(item)
    }

    pub async fn list_menu_items(&self) -> CoreResult<Vec<MenuItem>> {
        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        Ok(menu::list_menu_items(&mut conn).await?)
    }
}

fn validate(params: &CreateMenuItemParams) -> CoreResult<()> {
    if params.name.trim().is_empty() {
        return Err(CoreError::invalid_argument("menu item name must not be empty"));
    }
    if params.price < 0 {
        return Err(CoreError::invalid_argument("price must not be negative"));
    }
    if params.portion_size < 1 {
        return Err(CoreError::invalid_argument("portion_size must be at least 1"));
    }
    Ok(())
}

fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::internal(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> CreateMenuItemParams {
        CreateMenuItemParams {
            name: "Dumplings".into(),
            description: "Pan-fried".into(),
            photo_pathinfo: "dumplings.jpg".into(),
            price: 1200,
            portion_size: 6,
            available: true,
            modifiers_config: Vec::new(),
        }
    }

    #[test]
    fn accepts_well_formed_params() {
        assert!(validate(&params()).is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        let mut p = params();
        p.name = "  ".into();
        assert!(matches!(validate(&p).unwrap_err(), CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_negative_price() {
        let mut p = params();
        p.price = -1;
        assert!(matches!(validate(&p).unwrap_err(), CoreError::InvalidArgument { .. }));
    }

    #[test]
    fn rejects_zero_portion_size() {
        let mut p = params();
        p.portion_size = 0;
        assert!(matches!(validate(&p).unwrap_err(), CoreError::InvalidArgument { .. }));
    }
}
