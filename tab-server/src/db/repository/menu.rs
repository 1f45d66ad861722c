use sqlx::PgConnection;

use shared::ids::MenuItemId;
use shared::model::{CreateMenuItemParams, MenuItem, UpdateMenuItemParams};

use super::{DbResult, row_not_found};

pub async fn create_menu_item(
    conn: &mut PgConnection,
    params: &CreateMenuItemParams,
) -> DbResult<MenuItem> {
    let row = sqlx::query_as::<_, MenuItemRow>(
        r#"
        insert into menu_items (name, description, photo_pathinfo, price, portion_size, available, modifiers_config)
        values ($1, $2, $3, $4, $5, $6, $7)
        returning id, name, description, photo_pathinfo, price, portion_size, available, modifiers_config, created_at, deleted_at
        "#,
    )
    .bind(&params.name)
    .bind(&params.description)
    .bind(&params.photo_pathinfo)
    .bind(params.price)
    .bind(params.portion_size)
    .bind(params.available)
    .bind(&params.modifiers_config)
    .fetch_one(&mut *conn)
    .await?;
    Ok(row.into())
}

pub async fn update_menu_item(
    conn: &mut PgConnection,
    id: MenuItemId,
    params: &UpdateMenuItemParams,
) -> DbResult<MenuItem> {
    let row = sqlx::query_as::<_, MenuItemRow>(
        r#"
        update menu_items
        set name = $2, description = $3, photo_pathinfo = $4, price = $5, portion_size = $6,
            available = $7, modifiers_config = $8
        where id = $1
        returning id, name, description, photo_pathinfo, price, portion_size, available, modifiers_config, created_at, deleted_at
        "#,
    )
    .bind(id.0)
    .bind(&params.name)
    .bind(&params.description)
    .bind(&params.photo_pathinfo)
    .bind(params.price)
    .bind(params.portion_size)
    .bind(params.available)
    .bind(&params.modifiers_config)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("menu item {id}")))?;
    Ok(row.into())
}

pub async fn soft_delete_menu_item(conn: &mut PgConnection, id: MenuItemId) -> DbResult<()> {
    sqlx::query("update menu_items set deleted_at = now(), available = false where id = $1")
        .bind(id.0)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn get_menu_item(conn: &mut PgConnection, id: MenuItemId) -> DbResult<MenuItem> {
    let row = sqlx::query_as::<_, MenuItemRow>(
        "select id, name, description, photo_pathinfo, price, portion_size, available, modifiers_config, created_at, deleted_at from menu_items where id = $1",
    )
    .bind(id.0)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("menu item {id}")))?;
    Ok(row.into())
}

pub async fn list_menu_items(conn: &mut PgConnection) -> DbResult<Vec<MenuItem>> {
    let rows = sqlx::query_as::<_, MenuItemRow>(
        "select id, name, description, photo_pathinfo, price, portion_size, available, modifiers_config, created_at, deleted_at from menu_items where deleted_at is null order by id",
    )
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(Into::into).collect())
}

#[derive(sqlx::FromRow)]
struct MenuItemRow {
    id: i16,
    name: String,
    description: String,
    photo_pathinfo: String,
    price: i32,
    portion_size: i16,
    available: bool,
    modifiers_config: Vec<u8>,
    created_at: chrono::DateTime<chrono::Utc>,
    deleted_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        MenuItem {
            id: MenuItemId(row.id),
            name: row.name,
            description: row.description,
            photo_pathinfo: row.photo_pathinfo,
            price: row.price,
            portion_size: row.portion_size,
            available: row.available,
            modifiers_config: row.modifiers_config,
            menu_tag_ids: Vec::new(),
            created_at: row.created_at,
            deleted_at: row.deleted_at,
        }
    }
}
