use sqlx::{PgConnection, PgPool};

use shared::ids::{
    CustomerId, GuestId, MenuItemId, OrderId, OrderItemId, ScopedGuestId, ScopedOrderItemId, TabId,
};
use shared::model::{CreateOrderItemParams, Order, OrderItem};

use super::{DbError, DbResult, row_not_found};

#[derive(sqlx::FromRow)]
struct OrderSentRow {
    sent_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn order_sent_at(
    conn: &mut PgConnection,
    order: OrderId,
    lock: &str,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    let sql = format!("select sent_at from orders where tab_id = $1 and scoped_id = $2 {lock}");
    let row = sqlx::query_as::<_, OrderSentRow>(&sql)
        .bind(order.tab.0)
        .bind(order.scoped.0)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| row_not_found(format!("order {order}")))?;
    Ok(row.sent_at)
}

pub async fn get_order_for_share(
    conn: &mut PgConnection,
    order: OrderId,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    order_sent_at(conn, order, "for share").await
}

pub async fn get_order_for_no_key_update(
    conn: &mut PgConnection,
    order: OrderId,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    order_sent_at(conn, order, "for no key update").await
}

/// Rows that are currently visiting the tab, restricted to the ids the
/// caller asked to attach as owners. Mirrors the "ignore owners who aren't
/// actually visiting" guard in `CreateOrderItem`.
pub async fn is_visiting_customer_ids(
    conn: &mut PgConnection,
    tab: TabId,
    customer_ids: &[CustomerId],
) -> DbResult<Vec<CustomerId>> {
    if customer_ids.is_empty() {
        return Ok(Vec::new());
    }
    let raw: Vec<uuid::Uuid> = customer_ids.iter().map(|c| c.0).collect();
    let rows: Vec<(uuid::Uuid,)> = sqlx::query_as(
        "select customer_id from tab_visits where tab_id = $1 and customer_id = any($2)",
    )
    .bind(tab.0)
    .bind(&raw)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows.into_iter().map(|(id,)| CustomerId(id)).collect())
}

/// Scope allocation runs on its own connection, committed before the
/// surrounding transaction even starts its insert — see
/// [`crate::db::repository::tab::create_order_for_tab`] for why this must
/// not share the caller's transaction.
async fn alloc_next_item_scope(pool: &PgPool, order: OrderId) -> DbResult<i16> {
    let mut conn = pool.acquire().await?;
    let (scoped,): (i16,) = sqlx::query_as(
        "update orders set next_item_id = next_item_id + 1 where tab_id = $1 and scoped_id = $2 returning next_item_id - 1",
    )
    .bind(order.tab.0)
    .bind(order.scoped.0)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("order {order}")))?;
    Ok(scoped)
}

pub async fn create_order_item(
    pool: &PgPool,
    conn: &mut PgConnection,
    params: &CreateOrderItemParams,
    menu_item_name: &str,
    menu_item_description: &str,
    menu_item_photo_pathinfo: &str,
    menu_item_price: i32,
    menu_item_portion_size: i16,
    menu_item_modifiers_config: &[u8],
) -> DbResult<OrderItemId> {
    let order = params.order_id;
    let item_id = ScopedOrderItemId(alloc_next_item_scope(pool, order).await?);

    sqlx::query(
        r#"
        insert into order_items
            (tab_id, order_id, scoped_id, menu_item_id, quantity, modifiers,
             name, description, photo_pathinfo, price, portion_size, modifiers_config)
        values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(order.tab.0)
    .bind(order.scoped.0)
    .bind(item_id.0)
    .bind(params.menu_item_id.0)
    .bind(params.quantity)
    .bind(&params.modifiers)
    .bind(menu_item_name)
    .bind(menu_item_description)
    .bind(menu_item_photo_pathinfo)
    .bind(menu_item_price)
    .bind(menu_item_portion_size)
    .bind(menu_item_modifiers_config)
    .execute(&mut *conn)
    .await?;

    let full_id = OrderItemId { order, scoped: item_id };

    let visiting_guests: Vec<ScopedGuestId> = params
        .guest_owner_ids
        .iter()
        .filter(|g| g.tab == order.tab)
        .map(|g| g.scoped)
        .collect();
    for guest in visiting_guests {
        add_order_item_guest_owner(conn, full_id, GuestId { tab: order.tab, scoped: guest }).await?;
    }

    let visiting_customers = is_visiting_customer_ids(conn, order.tab, &params.customer_owner_ids).await?;
    for customer in visiting_customers {
        add_order_item_customer_owner(conn, full_id, customer).await?;
    }

    Ok(full_id)
}

pub async fn delete_order_item(conn: &mut PgConnection, id: OrderItemId) -> DbResult<()> {
    sqlx::query(
        "delete from order_items where tab_id = $1 and order_id = $2 and scoped_id = $3",
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn update_order_item_quantity(
    conn: &mut PgConnection,
    id: OrderItemId,
    quantity: i16,
) -> DbResult<()> {
    let result = sqlx::query(
        "update order_items set quantity = $4 where tab_id = $1 and order_id = $2 and scoped_id = $3",
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(row_not_found(format!("order item {id}")));
    }
    Ok(())
}

pub async fn update_order_item_modifiers(
    conn: &mut PgConnection,
    id: OrderItemId,
    modifiers: &[u8],
) -> DbResult<()> {
    let result = sqlx::query(
        "update order_items set modifiers = $4 where tab_id = $1 and order_id = $2 and scoped_id = $3",
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(modifiers)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(row_not_found(format!("order item {id}")));
    }
    Ok(())
}

pub async fn add_order_item_guest_owner(
    conn: &mut PgConnection,
    id: OrderItemId,
    guest: GuestId,
) -> DbResult<()> {
    sqlx::query(
        r#"
        insert into order_item_guest_owners (tab_id, order_id, item_id, guest_scoped_id)
        values ($1, $2, $3, $4)
        on conflict do nothing
        "#,
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(guest.scoped.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn remove_order_item_guest_owner(
    conn: &mut PgConnection,
    id: OrderItemId,
    guest: GuestId,
) -> DbResult<()> {
    sqlx::query(
        "delete from order_item_guest_owners where tab_id = $1 and order_id = $2 and item_id = $3 and guest_scoped_id = $4",
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(guest.scoped.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn add_order_item_customer_owner(
    conn: &mut PgConnection,
    id: OrderItemId,
    customer: CustomerId,
) -> DbResult<()> {
    sqlx::query(
        r#"
        insert into order_item_customer_owners (tab_id, order_id, item_id, customer_id)
        values ($1, $2, $3, $4)
        on conflict do nothing
        "#,
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(customer.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn remove_order_item_customer_owner(
    conn: &mut PgConnection,
    id: OrderItemId,
    customer: CustomerId,
) -> DbResult<()> {
    sqlx::query(
        "delete from order_item_customer_owners where tab_id = $1 and order_id = $2 and item_id = $3 and customer_id = $4",
    )
    .bind(id.order.tab.0)
    .bind(id.order.scoped.0)
    .bind(id.scoped.0)
    .bind(customer.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn send_order(conn: &mut PgConnection, order: OrderId) -> DbResult<()> {
    let result = sqlx::query(
        "update orders set sent_at = now() where tab_id = $1 and scoped_id = $2 and sent_at is null",
    )
    .bind(order.tab.0)
    .bind(order.scoped.0)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::FailedPrecondition);
    }
    Ok(())
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    scoped_id: i16,
    menu_item_id: i16,
    quantity: i16,
    modifiers: Vec<u8>,
    name: String,
    description: String,
    photo_pathinfo: String,
    price: i32,
    portion_size: i16,
    modifiers_config: Vec<u8>,
}

/// Shared by the order and tab repositories for materializing an order's
/// items with their owner sets.
pub(crate) async fn fetch_order_items(
    conn: &mut PgConnection,
    order: OrderId,
) -> DbResult<Vec<OrderItem>> {
    let rows = sqlx::query_as::<_, OrderItemRow>(
        r#"
        select scoped_id, menu_item_id, quantity, modifiers, name, description,
               photo_pathinfo, price, portion_size, modifiers_config
        from order_items
        where tab_id = $1 and order_id = $2
        order by scoped_id
        "#,
    )
    .bind(order.tab.0)
    .bind(order.scoped.0)
    .fetch_all(&mut *conn)
    .await?;

    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let id = OrderItemId { order, scoped: ScopedOrderItemId(row.scoped_id) };

        let guest_rows: Vec<(i16,)> = sqlx::query_as(
            "select guest_scoped_id from order_item_guest_owners where tab_id = $1 and order_id = $2 and item_id = $3",
        )
        .bind(order.tab.0)
        .bind(order.scoped.0)
        .bind(row.scoped_id)
        .fetch_all(&mut *conn)
        .await?;
        let guest_owner_ids = guest_rows
            .into_iter()
            .map(|(scoped,)| GuestId { tab: order.tab, scoped: ScopedGuestId(scoped) })
            .collect();

        let customer_rows: Vec<(uuid::Uuid,)> = sqlx::query_as(
            "select customer_id from order_item_customer_owners where tab_id = $1 and order_id = $2 and item_id = $3",
        )
        .bind(order.tab.0)
        .bind(order.scoped.0)
        .bind(row.scoped_id)
        .fetch_all(&mut *conn)
        .await?;
        let customer_owner_ids = customer_rows.into_iter().map(|(id,)| CustomerId(id)).collect();

        items.push(OrderItem {
            id,
            quantity: row.quantity,
            modifiers: row.modifiers,
            guest_owner_ids,
            customer_owner_ids,
            menu_item_id: MenuItemId(row.menu_item_id),
            name: row.name,
            description: row.description,
            photo_pathinfo: row.photo_pathinfo,
            price: row.price,
            portion_size: row.portion_size,
            modifiers_config: row.modifiers_config,
        });
    }
    Ok(items)
}

pub async fn get_order_with_items(conn: &mut PgConnection, order: OrderId) -> DbResult<Order> {
    let sent_at = order_sent_at(conn, order, "").await?;
    let items = fetch_order_items(conn, order).await?;
    Ok(Order { id: order, items, sent_at })
}
