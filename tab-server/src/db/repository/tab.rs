use sqlx::{PgConnection, PgPool};

use shared::ids::{CustomerId, GuestId, OrderId, ScopedGuestId, ScopedOrderId, TabId};
use shared::model::Tab;

use super::order::fetch_order_items;
use super::{DbError, DbResult, row_not_found};

pub async fn create_tab(pool: &PgPool, conn: &mut PgConnection) -> DbResult<TabId> {
    let (id,): (uuid::Uuid,) =
        sqlx::query_as("insert into tabs default values returning id").fetch_one(&mut *conn).await?;
    let tab = TabId(id);
    create_order_for_tab(pool, conn, tab).await?;
    Ok(tab)
}

/// Allocates the tab's next scoped order id and opens a fresh not-sent
/// order for it. Used both by `create_tab` and by `SendOrder`'s successor.
///
/// The scope is allocated on its own connection, outside `conn`'s
/// transaction: a plain `UPDATE ... RETURNING` sharing the caller's
/// transaction would give the counter back if that transaction rolled
/// back, letting a later caller reuse the same scope. Committing the
/// allocation immediately means a rollback can only leave a gap, never a
/// collision.
pub async fn create_order_for_tab(pool: &PgPool, conn: &mut PgConnection, tab: TabId) -> DbResult<OrderId> {
    let scoped = alloc_next_order_scope(pool, tab).await?;

    sqlx::query("insert into orders (tab_id, scoped_id) values ($1, $2)")
        .bind(tab.0)
        .bind(scoped)
        .execute(&mut *conn)
        .await?;

    Ok(OrderId { tab, scoped: ScopedOrderId(scoped) })
}

async fn alloc_next_order_scope(pool: &PgPool, tab: TabId) -> DbResult<i16> {
    let mut conn = pool.acquire().await?;
    let (scoped,): (i16,) = sqlx::query_as(
        "update tabs set next_order_id = next_order_id + 1 where id = $1 returning next_order_id - 1",
    )
    .bind(tab.0)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("tab {tab}")))?;
    Ok(scoped)
}

async fn tab_closed_at(
    conn: &mut PgConnection,
    tab: TabId,
    lock: &str,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    let sql = format!("select closed_at from tabs where id = $1 {lock}");
    let row: Option<(Option<chrono::DateTime<chrono::Utc>>,)> =
        sqlx::query_as(&sql).bind(tab.0).fetch_optional(&mut *conn).await?;
    row.map(|(v,)| v).ok_or_else(|| row_not_found(format!("tab {tab}")))
}

pub async fn get_tab_for_share(
    conn: &mut PgConnection,
    tab: TabId,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    tab_closed_at(conn, tab, "for share").await
}

pub async fn get_tab_for_no_key_update(
    conn: &mut PgConnection,
    tab: TabId,
) -> DbResult<Option<chrono::DateTime<chrono::Utc>>> {
    tab_closed_at(conn, tab, "for no key update").await
}

pub async fn visit_tab(conn: &mut PgConnection, tab: TabId, customer: CustomerId) -> DbResult<()> {
    sqlx::query(
        "insert into tab_visits (tab_id, customer_id) values ($1, $2) on conflict do nothing",
    )
    .bind(tab.0)
    .bind(customer.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn create_guest(pool: &PgPool, conn: &mut PgConnection, tab: TabId) -> DbResult<ScopedGuestId> {
    let mut scope_conn = pool.acquire().await?;
    let (scoped,): (i16,) = sqlx::query_as(
        "update tabs set next_guest_id = next_guest_id + 1 where id = $1 returning next_guest_id - 1",
    )
    .bind(tab.0)
    .fetch_optional(&mut *scope_conn)
    .await?
    .ok_or_else(|| row_not_found(format!("tab {tab}")))?;
    drop(scope_conn);

    sqlx::query("insert into guests (tab_id, scoped_id) values ($1, $2)")
        .bind(tab.0)
        .bind(scoped)
        .execute(&mut *conn)
        .await?;

    Ok(ScopedGuestId(scoped))
}

pub async fn update_guest_name(conn: &mut PgConnection, guest: GuestId, name: &str) -> DbResult<()> {
    let result = sqlx::query("update guests set custom_name = $3 where tab_id = $1 and scoped_id = $2")
        .bind(guest.tab.0)
        .bind(guest.scoped.0)
        .bind(name)
        .execute(&mut *conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(row_not_found(format!("guest {guest}")));
    }
    Ok(())
}

pub async fn delete_not_sent_orders(conn: &mut PgConnection, tab: TabId) -> DbResult<Vec<ScopedOrderId>> {
    let rows: Vec<(i16,)> =
        sqlx::query_as("delete from orders where tab_id = $1 and sent_at is null returning scoped_id")
            .bind(tab.0)
            .fetch_all(&mut *conn)
            .await?;
    Ok(rows.into_iter().map(|(s,)| ScopedOrderId(s)).collect())
}

pub async fn close_tab(conn: &mut PgConnection, tab: TabId) -> DbResult<chrono::DateTime<chrono::Utc>> {
    let row: Option<(chrono::DateTime<chrono::Utc>,)> = sqlx::query_as(
        "update tabs set closed_at = now() where id = $1 and closed_at is null returning closed_at",
    )
    .bind(tab.0)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(|(v,)| v).ok_or(DbError::FailedPrecondition)
}

pub async fn update_tab_total_price(conn: &mut PgConnection, tab: TabId) -> DbResult<()> {
    sqlx::query(
        r#"
        update tabs set total_price = coalesce((
            select sum(oi.price * oi.quantity)
            from order_items oi
            join orders o on o.tab_id = oi.tab_id and o.scoped_id = oi.order_id
            where o.tab_id = $1 and o.sent_at is not null
        ), 0)
        where id = $1
        "#,
    )
    .bind(tab.0)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

struct TabHeader {
    total_price: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    closed_at: Option<chrono::DateTime<chrono::Utc>>,
}

async fn assemble_tab(conn: &mut PgConnection, tab: TabId, header: TabHeader) -> DbResult<Tab> {
    let name_rows: Vec<(i16, String)> =
        sqlx::query_as("select scoped_id, custom_name from guests where tab_id = $1 and custom_name != ''")
            .bind(tab.0)
            .fetch_all(&mut *conn)
            .await?;
    let custom_guest_names = name_rows
        .into_iter()
        .map(|(scoped, name)| (GuestId { tab, scoped: ScopedGuestId(scoped) }, name))
        .collect();

    let order_scopes: Vec<(i16,)> =
        sqlx::query_as("select scoped_id from orders where tab_id = $1 order by scoped_id")
            .bind(tab.0)
            .fetch_all(&mut *conn)
            .await?;

    let mut orders = Vec::with_capacity(order_scopes.len());
    for (scoped,) in order_scopes {
        let order_id = OrderId { tab, scoped: ScopedOrderId(scoped) };
        let sent_at: (Option<chrono::DateTime<chrono::Utc>>,) =
            sqlx::query_as("select sent_at from orders where tab_id = $1 and scoped_id = $2")
                .bind(tab.0)
                .bind(scoped)
                .fetch_one(&mut *conn)
                .await?;
        let items = fetch_order_items(conn, order_id).await?;
        orders.push(shared::model::Order { id: order_id, items, sent_at: sent_at.0 });
    }

    Ok(Tab {
        id: tab,
        total_price: header.total_price,
        orders,
        custom_guest_names,
        created_at: header.created_at,
        closed_at: header.closed_at,
    })
}

pub async fn get_open_tab_with_orders(conn: &mut PgConnection, tab: TabId) -> DbResult<Option<Tab>> {
    let header: Option<(i32, chrono::DateTime<chrono::Utc>, Option<chrono::DateTime<chrono::Utc>>)> =
        sqlx::query_as("select total_price, created_at, closed_at from tabs where id = $1")
            .bind(tab.0)
            .fetch_optional(&mut *conn)
            .await?;
    let Some((total_price, created_at, closed_at)) = header else {
        return Ok(None);
    };
    Ok(Some(assemble_tab(conn, tab, TabHeader { total_price, created_at, closed_at }).await?))
}

/// Same assembly as [`get_open_tab_with_orders`], but locks the tab row
/// `FOR SHARE` first and fails if the tab doesn't exist — used by the
/// [`crate::warmer`] read-through path inside its own transaction.
pub async fn get_tab_with_orders_for_share(conn: &mut PgConnection, tab: TabId) -> DbResult<Tab> {
    let header: (i32, chrono::DateTime<chrono::Utc>, Option<chrono::DateTime<chrono::Utc>>) = sqlx::query_as(
        "select total_price, created_at, closed_at from tabs where id = $1 for share",
    )
    .bind(tab.0)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| row_not_found(format!("tab {tab}")))?;
    assemble_tab(conn, tab, TabHeader { total_price: header.0, created_at: header.1, closed_at: header.2 }).await
}

pub async fn get_visited_tabs_with_orders(conn: &mut PgConnection, customer: CustomerId) -> DbResult<Vec<Tab>> {
    let tab_ids: Vec<(uuid::Uuid,)> =
        sqlx::query_as("select tab_id from tab_visits where customer_id = $1")
            .bind(customer.0)
            .fetch_all(&mut *conn)
            .await?;

    let mut tabs = Vec::with_capacity(tab_ids.len());
    for (id,) in tab_ids {
        if let Some(tab) = get_open_tab_with_orders(conn, TabId(id)).await? {
            tabs.push(tab);
        }
    }
    Ok(tabs)
}
