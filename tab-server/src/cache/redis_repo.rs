//! Redis-backed [`CacheRepo`].

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::Pool;
use chrono::{DateTime, TimeZone, Utc};
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use shared::ids::{
    CustomerId, GuestId, OrderId, OrderItemId, ScopedOrderId, ScopedOrderItemId, TabId,
};
use shared::model::{Order, OrderItem, Tab};

use super::watch::CacheTxn;
use super::{CacheError, CacheResult, keys};

#[derive(Clone)]
pub struct RedisCacheRepo {
    pool: Pool<RedisConnectionManager>,
}

impl RedisCacheRepo {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let manager = RedisConnectionManager::new(url)?;
        let pool = Pool::builder().build(manager).await.map_err(|e| {
            CacheError::Redis(redis::RedisError::from((
                redis::ErrorKind::IoError,
                "failed to build redis pool",
                e.to_string(),
            )))
        })?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: Pool<RedisConnectionManager>) -> Self {
        Self { pool }
    }
}

fn ts_to_epoch(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

fn epoch_to_ts(v: i64) -> CacheResult<DateTime<Utc>> {
    Utc.timestamp_opt(v, 0)
        .single()
        .ok_or_else(|| CacheError::Malformed(format!("invalid timestamp: {v}")))
}

/// Shared by [`RedisCacheRepo::get_open_tab_with_orders`] and
/// [`CacheTxn::watch_and_get_order_items`]: both need to materialize an
/// order item from its three keys over whatever connection they hold.
pub(super) async fn fetch_order_item(
    conn: &mut MultiplexedConnection,
    id: OrderItemId,
) -> CacheResult<OrderItem> {
    let key = keys::order_item_key(id);
    let fields: Vec<(String, String)> = conn.hgetall(&key).await?;
    if fields.is_empty() {
        return Err(CacheError::Miss);
    }
    let mut quantity = 0i16;
    let mut modifiers = Vec::new();
    let mut menu_item_id = 0i16;
    let mut name = String::new();
    let mut description = String::new();
    let mut photo_pathinfo = String::new();
    let mut price = 0i32;
    let mut portion_size = 0i16;
    let mut modifiers_config = Vec::new();

    for (field, value) in fields {
        match field.as_str() {
            "quantity" => {
                quantity = value
                    .parse()
                    .map_err(|_| CacheError::Malformed(format!("quantity = {value}")))?
            }
            "modifiers" => modifiers = value.into_bytes(),
            "menu_item_id" => {
                menu_item_id = value
                    .parse()
                    .map_err(|_| CacheError::Malformed(format!("menu_item_id = {value}")))?
            }
            "name" => name = value,
            "description" => description = value,
            "photo_pathinfo" => photo_pathinfo = value,
            "price" => {
                price = value
                    .parse()
                    .map_err(|_| CacheError::Malformed(format!("price = {value}")))?
            }
            "portion_size" => {
                portion_size = value
                    .parse()
                    .map_err(|_| CacheError::Malformed(format!("portion_size = {value}")))?
            }
            "modifiers_config" => modifiers_config = value.into_bytes(),
            _ => {}
        }
    }

    let guest_owner_ids_raw: Vec<String> =
        conn.smembers(keys::order_item_guest_owners_key(id)).await?;
    let mut guest_owner_ids = Vec::with_capacity(guest_owner_ids_raw.len());
    for raw in guest_owner_ids_raw {
        guest_owner_ids.push(
            raw.parse::<GuestId>()
                .map_err(|e| CacheError::Malformed(e.to_string()))?,
        );
    }

    let customer_owner_ids_raw: Vec<String> =
        conn.smembers(keys::order_item_customer_owners_key(id)).await?;
    let mut customer_owner_ids = Vec::with_capacity(customer_owner_ids_raw.len());
    for raw in customer_owner_ids_raw {
        customer_owner_ids.push(
            raw.parse::<CustomerId>()
                .map_err(|e| CacheError::Malformed(e.to_string()))?,
        );
    }

    Ok(OrderItem {
        id,
        quantity,
        modifiers,
        guest_owner_ids,
        customer_owner_ids,
        menu_item_id: shared::ids::MenuItemId(menu_item_id),
        name,
        description,
        photo_pathinfo,
        price,
        portion_size,
        modifiers_config,
    })
}

#[async_trait]
impl super::CacheRepo for RedisCacheRepo {
    async fn cache_tab(&self, tab: &Tab) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let tab_key = keys::tab_key(tab.id);

        let mut fields: Vec<(&str, String)> = vec![
            ("id", tab.id.to_string()),
            ("total_price", tab.total_price.to_string()),
            ("created_at", ts_to_epoch(tab.created_at).to_string()),
        ];
        if let Some(closed_at) = tab.closed_at {
            fields.push(("closed_at", ts_to_epoch(closed_at).to_string()));
        }
        conn.hset_multiple::<_, _, ()>(&tab_key, &fields).await?;

        if !tab.custom_guest_names.is_empty() {
            let names_key = keys::tab_guest_names_key(tab.id);
            let pairs: Vec<(String, String)> = tab
                .custom_guest_names
                .iter()
                .map(|(guest, name)| (guest.scoped.0.to_string(), name.clone()))
                .collect();
            conn.hset_multiple::<_, _, ()>(&names_key, &pairs).await?;
        }

        let orders_key = keys::orders_list_key(tab.id);
        conn.del::<_, ()>(&orders_key).await?;
        for order in &tab.orders {
            if order.is_sent() {
                let encoded = serde_json::to_string(order)
                    .map_err(|e| CacheError::Malformed(e.to_string()))?;
                conn.rpush::<_, _, ()>(&orders_key, encoded).await?;
                continue;
            }
            conn.set::<_, _, ()>(keys::not_sent_order_id_key(tab.id), order.id.scoped.0)
                .await?;
            let items_key = keys::order_items_list_key(tab.id);
            for item in &order.items {
                conn.zadd::<_, _, _, ()>(&items_key, item.id.scoped.0, item.id.scoped.0)
                    .await?;
                self.cache_new_item(item).await?;
            }
        }
        Ok(())
    }

    async fn get_open_tab_with_orders(&self, tab: TabId) -> CacheResult<Option<Tab>> {
        let mut conn = self.pool.get().await?;
        let tab_key = keys::tab_key(tab);
        let header: Vec<(String, String)> = conn.hgetall(&tab_key).await?;
        if header.is_empty() {
            return Ok(None);
        }

        let mut total_price = 0i32;
        let mut created_at = Utc::now();
        let mut closed_at = None;
        for (field, value) in &header {
            match field.as_str() {
                "total_price" => {
                    total_price = value
                        .parse()
                        .map_err(|_| CacheError::Malformed(format!("total_price = {value}")))?
                }
                "created_at" => {
                    let epoch: i64 = value
                        .parse()
                        .map_err(|_| CacheError::Malformed(format!("created_at = {value}")))?;
                    created_at = epoch_to_ts(epoch)?;
                }
                "closed_at" => {
                    let epoch: i64 = value
                        .parse()
                        .map_err(|_| CacheError::Malformed(format!("closed_at = {value}")))?;
                    closed_at = Some(epoch_to_ts(epoch)?);
                }
                _ => {}
            }
        }

        let names_raw: Vec<(String, String)> =
            conn.hgetall(keys::tab_guest_names_key(tab)).await?;
        let mut custom_guest_names = Vec::with_capacity(names_raw.len());
        for (scoped, name) in names_raw {
            let scoped: i16 = scoped
                .parse()
                .map_err(|_| CacheError::Malformed(format!("guest scope = {scoped}")))?;
            custom_guest_names.push((
                GuestId { tab, scoped: shared::ids::ScopedGuestId(scoped) },
                name,
            ));
        }

        let sent_raw: Vec<String> = conn.lrange(keys::orders_list_key(tab), 0, -1).await?;
        let mut orders = Vec::with_capacity(sent_raw.len() + 1);
        for encoded in sent_raw {
            orders.push(
                serde_json::from_str::<Order>(&encoded)
                    .map_err(|e| CacheError::Malformed(e.to_string()))?,
            );
        }

        let not_sent_id: Option<String> = conn.get(keys::not_sent_order_id_key(tab)).await?;
        if let Some(scoped_str) = not_sent_id {
            let scoped: i16 = scoped_str
                .parse()
                .map_err(|_| CacheError::Malformed(format!("not_sent_order:id = {scoped_str}")))?;
            let order_id = OrderId { tab, scoped: ScopedOrderId(scoped) };

            let item_scopes: Vec<i16> =
                conn.zrange(keys::order_items_list_key(tab), 0, -1).await?;
            let mut items = Vec::with_capacity(item_scopes.len());
            for item_scope in item_scopes {
                let item_id = OrderItemId { order: order_id, scoped: ScopedOrderItemId(item_scope) };
                items.push(fetch_order_item(&mut conn, item_id).await?);
            }
            orders.push(Order { id: order_id, items, sent_at: None });
        }

        Ok(Some(Tab { id: tab, total_price, orders, custom_guest_names, created_at, closed_at }))
    }

    async fn next_item_scope(&self, tab: TabId) -> CacheResult<ScopedOrderItemId> {
        let mut conn = self.pool.get().await?;
        let next: i64 = conn.incr(keys::order_item_id_sequence_key(tab), 1).await?;
        let next: i16 = i16::try_from(next).map_err(|_| CacheError::SequenceExhausted)?;
        Ok(ScopedOrderItemId(next))
    }

    async fn set_item_quantity(&self, id: OrderItemId, quantity: i16) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.hset::<_, _, _, ()>(keys::order_item_key(id), "quantity", quantity).await?;
        Ok(())
    }

    async fn set_item_modifiers(&self, id: OrderItemId, modifiers: &[u8]) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.hset::<_, _, _, ()>(keys::order_item_key(id), "modifiers", modifiers).await?;
        Ok(())
    }

    async fn add_item_guest_owner(&self, id: OrderItemId, guest: GuestId) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(keys::order_item_guest_owners_key(id), guest.to_string())
            .await?;
        Ok(())
    }

    async fn remove_item_guest_owner(&self, id: OrderItemId, guest: GuestId) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.srem::<_, _, ()>(keys::order_item_guest_owners_key(id), guest.to_string())
            .await?;
        Ok(())
    }

    async fn add_item_customer_owner(&self, id: OrderItemId, customer: CustomerId) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.sadd::<_, _, ()>(keys::order_item_customer_owners_key(id), customer.to_string())
            .await?;
        Ok(())
    }

    async fn remove_item_customer_owner(&self, id: OrderItemId, customer: CustomerId) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.srem::<_, _, ()>(keys::order_item_customer_owners_key(id), customer.to_string())
            .await?;
        Ok(())
    }

    async fn cache_new_item(&self, item: &OrderItem) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        let key = keys::order_item_key(item.id);
        let fields: Vec<(&str, String)> = vec![
            ("quantity", item.quantity.to_string()),
            ("modifiers", String::from_utf8_lossy(&item.modifiers).into_owned()),
            ("menu_item_id", item.menu_item_id.0.to_string()),
            ("name", item.name.clone()),
            ("description", item.description.clone()),
            ("photo_pathinfo", item.photo_pathinfo.clone()),
            ("price", item.price.to_string()),
            ("portion_size", item.portion_size.to_string()),
            (
                "modifiers_config",
                String::from_utf8_lossy(&item.modifiers_config).into_owned(),
            ),
        ];
        conn.hset_multiple::<_, _, ()>(&key, &fields).await?;

        for guest in &item.guest_owner_ids {
            conn.sadd::<_, _, ()>(keys::order_item_guest_owners_key(item.id), guest.to_string())
                .await?;
        }
        for customer in &item.customer_owner_ids {
            conn.sadd::<_, _, ()>(
                keys::order_item_customer_owners_key(item.id),
                customer.to_string(),
            )
            .await?;
        }
        conn.zadd::<_, _, _, ()>(
            keys::order_items_list_key(item.id.order.tab),
            item.id.scoped.0,
            item.id.scoped.0,
        )
        .await?;
        Ok(())
    }

    async fn delete_item(&self, id: OrderItemId) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.zrem::<_, _, ()>(keys::order_items_list_key(id.order.tab), id.scoped.0).await?;
        conn.del::<_, ()>(keys::order_item_key(id)).await?;
        conn.del::<_, ()>(keys::order_item_guest_owners_key(id)).await?;
        conn.del::<_, ()>(keys::order_item_customer_owners_key(id)).await?;
        Ok(())
    }

    async fn update_guest_name(&self, guest: GuestId, name: &str) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.hset::<_, _, _, ()>(keys::tab_guest_names_key(guest.tab), guest.scoped.0, name)
            .await?;
        Ok(())
    }

    async fn invalidate_tab(&self, tab: TabId, not_sent_item_ids: &[OrderItemId]) -> CacheResult<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(keys::tab_key(tab)).await?;
        conn.del::<_, ()>(keys::tab_guest_names_key(tab)).await?;
        conn.del::<_, ()>(keys::orders_list_key(tab)).await?;
        conn.del::<_, ()>(keys::not_sent_order_id_key(tab)).await?;
        conn.del::<_, ()>(keys::order_item_id_sequence_key(tab)).await?;
        conn.del::<_, ()>(keys::order_items_list_key(tab)).await?;
        for id in not_sent_item_ids {
            conn.del::<_, ()>(keys::order_item_key(*id)).await?;
            conn.del::<_, ()>(keys::order_item_guest_owners_key(*id)).await?;
            conn.del::<_, ()>(keys::order_item_customer_owners_key(*id)).await?;
        }
        Ok(())
    }

    async fn begin_txn(&self) -> CacheResult<CacheTxn<'_>> {
        let conn = self.pool.get().await?;
        Ok(CacheTxn::new(conn))
    }
}
