//! The optimistic watch/transact primitive. A [`CacheTxn`] owns a single
//! dedicated Redis connection for the lifetime of the block: WATCH state is
//! per-connection, so it cannot be served out of a shared multiplexed
//! connection the way plain reads/writes are.

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::PooledConnection;
use redis::AsyncCommands;

use shared::ids::{CustomerId, GuestId, OrderId, OrderItemId, ScopedOrderId, ScopedOrderItemId, TabId};
use shared::model::OrderItem;

use super::{CacheError, CacheResult, keys};

/// Outcome of a committed transaction: `Aborted` means a watched key changed
/// and the caller should retry the whole block from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    Aborted,
}

pub struct CacheTxn<'a> {
    conn: PooledConnection<'a, RedisConnectionManager>,
    pipe: redis::Pipeline,
    watched: bool,
}

impl<'a> CacheTxn<'a> {
    pub(crate) fn new(conn: PooledConnection<'a, RedisConnectionManager>) -> Self {
        let mut pipe = redis::pipe();
        pipe.atomic();
        Self { conn, pipe, watched: false }
    }

    async fn watch(&mut self, keys: &[String]) -> CacheResult<()> {
        let mut cmd = redis::cmd("WATCH");
        for k in keys {
            cmd.arg(k);
        }
        cmd.query_async::<()>(&mut *self.conn).await?;
        self.watched = true;
        Ok(())
    }

    /// Watches `tab:{T}:not_sent_order:id` and reports whether it still
    /// equals `order.scoped`.
    pub async fn watch_and_check_order_not_sent(&mut self, order: OrderId) -> CacheResult<bool> {
        let key = keys::not_sent_order_id_key(order.tab);
        self.watch(&[key.clone()]).await?;
        let current: Option<String> = self.conn.get(&key).await?;
        let Some(current) = current else {
            return Err(CacheError::Miss);
        };
        let current: i16 = current
            .parse()
            .map_err(|_| CacheError::Malformed(format!("not_sent_order:id = {current}")))?;
        Ok(current == order.scoped.0)
    }

    /// Watches the not-sent-order id and its item index, returns both.
    pub async fn watch_and_get_not_sent_order_and_items(
        &mut self,
        tab: TabId,
    ) -> CacheResult<(OrderId, Vec<OrderItemId>)> {
        let id_key = keys::not_sent_order_id_key(tab);
        let items_key = keys::order_items_list_key(tab);
        self.watch(&[id_key.clone(), items_key.clone()]).await?;

        let order_id_str: Option<String> = self.conn.get(&id_key).await?;
        let Some(order_id_str) = order_id_str else {
            return Err(CacheError::Miss);
        };
        let scoped: i16 = order_id_str
            .parse()
            .map_err(|_| CacheError::Malformed(format!("not_sent_order:id = {order_id_str}")))?;
        let order = OrderId { tab, scoped: ScopedOrderId(scoped) };

        let item_ids_str: Vec<String> = self.conn.zrange(&items_key, 0, -1).await?;
        let mut item_ids = Vec::with_capacity(item_ids_str.len());
        for s in item_ids_str {
            let scoped: i16 = s
                .parse()
                .map_err(|_| CacheError::Malformed(format!("order_items entry = {s}")))?;
            item_ids.push(OrderItemId { order, scoped: ScopedOrderItemId(scoped) });
        }
        Ok((order, item_ids))
    }

    /// Watches every item's three keys and returns them fully materialized.
    pub async fn watch_and_get_order_items(
        &mut self,
        ids: &[OrderItemId],
    ) -> CacheResult<Vec<OrderItem>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut watch_keys = Vec::with_capacity(ids.len() * 3);
        for id in ids {
            watch_keys.push(keys::order_item_key(*id));
            watch_keys.push(keys::order_item_guest_owners_key(*id));
            watch_keys.push(keys::order_item_customer_owners_key(*id));
        }
        self.watch(&watch_keys).await?;

        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            items.push(super::redis_repo::fetch_order_item(&mut self.conn, *id).await?);
        }
        Ok(items)
    }

    pub fn queue_set_item_quantity(&mut self, id: OrderItemId, quantity: i16) -> &mut Self {
        self.pipe.hset(keys::order_item_key(id), "quantity", quantity);
        self
    }

    pub fn queue_set_item_modifiers(&mut self, id: OrderItemId, modifiers: &[u8]) -> &mut Self {
        self.pipe.hset(keys::order_item_key(id), "modifiers", modifiers);
        self
    }

    pub fn queue_add_item_guest_owner(&mut self, id: OrderItemId, guest: GuestId) -> &mut Self {
        self.pipe.sadd(keys::order_item_guest_owners_key(id), guest.to_string());
        self
    }

    pub fn queue_remove_item_guest_owner(&mut self, id: OrderItemId, guest: GuestId) -> &mut Self {
        self.pipe.srem(keys::order_item_guest_owners_key(id), guest.to_string());
        self
    }

    pub fn queue_add_item_customer_owner(&mut self, id: OrderItemId, customer: CustomerId) -> &mut Self {
        self.pipe.sadd(keys::order_item_customer_owners_key(id), customer.to_string());
        self
    }

    pub fn queue_remove_item_customer_owner(&mut self, id: OrderItemId, customer: CustomerId) -> &mut Self {
        self.pipe.srem(keys::order_item_customer_owners_key(id), customer.to_string());
        self
    }

    pub fn queue_cache_new_item(&mut self, item: &OrderItem) -> &mut Self {
        let key = keys::order_item_key(item.id);
        self.pipe
            .hset(&key, "quantity", item.quantity)
            .hset(&key, "modifiers", item.modifiers.clone())
            .hset(&key, "menu_item_id", item.menu_item_id.0)
            .hset(&key, "name", item.name.clone())
            .hset(&key, "description", item.description.clone())
            .hset(&key, "photo_pathinfo", item.photo_pathinfo.clone())
            .hset(&key, "price", item.price)
            .hset(&key, "portion_size", item.portion_size)
            .hset(&key, "modifiers_config", item.modifiers_config.clone());
        for guest in &item.guest_owner_ids {
            self.pipe.sadd(keys::order_item_guest_owners_key(item.id), guest.to_string());
        }
        for customer in &item.customer_owner_ids {
            self.pipe
                .sadd(keys::order_item_customer_owners_key(item.id), customer.to_string());
        }
        self.pipe.zadd(
            keys::order_items_list_key(item.id.order.tab),
            item.id.scoped.0,
            item.id.scoped.0,
        );
        self
    }

    pub fn queue_delete_item(&mut self, id: OrderItemId) -> &mut Self {
        self.pipe.zrem(keys::order_items_list_key(id.order.tab), id.scoped.0);
        self.pipe.del(keys::order_item_key(id));
        self.pipe.del(keys::order_item_guest_owners_key(id));
        self.pipe.del(keys::order_item_customer_owners_key(id));
        self
    }

    pub fn queue_delete_order_items(&mut self, tab: TabId, ids: &[OrderItemId]) -> &mut Self {
        self.pipe.del(keys::order_items_list_key(tab));
        self.pipe.del(keys::order_item_id_sequence_key(tab));
        self.pipe.del(keys::not_sent_order_id_key(tab));
        for id in ids {
            self.pipe.del(keys::order_item_key(*id));
            self.pipe.del(keys::order_item_guest_owners_key(*id));
            self.pipe.del(keys::order_item_customer_owners_key(*id));
        }
        self
    }

    pub fn queue_set_not_sent_order(&mut self, order: OrderId) -> &mut Self {
        self.pipe.set(keys::not_sent_order_id_key(order.tab), order.scoped.0);
        self
    }

    pub fn queue_invalidate_tab(&mut self, tab: TabId, not_sent_item_ids: &[OrderItemId]) -> &mut Self {
        self.pipe.del(keys::tab_key(tab));
        self.pipe.del(keys::tab_guest_names_key(tab));
        self.pipe.del(keys::orders_list_key(tab));
        self.pipe.del(keys::not_sent_order_id_key(tab));
        self.pipe.del(keys::order_item_id_sequence_key(tab));
        self.pipe.del(keys::order_items_list_key(tab));
        for id in not_sent_item_ids {
            self.pipe.del(keys::order_item_key(*id));
            self.pipe.del(keys::order_item_guest_owners_key(*id));
            self.pipe.del(keys::order_item_customer_owners_key(*id));
        }
        self
    }

    /// Executes the queued pipeline inside MULTI/EXEC. Returns
    /// `TxOutcome::Aborted` if a watched key changed since `watch()`, in
    /// which case the caller should retry the whole block.
    pub async fn commit(mut self) -> CacheResult<TxOutcome> {
        if !self.watched {
            // Nothing was watched; still need to clear any stray WATCH state.
            let result: redis::Value = self.pipe.query_async(&mut *self.conn).await?;
            let _ = result;
            return Ok(TxOutcome::Committed);
        }
        let result: Option<redis::Value> =
            self.pipe.query_async::<Option<redis::Value>>(&mut *self.conn).await?;
        match result {
            Some(_) => Ok(TxOutcome::Committed),
            None => Ok(TxOutcome::Aborted),
        }
    }

    pub async fn discard(self) -> CacheResult<()> {
        let mut conn = self.conn;
        redis::cmd("UNWATCH").query_async::<()>(&mut *conn).await?;
        Ok(())
    }
}
