//! The cache tier: a Redis-backed implementation of hashes, sorted sets,
//! sets, counters, and an optimistic watch/transact primitive.

pub mod keys;
pub mod redis_repo;
pub mod watch;

pub use redis_repo::RedisCacheRepo;
pub use watch::{CacheTxn, TxOutcome};

use async_trait::async_trait;
use shared::ids::{GuestId, OrderItemId, ScopedOrderItemId, TabId};
use shared::model::{OrderItem, Tab};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache miss")]
    Miss,

    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("pool error: {0}")]
    Pool(#[from] bb8::RunError<redis::RedisError>),

    #[error("item id sequence exhausted")]
    SequenceExhausted,

    #[error("malformed cache value: {0}")]
    Malformed(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// The capability set the core's services depend on. Backed by
/// [`RedisCacheRepo`], but modeled as a trait so the watch/transact protocol
/// stays testable against an in-memory fake.
#[async_trait]
pub trait CacheRepo: Send + Sync {
    /// Write-through of a full tab, including at most one trailing not-sent
    /// order (per [`Tab::not_sent_order`]).
    async fn cache_tab(&self, tab: &Tab) -> CacheResult<()>;

    /// Returns `Ok(None)` on a genuine cache miss (header absent) so callers
    /// can distinguish "go warm this" from a real error.
    async fn get_open_tab_with_orders(&self, tab: TabId) -> CacheResult<Option<Tab>>;

    /// Atomically allocates the next scoped item id for the tab's not-sent
    /// order. Errors if the counter would exceed `i16::MAX`.
    async fn next_item_scope(&self, tab: TabId) -> CacheResult<ScopedOrderItemId>;

    async fn set_item_quantity(&self, id: OrderItemId, quantity: i16) -> CacheResult<()>;
    async fn set_item_modifiers(&self, id: OrderItemId, modifiers: &[u8]) -> CacheResult<()>;
    async fn add_item_guest_owner(&self, id: OrderItemId, guest: GuestId) -> CacheResult<()>;
    async fn remove_item_guest_owner(&self, id: OrderItemId, guest: GuestId) -> CacheResult<()>;
    async fn add_item_customer_owner(
        &self,
        id: OrderItemId,
        customer: shared::ids::CustomerId,
    ) -> CacheResult<()>;
    async fn remove_item_customer_owner(
        &self,
        id: OrderItemId,
        customer: shared::ids::CustomerId,
    ) -> CacheResult<()>;

    async fn cache_new_item(&self, item: &OrderItem) -> CacheResult<()>;
    async fn delete_item(&self, id: OrderItemId) -> CacheResult<()>;

    async fn update_guest_name(&self, guest: GuestId, name: &str) -> CacheResult<()>;

    /// Deletes all derived keys for the tab, including the given not-sent
    /// order items (pass the ids observed under watch, see
    /// [`CacheTxn::watch_and_get_not_sent_order_and_items`]).
    async fn invalidate_tab(&self, tab: TabId, not_sent_item_ids: &[OrderItemId]) -> CacheResult<()>;

    /// Opens a dedicated connection for an optimistic watch/transact block.
    /// Must not be served from a shared multiplexed connection: WATCH state
    /// is per-connection.
    async fn begin_txn(&self) -> CacheResult<CacheTxn<'_>>;
}

/// A [`CacheRepo`] that panics if any method is called, for unit tests that
/// exercise a guard clause returning before the cache tier is ever touched.
#[cfg(test)]
pub(crate) struct UnreachableCacheRepo;

#[cfg(test)]
#[async_trait]
impl CacheRepo for UnreachableCacheRepo {
    async fn cache_tab(&self, _tab: &Tab) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn get_open_tab_with_orders(&self, _tab: TabId) -> CacheResult<Option<Tab>> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn next_item_scope(&self, _tab: TabId) -> CacheResult<ScopedOrderItemId> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn set_item_quantity(&self, _id: OrderItemId, _quantity: i16) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn set_item_modifiers(&self, _id: OrderItemId, _modifiers: &[u8]) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn add_item_guest_owner(&self, _id: OrderItemId, _guest: GuestId) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn remove_item_guest_owner(&self, _id: OrderItemId, _guest: GuestId) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn add_item_customer_owner(
        &self,
        _id: OrderItemId,
        _customer: shared::ids::CustomerId,
    ) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn remove_item_customer_owner(
        &self,
        _id: OrderItemId,
        _customer: shared::ids::CustomerId,
    ) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn cache_new_item(&self, _item: &OrderItem) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn delete_item(&self, _id: OrderItemId) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn update_guest_name(&self, _guest: GuestId, _name: &str) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn invalidate_tab(&self, _tab: TabId, _not_sent_item_ids: &[OrderItemId]) -> CacheResult<()> {
        unreachable!("cache not expected to be touched in this test")
    }
    async fn begin_txn(&self) -> CacheResult<CacheTxn<'_>> {
        unreachable!("cache not expected to be touched in this test")
    }
}
