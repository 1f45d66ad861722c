//! Cache rehydration on miss: a sharded keyed mutex plus a cache
//! double-check after the lock is acquired, so concurrent misses for the
//! same tab collapse into a single durable read (the single-flight effect)
//! without a separate broadcast mechanism.
//!
//! Grounded on the read-through pattern that paired `singleflight.Group`
//! with `keymutex.KeyMutex`: here the mutex alone gives the same effect,
//! because every waiter re-checks the cache immediately after acquiring it.

use std::sync::Arc;

use dashmap::DashMap;
use sqlx::Connection;
use tokio::sync::Mutex;

use shared::ids::TabId;
use shared::model::Tab;
use shared::{CoreError, CoreResult};

use crate::cache::CacheRepo;
use crate::db::repository::tab;

pub struct Warmer {
    cache: Arc<dyn CacheRepo>,
    pool: sqlx::PgPool,
    locks: DashMap<TabId, Arc<Mutex<()>>>,
}

impl Warmer {
    pub fn new(cache: Arc<dyn CacheRepo>, pool: sqlx::PgPool) -> Self {
        Self { cache, pool, locks: DashMap::new() }
    }

    /// Returns the open tab with its orders, serving from cache when
    /// possible and rehydrating from Postgres on a miss.
    pub async fn get_open_tab(&self, tab_id: TabId) -> CoreResult<Tab> {
        if let Some(tab) = self.cache.get_open_tab_with_orders(tab_id).await.map_err(cache_err)? {
            return Ok(tab);
        }

        let lock = self.locks.entry(tab_id).or_insert_with(|| Arc::new(Mutex::new(()))).clone();
        let _guard = lock.lock().await;

        if let Some(tab) = self.cache.get_open_tab_with_orders(tab_id).await.map_err(cache_err)? {
            self.locks.remove_if(&tab_id, |_, v| Arc::strong_count(v) <= 1);
            return Ok(tab);
        }

        let mut conn = self.pool.acquire().await.map_err(db_err)?;
        let mut txn = conn.begin().await.map_err(db_err)?;
        let fresh = tab::get_tab_with_orders_for_share(&mut txn, tab_id)
            .await
            .map_err(Into::<CoreError>::into)?;
        txn.commit().await.map_err(db_err)?;

        if let Err(e) = self.cache.cache_tab(&fresh).await {
            tracing::warn!(tab = %tab_id, error = %e, "failed to warm cache after durable read");
        }

        self.locks.remove_if(&tab_id, |_, v| Arc::strong_count(v) <= 1);
        Ok(fresh)
    }
}

fn cache_err(e: crate::cache::CacheError) -> CoreError {
    CoreError::internal(e.to_string())
}

fn db_err(e: sqlx::Error) -> CoreError {
    CoreError::internal(e.to_string())
}
