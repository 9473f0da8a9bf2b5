//! Shared store handle.

use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::redis_store::RedisStore;
use crate::store::{DbResult, Store};

/// Handle every component clones to reach persistence.
pub type DbPool = Arc<dyn Store>;

/// Connect to Redis and wrap the connection as a pool.
pub async fn init_pool(redis_url: &str) -> DbResult<DbPool> {
    let store = RedisStore::connect(redis_url).await?;
    Ok(Arc::new(store))
}

/// A pool over a fresh, empty in-memory store.
pub fn in_memory() -> DbPool {
    Arc::new(MemoryStore::new())
}
