//! Parley Database Layer
//!
//! The [`Store`] trait is the persistence seam the rest of the system talks
//! to. [`RedisStore`] backs it with the parley-redis crate; [`MemoryStore`]
//! keeps everything in process for tests and throwaway servers.

pub mod memory;
pub mod pool;
pub mod redis_store;
pub mod store;

pub use memory::MemoryStore;
pub use parley_redis::{AgentRow, MessageRow, RoomRow};
pub use pool::{DbPool, in_memory, init_pool};
pub use redis_store::RedisStore;
pub use store::{DbError, DbResult, Store};
