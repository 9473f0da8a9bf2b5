//! Parley Redis Data Layer
//!
//! Async Redis persistence for agents, chat rooms and their messages.
//! Every record is a JSON document in the `data` field of a hash; sorted sets
//! keep creation order.

pub mod client;
pub mod queries;

pub use client::{RedisError, RedisPool, RedisResult, init_pool};
pub use queries::agents;
pub use queries::messages;
pub use queries::rooms;
pub use queries::{AgentRow, MessageRow, RoomRow};
