//! The persistence contract.

use async_trait::async_trait;
use parley_redis::{AgentRow, MessageRow, RedisError, RoomRow};
use thiserror::Error;

/// Database error types.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("Redis error: {0}")]
    Redis(RedisError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Write rejected: {0}")]
    WriteRejected(String),
}

impl From<RedisError> for DbError {
    fn from(e: RedisError) -> Self {
        match e {
            RedisError::NotFound(what) => Self::NotFound(what),
            other => Self::Redis(other),
        }
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Message type tag for user-authored messages.
pub const USER_MESSAGE: &str = "user";

/// Persistence for agents, rooms and messages.
///
/// Single-record writes are atomic; nothing spans records.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_agents(&self) -> DbResult<Vec<AgentRow>>;
    async fn get_agent(&self, id: &str) -> DbResult<AgentRow>;
    async fn create_agent(&self, row: &AgentRow) -> DbResult<()>;
    async fn update_agent(&self, row: &AgentRow) -> DbResult<()>;
    async fn delete_agent(&self, id: &str) -> DbResult<()>;

    /// Agents with the given ids, in creation order.
    async fn find_agents(&self, ids: &[String]) -> DbResult<Vec<AgentRow>>;

    async fn list_rooms(&self) -> DbResult<Vec<RoomRow>>;
    async fn get_room(&self, id: &str) -> DbResult<RoomRow>;

    /// Insert or overwrite a room record.
    async fn save_room(&self, row: &RoomRow) -> DbResult<()>;

    /// Delete a room, its messages and its agent association.
    async fn delete_room(&self, id: &str) -> DbResult<()>;

    async fn create_message(&self, row: &MessageRow) -> DbResult<()>;

    /// Messages of a room, oldest first.
    async fn list_messages(&self, room_id: &str) -> DbResult<Vec<MessageRow>>;

    /// Up to `limit` messages of type `kind`, newest first.
    async fn recent_messages(
        &self,
        room_id: &str,
        kind: &str,
        limit: usize,
    ) -> DbResult<Vec<MessageRow>>;

    async fn latest_user_message(&self, room_id: &str) -> DbResult<Option<MessageRow>> {
        let mut rows = self.recent_messages(room_id, USER_MESSAGE, 1).await?;
        Ok(rows.pop())
    }
}
