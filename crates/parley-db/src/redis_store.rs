//! Redis-backed [`Store`].

use async_trait::async_trait;
use parley_redis::{agents, messages, rooms, AgentRow, MessageRow, RedisPool, RoomRow};

use crate::store::{DbResult, Store};

/// Store that delegates to the parley-redis queries.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Open a connection manager for `redis_url`.
    pub async fn connect(redis_url: &str) -> DbResult<Self> {
        let pool = parley_redis::init_pool(redis_url).await?;
        tracing::info!("Redis store connected");
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn list_agents(&self) -> DbResult<Vec<AgentRow>> {
        Ok(agents::list_agents(&self.pool).await?)
    }

    async fn get_agent(&self, id: &str) -> DbResult<AgentRow> {
        Ok(agents::get_agent(&self.pool, id).await?)
    }

    async fn create_agent(&self, row: &AgentRow) -> DbResult<()> {
        Ok(agents::create_agent(&self.pool, row).await?)
    }

    async fn update_agent(&self, row: &AgentRow) -> DbResult<()> {
        Ok(agents::update_agent(&self.pool, row).await?)
    }

    async fn delete_agent(&self, id: &str) -> DbResult<()> {
        Ok(agents::delete_agent(&self.pool, id).await?)
    }

    async fn find_agents(&self, ids: &[String]) -> DbResult<Vec<AgentRow>> {
        Ok(agents::find_agents(&self.pool, ids).await?)
    }

    async fn list_rooms(&self) -> DbResult<Vec<RoomRow>> {
        Ok(rooms::list_rooms(&self.pool).await?)
    }

    async fn get_room(&self, id: &str) -> DbResult<RoomRow> {
        Ok(rooms::get_room(&self.pool, id).await?)
    }

    async fn save_room(&self, row: &RoomRow) -> DbResult<()> {
        Ok(rooms::save_room(&self.pool, row).await?)
    }

    async fn delete_room(&self, id: &str) -> DbResult<()> {
        Ok(rooms::delete_room(&self.pool, id).await?)
    }

    async fn create_message(&self, row: &MessageRow) -> DbResult<()> {
        Ok(messages::create_message(&self.pool, row).await?)
    }

    async fn list_messages(&self, room_id: &str) -> DbResult<Vec<MessageRow>> {
        Ok(messages::list_messages(&self.pool, room_id).await?)
    }

    async fn recent_messages(
        &self,
        room_id: &str,
        kind: &str,
        limit: usize,
    ) -> DbResult<Vec<MessageRow>> {
        Ok(messages::recent_messages(&self.pool, room_id, kind, limit).await?)
    }
}
