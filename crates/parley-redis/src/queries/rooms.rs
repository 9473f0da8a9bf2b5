//! Chat room queries backed by Redis.

use super::{messages, score_of, PREFIX};
use crate::client::{RedisError, RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRow {
    pub id: String,
    pub topic: String,
    pub status: String,
    pub agent_ids: Vec<String>,
    pub created_at: String,
}

pub(crate) fn room_key(id: &str) -> String {
    format!("{}:room:{}", PREFIX, id)
}

fn all_key() -> String {
    format!("{}:rooms:all", PREFIX)
}

/// Insert or overwrite a room.
pub async fn save_room(pool: &RedisPool, row: &RoomRow) -> RedisResult<()> {
    let mut conn = pool.clone();
    let key = room_key(&row.id);
    conn.hset::<_, _, _, ()>(&key, "data", serde_json::to_string(row)?).await?;
    conn.hset::<_, _, _, ()>(&key, "status", &row.status).await?;
    conn.zadd::<_, _, _, ()>(all_key(), &row.id, score_of(&row.created_at)).await?;
    Ok(())
}

pub async fn get_room(pool: &RedisPool, id: &str) -> RedisResult<RoomRow> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(room_key(id), "data").await?;
    match json {
        Some(j) => Ok(serde_json::from_str(&j)?),
        None => Err(RedisError::NotFound(format!("Room not found: {}", id))),
    }
}

pub async fn list_rooms(pool: &RedisPool) -> RedisResult<Vec<RoomRow>> {
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.zrange(all_key(), 0, -1).await?;
    let mut rooms = Vec::with_capacity(ids.len());
    for id in ids {
        let mut c = pool.clone();
        let json: Option<String> = c.hget(room_key(&id), "data").await?;
        if let Some(j) = json {
            if let Ok(row) = serde_json::from_str::<RoomRow>(&j) {
                rooms.push(row);
            }
        }
    }
    Ok(rooms)
}

/// Delete a room together with its messages.
pub async fn delete_room(pool: &RedisPool, id: &str) -> RedisResult<()> {
    messages::delete_room_messages(pool, id).await?;
    let mut conn = pool.clone();
    conn.del::<_, ()>(room_key(id)).await?;
    conn.zrem::<_, _, ()>(all_key(), id).await?;
    Ok(())
}
