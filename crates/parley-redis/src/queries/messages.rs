//! Message queries backed by Redis.
//!
//! Each room keeps a sorted set of its message ids scored by timestamp, so
//! chronological and most-recent-first reads are both a single range query.

use super::{rooms::room_key, score_of, PREFIX};
use crate::client::{RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
    pub agent_id: Option<String>,
    pub agent_name: Option<String>,
    pub timestamp: String,
}

fn message_key(id: &str) -> String {
    format!("{}:message:{}", PREFIX, id)
}

fn room_messages_key(room_id: &str) -> String {
    format!("{}:messages", room_key(room_id))
}

pub async fn create_message(pool: &RedisPool, row: &MessageRow) -> RedisResult<()> {
    let mut conn = pool.clone();
    let json = serde_json::to_string(row)?;
    conn.hset::<_, _, _, ()>(message_key(&row.id), "data", &json).await?;
    conn.hset::<_, _, _, ()>(message_key(&row.id), "type", &row.kind).await?;
    conn.zadd::<_, _, _, ()>(room_messages_key(&row.room_id), &row.id, score_of(&row.timestamp))
        .await?;
    Ok(())
}

async fn load_messages(pool: &RedisPool, ids: Vec<String>) -> RedisResult<Vec<MessageRow>> {
    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        let mut c = pool.clone();
        let json: Option<String> = c.hget(message_key(&id), "data").await?;
        if let Some(j) = json {
            if let Ok(row) = serde_json::from_str::<MessageRow>(&j) {
                rows.push(row);
            }
        }
    }
    Ok(rows)
}

/// All messages of a room, oldest first.
pub async fn list_messages(pool: &RedisPool, room_id: &str) -> RedisResult<Vec<MessageRow>> {
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.zrange(room_messages_key(room_id), 0, -1).await?;
    load_messages(pool, ids).await
}

/// Up to `limit` messages of the given type, newest first.
pub async fn recent_messages(
    pool: &RedisPool,
    room_id: &str,
    kind: &str,
    limit: usize,
) -> RedisResult<Vec<MessageRow>> {
    if limit == 0 {
        return Ok(Vec::new());
    }
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.zrevrange(room_messages_key(room_id), 0, -1).await?;
    let mut rows = Vec::new();
    for id in ids {
        let mut c = pool.clone();
        let stored_kind: Option<String> = c.hget(message_key(&id), "type").await?;
        if stored_kind.as_deref() != Some(kind) {
            continue;
        }
        rows.extend(load_messages(pool, vec![id]).await?);
        if rows.len() >= limit {
            break;
        }
    }
    Ok(rows)
}

pub async fn delete_room_messages(pool: &RedisPool, room_id: &str) -> RedisResult<()> {
    let mut conn = pool.clone();
    let zkey = room_messages_key(room_id);
    let ids: Vec<String> = conn.zrange(&zkey, 0, -1).await?;
    for id in &ids {
        conn.del::<_, ()>(message_key(id)).await?;
    }
    conn.del::<_, ()>(&zkey).await?;
    tracing::debug!(room_id = %room_id, count = ids.len(), "Deleted room messages");
    Ok(())
}
