//! Agent queries backed by Redis.

use super::{score_of, PREFIX};
use crate::client::{RedisError, RedisPool, RedisResult};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub personality: String,
    pub avatar: Option<String>,
    pub profile_link: Option<String>,
    pub created_at: String,
}

fn agent_key(id: &str) -> String {
    format!("{}:agent:{}", PREFIX, id)
}

fn all_key() -> String {
    format!("{}:agents:all", PREFIX)
}

pub async fn create_agent(pool: &RedisPool, row: &AgentRow) -> RedisResult<()> {
    let mut conn = pool.clone();
    let json = serde_json::to_string(row)?;
    conn.hset::<_, _, _, ()>(agent_key(&row.id), "data", &json).await?;
    conn.hset::<_, _, _, ()>(agent_key(&row.id), "name", &row.name).await?;
    conn.zadd::<_, _, _, ()>(all_key(), &row.id, score_of(&row.created_at)).await?;
    Ok(())
}

pub async fn get_agent(pool: &RedisPool, id: &str) -> RedisResult<AgentRow> {
    let mut conn = pool.clone();
    let json: Option<String> = conn.hget(agent_key(id), "data").await?;
    match json {
        Some(j) => Ok(serde_json::from_str(&j)?),
        None => Err(RedisError::NotFound(format!("Agent not found: {}", id))),
    }
}

pub async fn update_agent(pool: &RedisPool, row: &AgentRow) -> RedisResult<()> {
    // Existence check keeps updates from resurrecting deleted agents.
    get_agent(pool, &row.id).await?;
    let mut conn = pool.clone();
    conn.hset::<_, _, _, ()>(agent_key(&row.id), "data", serde_json::to_string(row)?).await?;
    conn.hset::<_, _, _, ()>(agent_key(&row.id), "name", &row.name).await?;
    Ok(())
}

pub async fn delete_agent(pool: &RedisPool, id: &str) -> RedisResult<()> {
    let mut conn = pool.clone();
    conn.del::<_, ()>(agent_key(id)).await?;
    conn.zrem::<_, _, ()>(all_key(), id).await?;
    Ok(())
}

/// List all agents in creation order.
pub async fn list_agents(pool: &RedisPool) -> RedisResult<Vec<AgentRow>> {
    let mut conn = pool.clone();
    let ids: Vec<String> = conn.zrange(all_key(), 0, -1).await?;
    let mut agents = Vec::with_capacity(ids.len());
    for id in ids {
        let mut c = pool.clone();
        let json: Option<String> = c.hget(agent_key(&id), "data").await?;
        if let Some(j) = json {
            if let Ok(row) = serde_json::from_str::<AgentRow>(&j) {
                agents.push(row);
            }
        }
    }
    Ok(agents)
}

/// Load the given agents, in creation order. Unknown ids are skipped.
pub async fn find_agents(pool: &RedisPool, ids: &[String]) -> RedisResult<Vec<AgentRow>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let agents = list_agents(pool).await?;
    Ok(agents.into_iter().filter(|a| ids.contains(&a.id)).collect())
}
