//! Agent management.

pub mod model;

use crate::error::{ParleyError, ParleyResult};
use model::{Agent, AgentProfile};
use parley_db::DbPool;
use uuid::Uuid;

fn validate(profile: &AgentProfile) -> ParleyResult<()> {
    if profile.name.trim().is_empty() {
        return Err(ParleyError::validation("Agent name must not be empty"));
    }
    Ok(())
}

/// Create a new agent.
pub async fn create_agent(pool: &DbPool, profile: AgentProfile) -> ParleyResult<Agent> {
    validate(&profile)?;

    let agent = Agent {
        id: Uuid::new_v4().to_string(),
        name: profile.name.trim().to_string(),
        role: profile.role,
        personality: profile.personality,
        avatar: profile.avatar,
        profile_link: profile.profile_link,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    pool.create_agent(&agent.to_row()).await?;

    tracing::info!(agent_id = %agent.id, name = %agent.name, "Agent created");
    Ok(agent)
}

/// Get an agent by ID.
pub async fn get_agent(pool: &DbPool, id: &str) -> ParleyResult<Agent> {
    let row = pool
        .get_agent(id)
        .await
        .map_err(|e| ParleyError::lookup(e, || ParleyError::AgentNotFound(id.to_string())))?;
    Ok(Agent::from_row(row))
}

/// List all agents in creation order.
pub async fn list_agents(pool: &DbPool) -> ParleyResult<Vec<Agent>> {
    let rows = pool.list_agents().await?;
    Ok(rows.into_iter().map(Agent::from_row).collect())
}

/// Load the given agents in creation order, skipping unknown ids.
pub async fn find_agents(pool: &DbPool, ids: &[String]) -> ParleyResult<Vec<Agent>> {
    let rows = pool.find_agents(ids).await?;
    Ok(rows.into_iter().map(Agent::from_row).collect())
}

/// Replace an agent's editable fields.
pub async fn update_agent(pool: &DbPool, id: &str, profile: AgentProfile) -> ParleyResult<Agent> {
    validate(&profile)?;

    let mut agent = get_agent(pool, id).await?;
    agent.name = profile.name.trim().to_string();
    agent.role = profile.role;
    agent.personality = profile.personality;
    agent.avatar = profile.avatar;
    agent.profile_link = profile.profile_link;

    pool.update_agent(&agent.to_row()).await?;
    Ok(agent)
}

/// Delete an agent.
pub async fn delete_agent(pool: &DbPool, id: &str) -> ParleyResult<()> {
    get_agent(pool, id).await?;
    pool.delete_agent(id).await?;
    tracing::info!(agent_id = %id, "Agent deleted");
    Ok(())
}
