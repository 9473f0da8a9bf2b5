//! Agent route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use parley_core::agent::{self, model::{Agent, AgentProfile}};

use super::api_error;
use crate::state::AppState;

pub async fn list_agents(
    State(state): State<AppState>,
) -> Result<Json<Vec<Agent>>, (StatusCode, String)> {
    let agents = agent::list_agents(&state.db).await.map_err(api_error)?;
    Ok(Json(agents))
}

pub async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<AgentProfile>,
) -> Result<(StatusCode, Json<Agent>), (StatusCode, String)> {
    let agent = agent::create_agent(&state.db, req).await.map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(agent)))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AgentProfile>,
) -> Result<Json<Agent>, (StatusCode, String)> {
    let agent = agent::update_agent(&state.db, &id, req).await.map_err(api_error)?;
    Ok(Json(agent))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    agent::delete_agent(&state.db, &id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}
