//! Chat room route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use parley_core::message::{self, model::Message};
use parley_core::room::{self, model::{Room, RoomView}};
use serde::{Deserialize, Serialize};

use super::api_error;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateRoomRequest {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub agents: Vec<String>,
}

#[derive(Deserialize)]
pub struct PostMessageRequest {
    pub content: String,
}

#[derive(Serialize)]
pub struct RunStarted {
    pub message: String,
    pub chat_room: Room,
}

pub async fn list_rooms(
    State(state): State<AppState>,
) -> Result<Json<Vec<RoomView>>, (StatusCode, String)> {
    let rooms = room::list_rooms(&state.db).await.map_err(api_error)?;
    Ok(Json(rooms))
}

pub async fn create_room(
    State(state): State<AppState>,
    Json(req): Json<CreateRoomRequest>,
) -> Result<(StatusCode, Json<RoomView>), (StatusCode, String)> {
    let view = room::create_room(&state.db, &req.topic, &req.agents)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RoomView>, (StatusCode, String)> {
    let view = room::get_room_details(&state.db, &id).await.map_err(api_error)?;
    Ok(Json(view))
}

pub async fn delete_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.discussion.cancel_run(&id).await;
    room::delete_room(&state.db, &id).await.map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn start_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunStarted>, (StatusCode, String)> {
    let run = state.discussion.start_room(&id).await.map_err(api_error)?;
    Ok(Json(RunStarted {
        message: "Discussion started".to_string(),
        chat_room: run.room,
    }))
}

pub async fn stop_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Room>, (StatusCode, String)> {
    let room = state.discussion.stop_room(&id).await.map_err(api_error)?;
    Ok(Json(room))
}

pub async fn post_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<PostMessageRequest>,
) -> Result<(StatusCode, Json<Message>), (StatusCode, String)> {
    let message = message::post_user_message(&state.db, &state.hub, &id, &req.content)
        .await
        .map_err(api_error)?;
    Ok((StatusCode::CREATED, Json(message)))
}
