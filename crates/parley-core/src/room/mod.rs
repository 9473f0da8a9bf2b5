//! Chat room management.

pub mod model;

use crate::agent;
use crate::error::{ParleyError, ParleyResult};
use crate::message;
use model::{Room, RoomStatus, RoomView};
use parley_db::DbPool;
use uuid::Uuid;

/// Create a room in `pending` status. Unknown agent ids are ignored.
pub async fn create_room(pool: &DbPool, topic: &str, agent_ids: &[String]) -> ParleyResult<RoomView> {
    let agents = agent::find_agents(pool, agent_ids).await?;

    let room = Room {
        id: Uuid::new_v4().to_string(),
        topic: topic.trim().to_string(),
        status: RoomStatus::Pending,
        agent_ids: agents.iter().map(|a| a.id.clone()).collect(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    pool.save_room(&room.to_row()).await?;

    tracing::info!(
        room_id = %room.id,
        topic = %room.topic,
        agents = agents.len(),
        "Room created"
    );

    Ok(RoomView { room, agents, messages: Vec::new() })
}

/// Get a room by ID.
pub async fn get_room(pool: &DbPool, id: &str) -> ParleyResult<Room> {
    let row = pool
        .get_room(id)
        .await
        .map_err(|e| ParleyError::lookup(e, || ParleyError::RoomNotFound(id.to_string())))?;
    Ok(Room::from_row(row))
}

/// Get a room with its agents, in creation order.
pub async fn get_room_with_agents(pool: &DbPool, id: &str) -> ParleyResult<RoomView> {
    let room = get_room(pool, id).await?;
    let agents = agent::find_agents(pool, &room.agent_ids).await?;
    Ok(RoomView { room, agents, messages: Vec::new() })
}

/// Get a room with its agents and full message history.
pub async fn get_room_details(pool: &DbPool, id: &str) -> ParleyResult<RoomView> {
    let mut view = get_room_with_agents(pool, id).await?;
    view.messages = message::list_messages(pool, id).await?;
    Ok(view)
}

/// List all rooms with their agents.
pub async fn list_rooms(pool: &DbPool) -> ParleyResult<Vec<RoomView>> {
    let rows = pool.list_rooms().await?;
    let mut rooms = Vec::with_capacity(rows.len());
    for row in rows {
        let room = Room::from_row(row);
        let agents = agent::find_agents(pool, &room.agent_ids).await?;
        rooms.push(RoomView { room, agents, messages: Vec::new() });
    }
    Ok(rooms)
}

/// Persist a room as-is.
pub async fn save_room(pool: &DbPool, room: &Room) -> ParleyResult<()> {
    pool.save_room(&room.to_row()).await?;
    Ok(())
}

/// Move a room to `status`, enforcing the lifecycle.
pub async fn set_status(pool: &DbPool, id: &str, status: RoomStatus) -> ParleyResult<Room> {
    let mut room = get_room(pool, id).await?;

    if !room.status.can_transition_to(&status) {
        return Err(ParleyError::InvalidStatusTransition {
            from: room.status.as_str().to_string(),
            to: status.as_str().to_string(),
        });
    }

    room.status = status;
    save_room(pool, &room).await?;
    tracing::debug!(room_id = %id, status = %status, "Room status updated");
    Ok(room)
}

/// Delete a room with its messages and agent association.
pub async fn delete_room(pool: &DbPool, id: &str) -> ParleyResult<()> {
    if id.trim().is_empty() {
        return Err(ParleyError::validation("Room ID must not be empty"));
    }
    get_room(pool, id).await?;
    pool.delete_room(id).await?;
    tracing::info!(room_id = %id, "Room deleted");
    Ok(())
}
