//! Room messages.

pub mod model;

use crate::error::{ParleyError, ParleyResult};
use crate::event::RoomEvent;
use crate::hub::Hub;
use crate::room;
use model::{Message, MessageKind};
use parley_db::DbPool;

/// Persist a message.
pub async fn save_message(pool: &DbPool, message: &Message) -> ParleyResult<()> {
    pool.create_message(&message.to_row()).await?;
    Ok(())
}

/// All messages of a room, oldest first.
pub async fn list_messages(pool: &DbPool, room_id: &str) -> ParleyResult<Vec<Message>> {
    let rows = pool.list_messages(room_id).await?;
    Ok(rows.into_iter().map(Message::from_row).collect())
}

/// Up to `limit` messages of one kind, newest first.
pub async fn recent_messages(
    pool: &DbPool,
    room_id: &str,
    kind: MessageKind,
    limit: usize,
) -> ParleyResult<Vec<Message>> {
    let rows = pool.recent_messages(room_id, kind.as_str(), limit).await?;
    Ok(rows.into_iter().map(Message::from_row).collect())
}

/// The newest user-authored message of a room, if any.
pub async fn latest_user_message(pool: &DbPool, room_id: &str) -> ParleyResult<Option<Message>> {
    let row = pool.latest_user_message(room_id).await?;
    Ok(row.map(Message::from_row))
}

/// Record a viewer's message and fan it out to the room.
///
/// The newest user message becomes the topic of the room's next run.
pub async fn post_user_message(
    pool: &DbPool,
    hub: &Hub,
    room_id: &str,
    content: &str,
) -> ParleyResult<Message> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ParleyError::validation("Message content must not be empty"));
    }
    room::get_room(pool, room_id).await?;

    let message = Message::user(room_id, content);
    save_message(pool, &message).await?;
    hub.publish_event(room_id, &RoomEvent::message(message.clone())).await;

    Ok(message)
}
