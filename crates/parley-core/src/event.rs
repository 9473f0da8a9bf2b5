//! Payloads published to room viewers.
//!
//! Every payload is a JSON object carrying a `type` field: `room_info`,
//! `status_update`, or the `type` of a persisted message
//! (`system`/`user`/`agent`).

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::error::ParleyResult;
use crate::message::model::Message;
use crate::room::model::{RoomStatus, RoomView};

/// Room-level notifications that are not chat messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlEvent {
    /// Full snapshot of the room and its agents.
    RoomInfo { chat_room: RoomView },
    StatusUpdate { status: RoomStatus },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomEvent {
    Control(ControlEvent),
    /// A persisted message, sent as-is.
    Message(Message),
}

impl RoomEvent {
    pub fn room_info(chat_room: RoomView) -> Self {
        Self::Control(ControlEvent::RoomInfo { chat_room })
    }

    pub fn status_update(status: RoomStatus) -> Self {
        Self::Control(ControlEvent::StatusUpdate { status })
    }

    pub fn message(message: Message) -> Self {
        Self::Message(message)
    }

    /// The `type` discriminator this event is sent with.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Control(ControlEvent::RoomInfo { .. }) => "room_info",
            Self::Control(ControlEvent::StatusUpdate { .. }) => "status_update",
            Self::Message(message) => message.kind.as_str(),
        }
    }

    pub fn to_payload(&self) -> ParleyResult<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::model::Room;

    #[test]
    fn test_status_update_wire_format() {
        let payload = RoomEvent::status_update(RoomStatus::Running).to_payload().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json, serde_json::json!({"type": "status_update", "status": "running"}));
    }

    #[test]
    fn test_room_info_embeds_room_snapshot() {
        let view = RoomView {
            room: Room {
                id: "r1".into(),
                topic: "climate policy".into(),
                status: RoomStatus::Running,
                agent_ids: vec![],
                created_at: "2024-01-01T00:00:00Z".into(),
            },
            agents: vec![],
            messages: vec![],
        };
        let event = RoomEvent::room_info(view);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "room_info");
        assert_eq!(json["chat_room"]["topic"], "climate policy");
        assert_eq!(json["chat_room"]["status"], "running");

        let back: RoomEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
        assert_eq!(back.kind(), "room_info");
    }

    #[test]
    fn test_message_event_keeps_message_type() {
        let event = RoomEvent::message(Message::system("r1", "Discussion topic: tea"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "system");
        assert_eq!(event.kind(), "system");

        let back: RoomEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
