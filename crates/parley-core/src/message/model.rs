//! Message domain models.

use parley_db::MessageRow;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::model::Agent;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    System,
    User,
    Agent,
}

impl MessageKind {
    /// Parse from string.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "user" => Self::User,
            "agent" => Self::Agent,
            _ => Self::System,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Agent => "agent",
        }
    }
}

/// An immutable chat message. Serializes with a `type` field, which is what
/// viewers switch on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub room_id: String,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    pub timestamp: String,
}

impl Message {
    fn new(room_id: &str, kind: MessageKind, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            room_id: room_id.to_string(),
            kind,
            content,
            agent_id: None,
            agent_name: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn system(room_id: &str, content: impl Into<String>) -> Self {
        Self::new(room_id, MessageKind::System, content.into())
    }

    pub fn user(room_id: &str, content: impl Into<String>) -> Self {
        Self::new(room_id, MessageKind::User, content.into())
    }

    /// A reply spoken by `agent`.
    pub fn from_agent(room_id: &str, agent: &Agent, content: impl Into<String>) -> Self {
        Self {
            agent_id: Some(agent.id.clone()),
            agent_name: Some(agent.name.clone()),
            ..Self::new(room_id, MessageKind::Agent, content.into())
        }
    }

    /// Create a Message from a database row.
    pub fn from_row(row: MessageRow) -> Self {
        Self {
            id: row.id,
            room_id: row.room_id,
            kind: MessageKind::from_str(&row.kind),
            content: row.content,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            timestamp: row.timestamp,
        }
    }

    pub fn to_row(&self) -> MessageRow {
        MessageRow {
            id: self.id.clone(),
            room_id: self.room_id.clone(),
            kind: self.kind.as_str().to_string(),
            content: self.content.clone(),
            agent_id: self.agent_id.clone(),
            agent_name: self.agent_name.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}
