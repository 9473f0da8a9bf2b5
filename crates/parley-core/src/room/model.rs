//! Chat room domain models.

use parley_db::RoomRow;
use serde::{Deserialize, Serialize};

use crate::agent::model::Agent;
use crate::message::model::Message;

/// A persisted discussion session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub topic: String,
    pub status: RoomStatus,
    pub agent_ids: Vec<String>,
    pub created_at: String,
}

impl Room {
    /// Create a Room from a database row.
    pub fn from_row(row: RoomRow) -> Self {
        Self {
            id: row.id,
            topic: row.topic,
            status: RoomStatus::from_str(&row.status),
            agent_ids: row.agent_ids,
            created_at: row.created_at,
        }
    }

    pub fn to_row(&self) -> RoomRow {
        RoomRow {
            id: self.id.clone(),
            topic: self.topic.clone(),
            status: self.status.as_str().to_string(),
            agent_ids: self.agent_ids.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// A room together with its agents and, when loaded, its messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub agents: Vec<Agent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<Message>,
}

/// Lifecycle of a room's discussion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Pending,
    Running,
    Stopped,
    Completed,
}

impl RoomStatus {
    /// Parse from string.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "running" => Self::Running,
            "stopped" => Self::Stopped,
            "completed" => Self::Completed,
            _ => Self::Pending,
        }
    }

    /// Convert to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Completed => "completed",
        }
    }

    /// Check if transition to another status is valid.
    pub fn can_transition_to(&self, to: &Self) -> bool {
        match (self, to) {
            // A stop always lands, and repeating it is harmless
            (_, Self::Stopped) => true,
            // Every start goes through a fresh run; never running -> running
            (Self::Pending, Self::Running) => true,
            (Self::Stopped, Self::Running) => true,
            (Self::Completed, Self::Running) => true,
            // Only a live run can complete
            (Self::Running, Self::Completed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            RoomStatus::Pending,
            RoomStatus::Running,
            RoomStatus::Stopped,
            RoomStatus::Completed,
        ] {
            assert_eq!(RoomStatus::from_str(status.as_str()), status);
        }
        assert_eq!(RoomStatus::from_str("garbage"), RoomStatus::Pending);
    }

    #[test]
    fn test_transitions_are_monotonic_per_run() {
        use RoomStatus::*;
        assert!(Pending.can_transition_to(&Running));
        assert!(Running.can_transition_to(&Completed));
        assert!(Running.can_transition_to(&Stopped));
        assert!(Completed.can_transition_to(&Running));
        assert!(Stopped.can_transition_to(&Stopped));

        assert!(!Running.can_transition_to(&Running));
        assert!(!Stopped.can_transition_to(&Completed));
        assert!(!Pending.can_transition_to(&Completed));
        assert!(!Completed.can_transition_to(&Pending));
    }
}
