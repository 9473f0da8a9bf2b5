//! Agent domain models.

use parley_db::AgentRow;
use serde::{Deserialize, Serialize};

/// A discussion persona. Agents are prompt inputs, not running processes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    pub role: String,
    pub personality: String,
    pub avatar: Option<String>,
    pub profile_link: Option<String>,
    pub created_at: String,
}

impl Agent {
    /// Create an Agent from a database row.
    pub fn from_row(row: AgentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
            personality: row.personality,
            avatar: row.avatar,
            profile_link: row.profile_link,
            created_at: row.created_at,
        }
    }

    pub fn to_row(&self) -> AgentRow {
        AgentRow {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role.clone(),
            personality: self.personality.clone(),
            avatar: self.avatar.clone(),
            profile_link: self.profile_link.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// Editable agent fields, used for both create and update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentProfile {
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub profile_link: Option<String>,
}
