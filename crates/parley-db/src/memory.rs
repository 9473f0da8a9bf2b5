//! In-process [`Store`] for tests and `serve --memory`.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parley_redis::{AgentRow, MessageRow, RoomRow};
use tokio::sync::RwLock;

use crate::store::{DbError, DbResult, Store};

#[derive(Default)]
struct Tables {
    agents: Vec<AgentRow>,
    rooms: Vec<RoomRow>,
    messages: Vec<MessageRow>,
}

/// Vec-backed store. Insertion order doubles as creation order.
///
/// Message and room writes can be switched to fail, which lets callers
/// exercise their persistence-failure paths.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    reject_messages: AtomicBool,
    reject_rooms: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `create_message` fail until switched back.
    pub fn reject_message_writes(&self, reject: bool) {
        self.reject_messages.store(reject, Ordering::SeqCst);
    }

    /// Make `save_room` fail until switched back.
    pub fn reject_room_writes(&self, reject: bool) {
        self.reject_rooms.store(reject, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_agents(&self) -> DbResult<Vec<AgentRow>> {
        Ok(self.tables.read().await.agents.clone())
    }

    async fn get_agent(&self, id: &str) -> DbResult<AgentRow> {
        self.tables
            .read()
            .await
            .agents
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Agent not found: {}", id)))
    }

    async fn create_agent(&self, row: &AgentRow) -> DbResult<()> {
        self.tables.write().await.agents.push(row.clone());
        Ok(())
    }

    async fn update_agent(&self, row: &AgentRow) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        let existing = tables
            .agents
            .iter_mut()
            .find(|a| a.id == row.id)
            .ok_or_else(|| DbError::NotFound(format!("Agent not found: {}", row.id)))?;
        *existing = row.clone();
        Ok(())
    }

    async fn delete_agent(&self, id: &str) -> DbResult<()> {
        self.tables.write().await.agents.retain(|a| a.id != id);
        Ok(())
    }

    async fn find_agents(&self, ids: &[String]) -> DbResult<Vec<AgentRow>> {
        Ok(self
            .tables
            .read()
            .await
            .agents
            .iter()
            .filter(|a| ids.contains(&a.id))
            .cloned()
            .collect())
    }

    async fn list_rooms(&self) -> DbResult<Vec<RoomRow>> {
        Ok(self.tables.read().await.rooms.clone())
    }

    async fn get_room(&self, id: &str) -> DbResult<RoomRow> {
        self.tables
            .read()
            .await
            .rooms
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| DbError::NotFound(format!("Room not found: {}", id)))
    }

    async fn save_room(&self, row: &RoomRow) -> DbResult<()> {
        if self.reject_rooms.load(Ordering::SeqCst) {
            return Err(DbError::WriteRejected(format!("room {}", row.id)));
        }
        let mut tables = self.tables.write().await;
        match tables.rooms.iter_mut().find(|r| r.id == row.id) {
            Some(existing) => *existing = row.clone(),
            None => tables.rooms.push(row.clone()),
        }
        Ok(())
    }

    async fn delete_room(&self, id: &str) -> DbResult<()> {
        let mut tables = self.tables.write().await;
        tables.rooms.retain(|r| r.id != id);
        tables.messages.retain(|m| m.room_id != id);
        Ok(())
    }

    async fn create_message(&self, row: &MessageRow) -> DbResult<()> {
        if self.reject_messages.load(Ordering::SeqCst) {
            return Err(DbError::WriteRejected(format!("message {}", row.id)));
        }
        self.tables.write().await.messages.push(row.clone());
        Ok(())
    }

    async fn list_messages(&self, room_id: &str) -> DbResult<Vec<MessageRow>> {
        Ok(self
            .tables
            .read()
            .await
            .messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        room_id: &str,
        kind: &str,
        limit: usize,
    ) -> DbResult<Vec<MessageRow>> {
        Ok(self
            .tables
            .read()
            .await
            .messages
            .iter()
            .rev()
            .filter(|m| m.room_id == room_id && m.kind == kind)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(id: &str, room_id: &str, kind: &str) -> MessageRow {
        MessageRow {
            id: id.to_string(),
            room_id: room_id.to_string(),
            kind: kind.to_string(),
            content: format!("content of {}", id),
            agent_id: None,
            agent_name: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    fn agent(id: &str) -> AgentRow {
        AgentRow {
            id: id.to_string(),
            name: id.to_uppercase(),
            role: "analyst".to_string(),
            personality: "calm".to_string(),
            avatar: None,
            profile_link: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn test_recent_messages_newest_first_filtered_by_kind() {
        let store = MemoryStore::new();
        for (id, kind) in [("m1", "agent"), ("m2", "user"), ("m3", "agent"), ("m4", "agent")] {
            store.create_message(&message(id, "r1", kind)).await.unwrap();
        }
        store.create_message(&message("other", "r2", "agent")).await.unwrap();

        let recent = store.recent_messages("r1", "agent", 2).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m4", "m3"]);

        let latest_user = store.latest_user_message("r1").await.unwrap();
        assert_eq!(latest_user.map(|m| m.id), Some("m2".to_string()));
        assert!(store.latest_user_message("r2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_agents_keeps_creation_order() {
        let store = MemoryStore::new();
        for id in ["a", "b", "c"] {
            store.create_agent(&agent(id)).await.unwrap();
        }
        let found = store
            .find_agents(&["c".to_string(), "a".to_string(), "zzz".to_string()])
            .await
            .unwrap();
        let ids: Vec<&str> = found.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_delete_room_removes_messages() {
        let store = MemoryStore::new();
        let room = RoomRow {
            id: "r1".to_string(),
            topic: "t".to_string(),
            status: "pending".to_string(),
            agent_ids: vec![],
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        store.save_room(&room).await.unwrap();
        store.create_message(&message("m1", "r1", "system")).await.unwrap();

        store.delete_room("r1").await.unwrap();

        assert!(matches!(store.get_room("r1").await, Err(DbError::NotFound(_))));
        assert!(store.list_messages("r1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_writes() {
        let store = MemoryStore::new();
        store.reject_message_writes(true);
        assert!(store.create_message(&message("m1", "r1", "agent")).await.is_err());
        store.reject_message_writes(false);
        assert!(store.create_message(&message("m1", "r1", "agent")).await.is_ok());
    }
}
