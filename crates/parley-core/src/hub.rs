//! Per-room broadcast hub for live viewers.
//!
//! One coordinator task owns every change to the room -> subscriber table.
//! Subscribe, unsubscribe and publish requests reach it through a single
//! command queue, so they are applied in the order they were issued.
//!
//! Each subscriber has a bounded outbox. Delivery never waits on a viewer:
//! when an outbox is full the subscriber is dropped from its room and its
//! outbox closed, exactly as if it had unsubscribed.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, warn};

/// Queue sizes for the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HubConfig {
    /// Payloads a viewer may have pending before it is dropped.
    pub subscriber_buffer: usize,
    /// Requests waiting for the coordinator before callers wait.
    pub command_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            subscriber_buffer: 256,
            command_buffer: 1024,
        }
    }
}

pub type SubscriberId = u64;

/// Identifies one registration; enough to unsubscribe it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberKey {
    pub id: SubscriberId,
    pub room_id: String,
}

/// A viewer bound to one room. Receives that room's payloads in publish order.
#[derive(Debug)]
pub struct Subscriber {
    key: SubscriberKey,
    outbox: mpsc::Receiver<Bytes>,
}

impl Subscriber {
    pub fn id(&self) -> SubscriberId {
        self.key.id
    }

    pub fn room_id(&self) -> &str {
        &self.key.room_id
    }

    pub fn key(&self) -> SubscriberKey {
        self.key.clone()
    }

    /// Next payload. `None` once the hub has closed this outbox and it is
    /// drained.
    pub async fn recv(&mut self) -> Option<Bytes> {
        self.outbox.recv().await
    }
}

type RoomTable = HashMap<String, HashMap<SubscriberId, mpsc::Sender<Bytes>>>;

enum Command {
    Subscribe {
        key: SubscriberKey,
        outbox: mpsc::Sender<Bytes>,
        done: oneshot::Sender<()>,
    },
    Unsubscribe {
        key: SubscriberKey,
        done: oneshot::Sender<()>,
    },
    Publish {
        room_id: String,
        payload: Bytes,
    },
}

/// Cloneable handle to a running hub.
///
/// The coordinator task stops when the last handle is dropped, closing every
/// outbox still registered.
#[derive(Clone)]
pub struct Hub {
    commands: mpsc::Sender<Command>,
    rooms: Arc<RwLock<RoomTable>>,
    next_id: Arc<AtomicU64>,
    subscriber_buffer: usize,
}

impl Hub {
    /// Start a hub. Must be called from within a tokio runtime.
    pub fn new(config: HubConfig) -> Self {
        let (commands, inbox) = mpsc::channel(config.command_buffer.max(1));
        let rooms = Arc::new(RwLock::new(RoomTable::new()));
        tokio::spawn(coordinate(inbox, rooms.clone()));

        Self {
            commands,
            rooms,
            next_id: Arc::new(AtomicU64::new(1)),
            subscriber_buffer: config.subscriber_buffer.max(1),
        }
    }

    /// Register a new viewer for `room_id`. The room entry is created on
    /// first use. Payloads published after this returns are delivered.
    pub async fn subscribe(&self, room_id: &str) -> Subscriber {
        let key = SubscriberKey {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            room_id: room_id.to_string(),
        };
        let (outbox, receiver) = mpsc::channel(self.subscriber_buffer);
        let (done, registered) = oneshot::channel();

        let command = Command::Subscribe { key: key.clone(), outbox, done };
        if self.commands.send(command).await.is_ok() {
            let _ = registered.await;
        } else {
            warn!(room_id = %room_id, "Hub is shut down, subscriber will receive nothing");
        }

        debug!(room_id = %room_id, subscriber_id = key.id, "Subscriber registered");
        Subscriber { key, outbox: receiver }
    }

    /// Remove a viewer and close its outbox. Unknown or already removed
    /// subscribers are ignored.
    pub async fn unsubscribe(&self, key: &SubscriberKey) {
        let (done, removed) = oneshot::channel();
        let command = Command::Unsubscribe { key: key.clone(), done };
        if self.commands.send(command).await.is_ok() {
            let _ = removed.await;
        }
    }

    /// Queue `payload` for every current subscriber of `room_id`.
    ///
    /// Waits only for the coordinator to accept the request, never for a
    /// viewer.
    pub async fn publish(&self, room_id: &str, payload: impl Into<Bytes>) {
        let command = Command::Publish {
            room_id: room_id.to_string(),
            payload: payload.into(),
        };
        if self.commands.send(command).await.is_err() {
            warn!(room_id = %room_id, "Hub is shut down, dropping payload");
        }
    }

    /// Serialize `value` as JSON and publish it.
    pub async fn publish_event<T: Serialize>(&self, room_id: &str, value: &T) {
        match serde_json::to_vec(value) {
            Ok(json) => self.publish(room_id, json).await,
            Err(e) => warn!(room_id = %room_id, error = %e, "Failed to serialize room event"),
        }
    }

    /// Live subscribers of `room_id`; 0 for unknown rooms.
    pub async fn subscriber_count(&self, room_id: &str) -> usize {
        self.rooms.read().await.get(room_id).map_or(0, HashMap::len)
    }

    /// Rooms with at least one subscriber.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

fn remove(rooms: &mut RoomTable, key: &SubscriberKey) -> bool {
    let Some(subscribers) = rooms.get_mut(&key.room_id) else {
        return false;
    };
    // Dropping the sender closes the viewer's outbox.
    let removed = subscribers.remove(&key.id).is_some();
    if subscribers.is_empty() {
        rooms.remove(&key.room_id);
    }
    removed
}

async fn coordinate(mut inbox: mpsc::Receiver<Command>, rooms: Arc<RwLock<RoomTable>>) {
    while let Some(command) = inbox.recv().await {
        match command {
            Command::Subscribe { key, outbox, done } => {
                rooms
                    .write()
                    .await
                    .entry(key.room_id)
                    .or_default()
                    .insert(key.id, outbox);
                let _ = done.send(());
            }
            Command::Unsubscribe { key, done } => {
                if remove(&mut *rooms.write().await, &key) {
                    debug!(room_id = %key.room_id, subscriber_id = key.id, "Subscriber removed");
                }
                let _ = done.send(());
            }
            Command::Publish { room_id, payload } => {
                let mut table = rooms.write().await;
                let Some(subscribers) = table.get_mut(&room_id) else {
                    continue;
                };

                subscribers.retain(|id, outbox| match outbox.try_send(payload.clone()) {
                    Ok(()) => true,
                    Err(TrySendError::Full(_)) => {
                        warn!(room_id = %room_id, subscriber_id = id, "Subscriber outbox full, dropping subscriber");
                        false
                    }
                    Err(TrySendError::Closed(_)) => {
                        debug!(room_id = %room_id, subscriber_id = id, "Subscriber went away");
                        false
                    }
                });

                let remaining = subscribers.len();
                if remaining == 0 {
                    table.remove(&room_id);
                }
                debug!(room_id = %room_id, receiver_count = remaining, bytes = payload.len(), "Published");
            }
        }
    }
    debug!("Hub coordinator stopped");
}
