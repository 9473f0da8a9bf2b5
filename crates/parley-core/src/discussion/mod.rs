//! Multi-agent discussion runs.
//!
//! A run is one background task per room. It plays rounds in which every
//! agent of the room speaks once, in creation order, and publishes each
//! state change to the room's viewers through the [`Hub`].
//!
//! A room's persisted status is the authority on whether its run should
//! continue. The run re-reads it before every turn, and also watches a
//! cancellation token so `stop_room` cuts pacing delays short.

pub mod policy;
pub mod prompt;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::agent::model::Agent;
use crate::config::DiscussionConfig;
use crate::error::{ParleyError, ParleyResult};
use crate::event::RoomEvent;
use crate::generation::{GenerationError, TextGenerator};
use crate::hub::Hub;
use crate::message::{self, model::Message, model::MessageKind};
use crate::room::{self, model::Room, model::RoomStatus};
use parley_db::DbPool;
use policy::RoundPolicy;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { rounds: u32 },
    /// The room was stopped, restarted or removed while the run was active.
    Stopped,
    /// A room read or write failed; the status is left as last persisted.
    Failed(String),
}

/// A run that has been started.
pub struct RunHandle {
    pub room: Room,
    task: JoinHandle<RunOutcome>,
}

impl RunHandle {
    /// Wait for the run to end.
    pub async fn join(self) -> RunOutcome {
        self.task
            .await
            .unwrap_or_else(|e| RunOutcome::Failed(format!("run task panicked: {}", e)))
    }
}

struct ActiveRun {
    run_id: u64,
    cancel: CancellationToken,
}

/// Starts, stops and executes discussion runs.
#[derive(Clone)]
pub struct DiscussionDriver {
    db: DbPool,
    hub: Hub,
    generator: Arc<dyn TextGenerator>,
    policy: RoundPolicy,
    context_window: usize,
    turn_delay: Duration,
    round_delay: Duration,
    generation_timeout: Duration,
    runs: Arc<Mutex<HashMap<String, ActiveRun>>>,
    next_run_id: Arc<AtomicU64>,
}

impl DiscussionDriver {
    pub fn new(
        db: DbPool,
        hub: Hub,
        generator: Arc<dyn TextGenerator>,
        config: &DiscussionConfig,
    ) -> Self {
        Self {
            db,
            hub,
            generator,
            policy: RoundPolicy::from(config),
            context_window: config.context_window,
            turn_delay: Duration::from_millis(config.turn_delay_ms),
            round_delay: Duration::from_millis(config.round_delay_ms),
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
            runs: Arc::new(Mutex::new(HashMap::new())),
            next_run_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Mark the room running and spawn its run. Fails with
    /// [`ParleyError::AlreadyRunning`] if the room is already running.
    pub async fn start_room(&self, room_id: &str) -> ParleyResult<RunHandle> {
        let mut runs = self.runs.lock().await;

        let current = room::get_room(&self.db, room_id).await?;
        if current.status == RoomStatus::Running {
            return Err(ParleyError::AlreadyRunning(room_id.to_string()));
        }
        let room = room::set_status(&self.db, room_id, RoomStatus::Running).await?;

        let run_id = self.next_run_id.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        if let Some(previous) = runs.insert(
            room_id.to_string(),
            ActiveRun { run_id, cancel: cancel.clone() },
        ) {
            previous.cancel.cancel();
        }

        self.hub
            .publish_event(room_id, &RoomEvent::status_update(RoomStatus::Running))
            .await;
        drop(runs);

        info!(room_id = %room_id, run_id, "Discussion run started");

        let driver = self.clone();
        let id = room_id.to_string();
        let task = tokio::spawn(async move {
            let outcome = match driver.run(&id, run_id, &cancel).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(room_id = %id, run_id, error = %e, "Discussion run failed");
                    RunOutcome::Failed(e.to_string())
                }
            };
            driver.release(&id, run_id).await;
            info!(room_id = %id, run_id, outcome = ?outcome, "Discussion run ended");
            outcome
        });

        Ok(RunHandle { room, task })
    }

    /// Mark the room stopped and cancel its run, if any. Allowed from every
    /// status.
    pub async fn stop_room(&self, room_id: &str) -> ParleyResult<Room> {
        let mut runs = self.runs.lock().await;

        let room = room::set_status(&self.db, room_id, RoomStatus::Stopped).await?;
        if let Some(active) = runs.remove(room_id) {
            active.cancel.cancel();
        }

        self.hub
            .publish_event(room_id, &RoomEvent::status_update(RoomStatus::Stopped))
            .await;

        info!(room_id = %room_id, "Discussion stopped");
        Ok(room)
    }

    /// Cancel a room's run without touching its status. Returns whether a
    /// run was active.
    pub async fn cancel_run(&self, room_id: &str) -> bool {
        match self.runs.lock().await.remove(room_id) {
            Some(active) => {
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether a run is registered for the room.
    pub async fn is_active(&self, room_id: &str) -> bool {
        self.runs.lock().await.contains_key(room_id)
    }

    async fn release(&self, room_id: &str, run_id: u64) {
        let mut runs = self.runs.lock().await;
        if runs.get(room_id).is_some_and(|active| active.run_id == run_id) {
            runs.remove(room_id);
        }
    }

    async fn run(&self, room_id: &str, run_id: u64, cancel: &CancellationToken) -> ParleyResult<RunOutcome> {
        let view = room::get_room_with_agents(&self.db, room_id).await?;
        self.hub
            .publish_event(room_id, &RoomEvent::room_info(view.clone()))
            .await;

        let topic = self.resolve_topic(&view.room).await?;
        let agents = view.agents;
        info!(room_id = %room_id, agents = agents.len(), topic = %topic, "Discussion topic selected");

        if agents.is_empty() {
            warn!(room_id = %room_id, "Room has no agents, completing without discussion");
            return self.complete(room_id, run_id, cancel, 0).await;
        }

        let mut round = 0;
        loop {
            round += 1;
            debug!(room_id = %room_id, round, "Round started");

            for (turn, agent) in agents.iter().enumerate() {
                if !self.still_running(room_id, cancel).await? {
                    return Ok(RunOutcome::Stopped);
                }

                let content = self.compose_reply(room_id, agent, &topic, round).await;
                if cancel.is_cancelled() {
                    return Ok(RunOutcome::Stopped);
                }

                let reply = Message::from_agent(room_id, agent, content);
                if let Err(e) = message::save_message(&self.db, &reply).await {
                    warn!(room_id = %room_id, agent_id = %agent.id, round, error = %e, "Failed to persist agent message, skipping turn");
                    continue;
                }
                self.hub.publish_event(room_id, &RoomEvent::message(reply)).await;

                let last_in_round = turn + 1 == agents.len();
                if !last_in_round && !pause(cancel, self.turn_delay).await {
                    return Ok(RunOutcome::Stopped);
                }
            }

            if self.policy.should_stop_after(round, agents.len()) {
                break;
            }
            if !pause(cancel, self.round_delay).await {
                return Ok(RunOutcome::Stopped);
            }
        }

        self.complete(room_id, run_id, cancel, round).await
    }

    /// The newest user message, else the room topic (or a default) announced
    /// as a system message.
    async fn resolve_topic(&self, room: &Room) -> ParleyResult<String> {
        if let Some(latest) = message::latest_user_message(&self.db, &room.id).await? {
            return Ok(latest.content);
        }

        let topic = match room.topic.trim() {
            "" => prompt::DEFAULT_TOPIC.to_string(),
            topic => topic.to_string(),
        };

        let announcement = Message::system(&room.id, format!("Discussion topic: {}", topic));
        match message::save_message(&self.db, &announcement).await {
            Ok(()) => {
                self.hub
                    .publish_event(&room.id, &RoomEvent::message(announcement))
                    .await
            }
            Err(e) => warn!(room_id = %room.id, error = %e, "Failed to persist topic announcement"),
        }

        Ok(topic)
    }

    /// Turn boundary: the run continues only while its token is live and the
    /// room is still `running`.
    async fn still_running(&self, room_id: &str, cancel: &CancellationToken) -> ParleyResult<bool> {
        if cancel.is_cancelled() {
            return Ok(false);
        }
        let room = room::get_room(&self.db, room_id).await?;
        if room.status != RoomStatus::Running {
            info!(room_id = %room_id, status = %room.status, "Room no longer running, ending run");
            return Ok(false);
        }
        Ok(true)
    }

    /// Generate `agent`'s reply, falling back to a placeholder on failure.
    async fn compose_reply(&self, room_id: &str, agent: &Agent, topic: &str, round: u32) -> String {
        let recent = if round > 1 {
            message::recent_messages(&self.db, room_id, MessageKind::Agent, self.context_window)
                .await
                .unwrap_or_else(|e| {
                    warn!(room_id = %room_id, error = %e, "Failed to load discussion history");
                    Vec::new()
                })
        } else {
            Vec::new()
        };
        let history = prompt::context_window(&recent, &agent.id);
        let text = prompt::build_prompt(agent, topic, round, &history);

        debug!(room_id = %room_id, agent_id = %agent.id, round, "Generating reply");
        let generated = match tokio::time::timeout(self.generation_timeout, self.generator.generate(&text)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.generation_timeout)),
        };

        match generated {
            Ok(reply) => reply,
            Err(e) => {
                warn!(room_id = %room_id, agent_id = %agent.id, round, error = %e, "Generation failed, using fallback reply");
                prompt::fallback_reply(agent, &e)
            }
        }
    }

    /// Write `completed` unless the run was stopped or replaced meanwhile.
    async fn complete(
        &self,
        room_id: &str,
        run_id: u64,
        cancel: &CancellationToken,
        rounds: u32,
    ) -> ParleyResult<RunOutcome> {
        let mut runs = self.runs.lock().await;

        let owns_room = runs.get(room_id).is_some_and(|active| active.run_id == run_id);
        if !owns_room || !self.still_running(room_id, cancel).await? {
            return Ok(RunOutcome::Stopped);
        }

        match room::set_status(&self.db, room_id, RoomStatus::Completed).await {
            Ok(_) => {}
            Err(ParleyError::InvalidStatusTransition { .. }) => return Ok(RunOutcome::Stopped),
            Err(e) => return Err(e),
        }
        runs.remove(room_id);

        self.hub
            .publish_event(room_id, &RoomEvent::status_update(RoomStatus::Completed))
            .await;

        info!(room_id = %room_id, rounds, "Discussion completed");
        Ok(RunOutcome::Completed { rounds })
    }
}

/// Sleep for `delay` unless cancelled first. Returns `false` on cancellation.
async fn pause(cancel: &CancellationToken, delay: Duration) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{self, model::AgentProfile};
    use crate::event::ControlEvent;
    use crate::hub::{HubConfig, Subscriber};
    use async_trait::async_trait;
    use bytes::Bytes;
    use parley_db::MemoryStore;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::{mpsc, oneshot};

    const END: &[u8] = b"--end--";

    /// Replies "reply N"; fails for prompts containing `fail_marker`.
    #[derive(Default)]
    struct ScriptedGenerator {
        fail_marker: Option<String>,
        prompts: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            if let Some(marker) = &self.fail_marker {
                if prompt.contains(marker.as_str()) {
                    return Err(GenerationError::Status { status: 503, body: "overloaded".into() });
                }
            }
            Ok(format!("reply {}", prompts.len()))
        }
    }

    /// Hands every prompt to the test and waits for its answer.
    struct GatedGenerator {
        requests: mpsc::Sender<oneshot::Sender<String>>,
    }

    #[async_trait]
    impl TextGenerator for GatedGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            let (reply, answer) = oneshot::channel();
            if self.requests.send(reply).await.is_err() {
                return Err(GenerationError::EmptyBody);
            }
            answer.await.map_err(|_| GenerationError::EmptyBody)
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        db: DbPool,
        hub: Hub,
    }

    impl Fixture {
        fn new() -> Self {
            let store = Arc::new(MemoryStore::new());
            let db: DbPool = store.clone();
            Self { store, db, hub: Hub::new(HubConfig::default()) }
        }

        fn driver(&self, generator: Arc<dyn TextGenerator>) -> DiscussionDriver {
            let config = DiscussionConfig {
                turn_delay_ms: 0,
                round_delay_ms: 0,
                generation_timeout_secs: 5,
                ..Default::default()
            };
            DiscussionDriver::new(self.db.clone(), self.hub.clone(), generator, &config)
        }

        async fn agent(&self, name: &str, personality: &str) -> String {
            let profile = AgentProfile {
                name: name.to_string(),
                role: "analyst".to_string(),
                personality: personality.to_string(),
                ..Default::default()
            };
            agent::create_agent(&self.db, profile).await.unwrap().id
        }

        async fn room(&self, topic: &str, agent_ids: &[String]) -> String {
            room::create_room(&self.db, topic, agent_ids).await.unwrap().room.id
        }

        /// Everything published to the viewer so far, in order.
        async fn drain(&self, viewer: &mut Subscriber) -> Vec<RoomEvent> {
            self.hub.publish(viewer.room_id(), Bytes::from_static(END)).await;
            let mut events = Vec::new();
            loop {
                let payload = tokio::time::timeout(Duration::from_secs(5), viewer.recv())
                    .await
                    .expect("viewer timed out")
                    .expect("viewer closed");
                if payload.as_ref() == END {
                    return events;
                }
                events.push(serde_json::from_slice(&payload).unwrap());
            }
        }
    }

    fn agent_speakers(events: &[RoomEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                RoomEvent::Message(m) if m.kind == MessageKind::Agent => m.agent_name.clone(),
                _ => None,
            })
            .collect()
    }

    fn statuses(events: &[RoomEvent]) -> Vec<RoomStatus> {
        events
            .iter()
            .filter_map(|e| match e {
                RoomEvent::Control(ControlEvent::StatusUpdate { status }) => Some(*status),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_two_agents_play_four_alternating_rounds() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let b = fx.agent("B", "bold").await;
        let room_id = fx.room("climate policy", &[a, b]).await;
        let mut viewer = fx.hub.subscribe(&room_id).await;

        let generator = Arc::new(ScriptedGenerator::default());
        let driver = fx.driver(generator.clone());
        let handle = driver.start_room(&room_id).await.unwrap();
        assert_eq!(handle.room.status, RoomStatus::Running);
        assert_eq!(handle.join().await, RunOutcome::Completed { rounds: 4 });

        let events = fx.drain(&mut viewer).await;
        assert_eq!(agent_speakers(&events), vec!["A", "B", "A", "B", "A", "B", "A", "B"]);
        assert_eq!(statuses(&events), vec![RoomStatus::Running, RoomStatus::Completed]);

        let room_infos: Vec<&RoomEvent> = events.iter().filter(|e| e.kind() == "room_info").collect();
        assert_eq!(room_infos.len(), 1);
        assert_eq!(events[0].kind(), "status_update");
        assert_eq!(events[1].kind(), "room_info");

        let announced = events.iter().position(|e| e.kind() == "system").unwrap();
        let first_agent = events.iter().position(|e| e.kind() == "agent").unwrap();
        assert!(announced < first_agent);

        let prompts = generator.prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 8);
        assert!(prompts[0].contains("climate policy"));
        // B's first turn in round 2 sees A's lines but never its own.
        assert!(prompts[3].contains("A: reply 3"));
        assert!(!prompts[3].contains("B: reply 2"));

        let room = room::get_room(&fx.db, &room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Completed);
        let stored = message::list_messages(&fx.db, &room_id).await.unwrap();
        assert_eq!(stored.iter().filter(|m| m.kind == MessageKind::Agent).count(), 8);
        assert!(!driver.is_active(&room_id).await);
    }

    #[tokio::test]
    async fn test_three_agents_stop_at_min_rounds() {
        let fx = Fixture::new();
        let mut ids = Vec::new();
        for name in ["A", "B", "C"] {
            ids.push(fx.agent(name, "calm").await);
        }
        let room_id = fx.room("trade", &ids).await;

        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        let outcome = driver.start_room(&room_id).await.unwrap().join().await;

        assert_eq!(outcome, RunOutcome::Completed { rounds: 3 });
        let stored = message::recent_messages(&fx.db, &room_id, MessageKind::Agent, 100)
            .await
            .unwrap();
        assert_eq!(stored.len(), 9);
    }

    #[tokio::test]
    async fn test_generation_failure_becomes_fallback_message() {
        let fx = Fixture::new();
        let a = fx.agent("Ada", "flaky").await;
        let b = fx.agent("Bo", "steady").await;
        let room_id = fx.room("tea", &[a.clone(), b.clone()]).await;
        let mut viewer = fx.hub.subscribe(&room_id).await;

        let generator = Arc::new(ScriptedGenerator {
            fail_marker: Some("Personality: flaky".into()),
            ..Default::default()
        });
        let driver = fx.driver(generator);
        let outcome = driver.start_room(&room_id).await.unwrap().join().await;
        assert_eq!(outcome, RunOutcome::Completed { rounds: 4 });

        let events = fx.drain(&mut viewer).await;
        let agent_messages: Vec<&Message> = events
            .iter()
            .filter_map(|e| match e {
                RoomEvent::Message(m) if m.kind == MessageKind::Agent => Some(m),
                _ => None,
            })
            .collect();

        assert_eq!(agent_messages.len(), 8);
        assert_eq!(agent_messages[0].agent_id.as_deref(), Some(a.as_str()));
        assert!(agent_messages[0].content.contains("Ada"));
        assert!(agent_messages[0].content.contains("503"));
        assert_eq!(agent_messages[1].agent_id.as_deref(), Some(b.as_str()));
        assert!(agent_messages[1].content.starts_with("reply"));
    }

    #[tokio::test]
    async fn test_empty_topic_is_announced_before_first_turn() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let room_id = fx.room("", &[a]).await;

        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        driver.start_room(&room_id).await.unwrap().join().await;

        let stored = message::list_messages(&fx.db, &room_id).await.unwrap();
        assert_eq!(stored[0].kind, MessageKind::System);
        assert!(stored[0].content.contains(prompt::DEFAULT_TOPIC));
        assert_eq!(stored[1].kind, MessageKind::Agent);
    }

    #[tokio::test]
    async fn test_latest_user_message_becomes_topic() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let room_id = fx.room("stored topic", &[a]).await;
        message::post_user_message(&fx.db, &fx.hub, &room_id, "first question").await.unwrap();
        message::post_user_message(&fx.db, &fx.hub, &room_id, "what about nuclear?").await.unwrap();

        let generator = Arc::new(ScriptedGenerator::default());
        let driver = fx.driver(generator.clone());
        driver.start_room(&room_id).await.unwrap().join().await;

        let prompts = generator.prompts.lock().unwrap().clone();
        assert!(prompts[0].contains("Current topic: what about nuclear?"));
        let stored = message::list_messages(&fx.db, &room_id).await.unwrap();
        assert!(stored.iter().all(|m| m.kind != MessageKind::System));
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let room_id = fx.room("t", &[a]).await;

        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        let first = driver.start_room(&room_id).await.unwrap();
        let err = driver.start_room(&room_id).await.err().unwrap();
        assert!(matches!(err, ParleyError::AlreadyRunning(_)));

        driver.stop_room(&room_id).await.unwrap();
        assert_eq!(first.join().await, RunOutcome::Stopped);
        let stored = message::recent_messages(&fx.db, &room_id, MessageKind::Agent, 10)
            .await
            .unwrap();
        assert!(stored.is_empty());

        // A stopped room can be started again.
        let again = driver.start_room(&room_id).await.unwrap();
        assert_eq!(again.join().await, RunOutcome::Completed { rounds: 4 });
    }

    #[tokio::test]
    async fn test_stop_mid_run_keeps_stopped_status() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let b = fx.agent("B", "bold").await;
        let room_id = fx.room("t", &[a, b]).await;
        let mut viewer = fx.hub.subscribe(&room_id).await;

        let (requests, mut gate) = mpsc::channel(4);
        let driver = fx.driver(Arc::new(GatedGenerator { requests }));
        let handle = driver.start_room(&room_id).await.unwrap();

        gate.recv().await.unwrap().send("A opens".to_string()).unwrap();
        // B's request means A's turn has been persisted and published.
        let b_reply = gate.recv().await.unwrap();
        driver.stop_room(&room_id).await.unwrap();
        let _ = b_reply.send("too late".to_string());

        assert_eq!(handle.join().await, RunOutcome::Stopped);

        let events = fx.drain(&mut viewer).await;
        assert_eq!(agent_speakers(&events), vec!["A"]);
        assert_eq!(statuses(&events), vec![RoomStatus::Running, RoomStatus::Stopped]);

        let room = room::get_room(&fx.db, &room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Stopped);
        let stored = message::recent_messages(&fx.db, &room_id, MessageKind::Agent, 10)
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn test_message_persistence_failure_skips_turns() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let room_id = fx.room("t", &[a]).await;
        let mut viewer = fx.hub.subscribe(&room_id).await;
        fx.store.reject_message_writes(true);

        let generator = Arc::new(ScriptedGenerator::default());
        let driver = fx.driver(generator.clone());
        let outcome = driver.start_room(&room_id).await.unwrap().join().await;

        assert_eq!(outcome, RunOutcome::Completed { rounds: 4 });
        assert_eq!(generator.prompts.lock().unwrap().len(), 4);
        let events = fx.drain(&mut viewer).await;
        assert!(agent_speakers(&events).is_empty());
        assert!(events.iter().all(|e| !matches!(e, RoomEvent::Message(_))));
    }

    #[tokio::test]
    async fn test_room_write_failure_ends_run() {
        let fx = Fixture::new();
        let a = fx.agent("A", "calm").await;
        let room_id = fx.room("t", &[a]).await;
        let mut viewer = fx.hub.subscribe(&room_id).await;

        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        let handle = driver.start_room(&room_id).await.unwrap();
        fx.store.reject_room_writes(true);

        assert!(matches!(handle.join().await, RunOutcome::Failed(_)));

        let room = room::get_room(&fx.db, &room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Running);
        let events = fx.drain(&mut viewer).await;
        assert_eq!(statuses(&events), vec![RoomStatus::Running]);
        assert!(!driver.is_active(&room_id).await);
    }

    #[tokio::test]
    async fn test_room_without_agents_completes() {
        let fx = Fixture::new();
        let room_id = fx.room("lonely", &[]).await;

        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        let outcome = driver.start_room(&room_id).await.unwrap().join().await;

        assert_eq!(outcome, RunOutcome::Completed { rounds: 0 });
        let room = room::get_room(&fx.db, &room_id).await.unwrap();
        assert_eq!(room.status, RoomStatus::Completed);
    }

    #[tokio::test]
    async fn test_stop_unknown_room() {
        let fx = Fixture::new();
        let driver = fx.driver(Arc::new(ScriptedGenerator::default()));
        let err = driver.stop_room("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_pause_is_cut_short_by_cancel() {
        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move { canceller.cancel() });
        let finished = tokio::time::timeout(Duration::from_secs(5), pause(&cancel, Duration::from_secs(60)))
            .await
            .unwrap();
        assert!(!finished);
    }
}
