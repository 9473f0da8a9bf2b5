//! Parley Core Library
//!
//! Domain models, the per-room broadcast hub and the multi-agent discussion
//! driver.

pub mod agent;
pub mod config;
pub mod discussion;
pub mod error;
pub mod event;
pub mod generation;
pub mod hub;
pub mod message;
pub mod room;

pub use config::Config;
pub use discussion::{DiscussionDriver, RunHandle, RunOutcome};
pub use error::{ParleyError, ParleyResult};
pub use event::RoomEvent;
pub use generation::{DashScopeClient, GenerationError, TextGenerator};
pub use hub::{Hub, HubConfig, Subscriber, SubscriberKey};
