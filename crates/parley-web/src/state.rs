//! Application state.

use std::sync::Arc;

use parley_core::config::DiscussionConfig;
use parley_core::{DiscussionDriver, Hub, TextGenerator};
use parley_db::DbPool;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub hub: Hub,
    pub discussion: DiscussionDriver,
    pub generator: Arc<dyn TextGenerator>,
}

impl AppState {
    pub fn new(
        db: DbPool,
        hub: Hub,
        generator: Arc<dyn TextGenerator>,
        discussion: &DiscussionConfig,
    ) -> Self {
        let driver = DiscussionDriver::new(db.clone(), hub.clone(), generator.clone(), discussion);
        Self {
            db,
            hub,
            discussion: driver,
            generator,
        }
    }
}
