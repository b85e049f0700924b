use std::sync::Arc;

use crate::config::Config;
use crate::utils::locks::KeyedLocks;

pub mod batch_progress;
pub mod catalog;
pub mod event_log;
pub mod mastery;
pub mod progress_store;
pub mod reward_service;
pub mod submission_service;
pub mod wrong_answer_service;

use catalog::{CatalogReader, StudentDirectory};
use event_log::EventLog;
use progress_store::ProgressStore;
use reward_service::RewardLedger;

/// Shared application state: the engine's stores plus the read-only
/// collaborators it consumes. Student identity is always an explicit
/// parameter on operations; nothing here is session-scoped.
pub struct AppState {
    pub config: Config,
    pub catalog: Arc<dyn CatalogReader>,
    pub directory: Arc<dyn StudentDirectory>,
    pub events: Arc<EventLog>,
    pub progress: Arc<ProgressStore>,
    pub rewards: Arc<RewardLedger>,
    pub attempt_locks: Arc<KeyedLocks<(String, String)>>,
}

impl AppState {
    pub fn new(
        config: Config,
        catalog: Arc<dyn CatalogReader>,
        directory: Arc<dyn StudentDirectory>,
    ) -> Self {
        Self {
            config,
            catalog,
            directory,
            events: Arc::new(EventLog::new()),
            progress: Arc::new(ProgressStore::new()),
            rewards: Arc::new(RewardLedger::new()),
            attempt_locks: Arc::new(KeyedLocks::new()),
        }
    }
}
