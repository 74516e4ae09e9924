//! Application state: trainer config and the registry of live session snapshots.
//!
//! The registry is the polling side of the presentation contract: every trainer
//! publishes its latest `SessionOut` here, and `GET /api/v1/sessions/:id` reads it.

use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

use crate::config::{load_trainer_config_from_env, TrainerConfig};
use crate::protocol::SessionOut;

#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: Arc<RwLock<HashMap<String, SessionOut>>>,
    pub config: TrainerConfig,
}

impl AppState {
    /// Build state from env: load config (or defaults), start with no sessions.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let config = load_trainer_config_from_env().unwrap_or_default();
        info!(
            target: "quadrant_trainer",
            delay_ms = config.pacing.next_challenge_delay_ms,
            static_dir = %config.server.static_dir,
            "Trainer configuration ready"
        );
        Self::with_config(config)
    }

    pub fn with_config(config: TrainerConfig) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), config }
    }

    #[instrument(level = "debug", skip(self, snapshot))]
    pub async fn publish(&self, id: &str, snapshot: SessionOut) {
        self.sessions.write().await.insert(id.to_string(), snapshot);
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn unregister(&self, id: &str) {
        let removed = self.sessions.write().await.remove(id).is_some();
        debug!(target: "session", %id, removed, "Session unregistered");
    }

    /// Read-only access to a session snapshot by id.
    pub async fn get_session(&self, id: &str) -> Option<SessionOut> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn live_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }
}
