//! Server State
//!
//! Shared by every handler through axum's `State` extractor. Cloning is
//! cheap: all members are reference counted.

use std::sync::Arc;

use crate::auth::AdminSessionGate;
use crate::core::{Config, Result};
use crate::db::{EventStore, RedbEventStore};
use crate::services::EventOrderingService;

#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<Config>,
    /// Authoritative event collection
    pub store: Arc<dyn EventStore>,
    pub ordering: EventOrderingService,
    pub sessions: AdminSessionGate,
}

impl ServerState {
    /// Assemble state around an existing store
    pub fn with_store(config: &Config, store: Arc<dyn EventStore>) -> Self {
        Self {
            config: Arc::new(config.clone()),
            ordering: EventOrderingService::new(store.clone(), config.reorder_policy),
            sessions: AdminSessionGate::from_config(config),
            store,
        }
    }

    /// Initialize server state
    ///
    /// 1. Work directory (created if missing)
    /// 2. Event database (`work_dir/events.redb`)
    /// 3. Services
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;

        let db_path = config.database_path();
        let store = RedbEventStore::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Event database opened");

        Ok(Self::with_store(config, Arc::new(store)))
    }
}
