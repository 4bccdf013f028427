use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::models::StoreEvent;
use crate::services::appointments::AppointmentStore;

pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub config: AppConfig,
    pub store: Mutex<AppointmentStore>,
    pub events_tx: broadcast::Sender<StoreEvent>,
}

impl AppState {
    pub fn new(conn: Connection, config: AppConfig) -> Self {
        let store = AppointmentStore::seeded(
            config.catalog_start,
            config.catalog_weeks,
            config.booking_policy,
        );
        let (events_tx, _) = broadcast::channel(256);
        Self {
            db: Arc::new(Mutex::new(conn)),
            config,
            store: Mutex::new(store),
            events_tx,
        }
    }

    pub fn db(&self) -> Result<MutexGuard<'_, Connection>, AppError> {
        self.db
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("database lock poisoned")))
    }

    pub fn store(&self) -> Result<MutexGuard<'_, AppointmentStore>, AppError> {
        self.store
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("appointment store lock poisoned")))
    }

    /// Fan a store event out to dashboard subscribers; nobody listening is fine.
    pub fn publish(&self, event: StoreEvent) {
        let _ = self.events_tx.send(event);
    }
}
