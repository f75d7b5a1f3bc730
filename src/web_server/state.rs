//! Shared application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::mailer::AdminNotifier;
use crate::storage::Storage;
use crate::uploads::UploadStore;

#[derive(Debug, Clone, Copy)]
pub struct ServerSettings {
    pub session_ttl: chrono::Duration,
}

pub struct AppState {
    pub storage: Mutex<Storage>,
    pub uploads: UploadStore,
    /// `None` when mail is not configured.
    pub notifier: Option<AdminNotifier>,
    pub settings: ServerSettings,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        storage: Storage,
        uploads: UploadStore,
        notifier: Option<AdminNotifier>,
        settings: ServerSettings,
    ) -> SharedState {
        Arc::new(Self {
            storage: Mutex::new(storage),
            uploads,
            notifier,
            settings,
        })
    }
}
