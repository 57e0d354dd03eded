use std::sync::Arc;
use crate::config::Config;
use crate::services::{CredentialStore, DocumentStore, TaskStore};

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    pub credentials: CredentialStore,
    pub tasks: TaskStore,
    pub config: Arc<Config>,
}

impl AppState {
    /// Both stores share the one injected persistence handle.
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self {
            credentials: CredentialStore::new(store.clone(), config.auth.bcrypt_cost),
            tasks: TaskStore::new(store),
            config: Arc::new(config),
        }
    }
}
