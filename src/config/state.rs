// Application state module
// Wires the immutable configuration to the store and forwarder shared by all requests

use super::types::Config;
use crate::forwarder::{ForwardError, Forwarder};
use crate::store::LocalStore;

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: LocalStore,
    pub forwarder: Forwarder,
}

impl AppState {
    /// Build the state from a loaded configuration.
    ///
    /// The store directory is not touched here; call `LocalStore::ensure_dir`
    /// before serving.
    pub fn new(config: Config) -> Result<Self, ForwardError> {
        let store = LocalStore::new(&config.storage.upload_dir, &config.storage.field_name);
        let forwarder = Forwarder::from_config(&config.forwarder)?;
        Ok(Self {
            config,
            store,
            forwarder,
        })
    }

    pub fn access_log_enabled(&self) -> bool {
        self.config.logging.access_log
    }
}
