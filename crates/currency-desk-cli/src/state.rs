// SPDX-License-Identifier: AGPL-3.0
// Currency Desk CLI - Application State

use currency_desk_core::{
    AppError, ClientConfig, CurrencyScoopClient, FileOptionsStorage, OptionsBus, OptionsStorage,
    SettingsStore, StorageConfig,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Composition root: one storage, one bus and one client per process
pub struct AppState {
    pub client: Arc<CurrencyScoopClient>,
    storage: Arc<dyn OptionsStorage>,
    bus: OptionsBus,
}

impl AppState {
    /// Create application state, using `config_dir` instead of the platform
    /// config directory when given
    pub fn new(config_dir: Option<PathBuf>, client_config: ClientConfig) -> Result<Self, AppError> {
        let storage_config = match config_dir {
            Some(dir) => StorageConfig::new(dir),
            None => StorageConfig::default_dir()?,
        };

        Ok(Self::with_storage(
            Arc::new(FileOptionsStorage::new(&storage_config)),
            client_config,
        ))
    }

    pub fn with_storage(storage: Arc<dyn OptionsStorage>, client_config: ClientConfig) -> Self {
        Self {
            client: Arc::new(CurrencyScoopClient::new(client_config)),
            storage,
            bus: OptionsBus::new(),
        }
    }

    /// A settings store for one screen. Every store shares the same storage
    /// and bus, so a change made on one screen reaches all the others.
    pub fn settings_store(&self) -> SettingsStore {
        SettingsStore::new(self.storage.clone(), self.bus.clone())
    }
}
