// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Settings store
//
// The options document is read from storage on every access so that any
// number of stores over the same storage agree. Every change is persisted
// and then broadcast on the shared bus.

use crate::bus::{OptionsBus, OptionsSubscription};
use crate::storage::OptionsStorage;
use crate::types::{AppError, Currency, Options};
use std::sync::Arc;

/// Single owner of the persisted options document
#[derive(Clone)]
pub struct SettingsStore {
    storage: Arc<dyn OptionsStorage>,
    bus: OptionsBus,
}

impl SettingsStore {
    /// Create a store over the given storage, publishing on the given bus
    pub fn new(storage: Arc<dyn OptionsStorage>, bus: OptionsBus) -> Self {
        Self { storage, bus }
    }

    /// Current document, or the default when nothing valid is stored
    pub fn current(&self) -> Options {
        let Some(content) = self.storage.load() else {
            return Options::default();
        };

        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse stored options, using defaults: {}", e);
            Options::default()
        })
    }

    /// Subscribe to every document broadcast after this call
    pub fn subscribe(&self) -> OptionsSubscription {
        self.bus.subscribe()
    }

    /// The bus this store publishes on
    pub fn bus(&self) -> &OptionsBus {
        &self.bus
    }

    /// Check whether a currency code is among the favorites
    pub fn is_favorite(&self, code: &str) -> bool {
        self.current().is_favorite(code)
    }

    /// Replace the base currency, keeping favorites
    pub fn set_base_currency(&self, currency: Currency) -> Result<(), AppError> {
        tracing::info!("Setting base currency: {}", currency.code);
        self.apply(|options| Some(options.with_base_currency(currency)))
            .map(|_| ())
    }

    /// Append a favorite. Returns `false` without persisting or broadcasting
    /// when a favorite with the same code already exists.
    pub fn add_favorite(&self, currency: Currency) -> Result<bool, AppError> {
        let code = currency.code.clone();
        let changed = self.apply(|options| options.with_favorite(currency))?;
        if changed {
            tracing::info!("Added favorite: {}", code);
        } else {
            tracing::debug!("Favorite already present: {}", code);
        }
        Ok(changed)
    }

    /// Remove the favorite matching the currency's code. Returns `false`
    /// without persisting or broadcasting when it is not a favorite.
    pub fn remove_favorite(&self, currency: &Currency) -> Result<bool, AppError> {
        let changed = self.apply(|options| options.without_favorite(&currency.code))?;
        if changed {
            tracing::info!("Removed favorite: {}", currency.code);
        } else {
            tracing::debug!("Favorite not present: {}", currency.code);
        }
        Ok(changed)
    }

    /// Run one read-modify-write-publish step under the bus write lock.
    /// `update` returns `None` when there is nothing to change.
    fn apply<F>(&self, update: F) -> Result<bool, AppError>
    where
        F: FnOnce(&Options) -> Option<Options>,
    {
        let _guard = self.bus.write_guard();

        let Some(updated) = update(&self.current()) else {
            return Ok(false);
        };

        if let Err(e) = self.persist(&updated) {
            tracing::error!("Failed to persist options: {}", e);
            return Err(e);
        }

        self.bus.publish(&updated);
        Ok(true)
    }

    fn persist(&self, options: &Options) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(options)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize options: {}", e)))?;
        self.storage.save(&content)
    }
}
