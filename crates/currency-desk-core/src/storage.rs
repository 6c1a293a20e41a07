// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Options persistence
//
// The options document is stored as JSON under a single fixed key.
// Only SettingsStore writes through these adapters.

use crate::config::StorageConfig;
use crate::types::AppError;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

/// Key under which the serialized options document is kept
pub const OPTIONS_STORAGE_KEY: &str = "options.storage.key";

const OPTIONS_FILE_NAME: &str = "options.json";

/// Durable storage for the serialized options document
pub trait OptionsStorage: Send + Sync {
    /// Load the stored document, if any. Read failures are reported as absence.
    fn load(&self) -> Option<String>;

    /// Store the document, replacing any previous value
    fn save(&self, document: &str) -> Result<(), AppError>;
}

/// Stores the options document in a JSON file
pub struct FileOptionsStorage {
    file_path: PathBuf,
}

impl FileOptionsStorage {
    pub fn new(config: &StorageConfig) -> Self {
        let file_path = config.dir.join(OPTIONS_FILE_NAME);
        tracing::info!("Options file path: {:?}", file_path);
        Self { file_path }
    }

    pub fn file_path(&self) -> &PathBuf {
        &self.file_path
    }
}

impl OptionsStorage for FileOptionsStorage {
    fn load(&self) -> Option<String> {
        if !self.file_path.exists() {
            tracing::debug!("No options file found");
            return None;
        }

        match fs::read_to_string(&self.file_path) {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!("Failed to read options, using defaults: {}", e);
                None
            }
        }
    }

    fn save(&self, document: &str) -> Result<(), AppError> {
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Persistence(format!("Failed to create config dir: {}", e))
            })?;
        }

        fs::write(&self.file_path, document)
            .map_err(|e| AppError::Persistence(format!("Failed to write options: {}", e)))
    }
}

/// In-memory key-value storage, shared by every store handed the same instance
#[derive(Default)]
pub struct MemoryOptionsStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryOptionsStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the storage with a raw document
    pub fn with_document(document: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut entries) = storage.entries.write() {
            entries.insert(OPTIONS_STORAGE_KEY.to_string(), document.into());
        }
        storage
    }
}

impl OptionsStorage for MemoryOptionsStorage {
    fn load(&self) -> Option<String> {
        self.entries
            .read()
            .ok()
            .and_then(|entries| entries.get(OPTIONS_STORAGE_KEY).cloned())
    }

    fn save(&self, document: &str) -> Result<(), AppError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| AppError::Persistence(e.to_string()))?;
        entries.insert(OPTIONS_STORAGE_KEY.to_string(), document.to_string());
        Ok(())
    }
}
