// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Shared logic for all frontends
//
// This crate provides:
// - Currency, Options and rate types, plus AppError
// - SettingsStore over a pluggable OptionsStorage, broadcasting on OptionsBus
// - CurrencyCatalogClient and the CurrencyScoop HTTP client
// - Pure display projections
// - ConversionSession, FavoritesDashboard and OptionsEditor view models
//
// Frontend-specific code lives in separate crates.

pub mod bus;
pub mod catalog;
pub mod config;
pub mod conversion;
pub mod editor;
pub mod favorites;
pub mod projection;
pub mod settings;
pub mod storage;
pub mod types;

// Re-export commonly used items
pub use bus::{OptionsBus, OptionsSubscription};
pub use catalog::{CurrencyCatalogClient, CurrencyScoopClient};
pub use config::{ClientConfig, StorageConfig};
pub use conversion::{ConversionOutcome, ConversionSession, ConversionState};
pub use editor::{CurrencyPicker, OptionsEditor};
pub use favorites::{FavoritesDashboard, RatesBoard};
pub use projection::{
    EditorRow, FavoriteRateRow, FavoriteSlot, OptionsEditorView, RateDisplay,
};
pub use settings::SettingsStore;
pub use storage::{FileOptionsStorage, MemoryOptionsStorage, OptionsStorage};
pub use types::{AppError, Amount, ConversionResult, Currency, LoadState, Options, RateSnapshot};
