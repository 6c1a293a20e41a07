// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Favorites dashboard
//
// Shows the live rate of every favorite against the base currency.
// Refreshes on demand and whenever the options document is broadcast.
// Overlapping loads resolve latest-wins, like conversions.

use crate::bus::OptionsSubscription;
use crate::catalog::CurrencyCatalogClient;
use crate::projection::{project_favorites_rates, FavoriteRateRow};
use crate::settings::SettingsStore;
use crate::types::{Currency, LoadState, Options};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Loaded dashboard contents
#[derive(Debug, Clone, PartialEq)]
pub struct RatesBoard {
    pub base: Currency,
    pub rows: Vec<FavoriteRateRow>,
    pub refreshed_at: DateTime<Utc>,
}

/// View model for the favorites screen
pub struct FavoritesDashboard<C: CurrencyCatalogClient + ?Sized> {
    store: SettingsStore,
    client: Arc<C>,
    latest_id: AtomicU64,
    state: watch::Sender<LoadState<RatesBoard>>,
}

impl<C: CurrencyCatalogClient + ?Sized> FavoritesDashboard<C> {
    pub fn new(store: SettingsStore, client: Arc<C>) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            store,
            client,
            latest_id: AtomicU64::new(0),
            state,
        }
    }

    pub fn state(&self) -> LoadState<RatesBoard> {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<LoadState<RatesBoard>> {
        self.state.subscribe()
    }

    /// Reload rates for the current options document
    pub async fn refresh(&self) -> LoadState<RatesBoard> {
        self.handle_update(self.store.current()).await
    }

    /// Reload rates for a broadcast document.
    ///
    /// Returns what this load produced. It only reaches watchers if no newer
    /// load started while it was in flight.
    pub async fn handle_update(&self, options: Options) -> LoadState<RatesBoard> {
        let mut load_id = 0;
        self.state.send_modify(|state| {
            load_id = self.latest_id.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LoadState::Loading;
        });

        let loaded = self.load(&options).await;

        let surfaced = self.state.send_if_modified(|current| {
            if self.latest_id.load(Ordering::SeqCst) != load_id {
                return false;
            }
            *current = loaded.clone();
            true
        });
        if !surfaced {
            tracing::debug!("Rates load #{} superseded, discarding result", load_id);
        }
        loaded
    }

    /// Follow the store until every bus handle is dropped
    pub async fn run_updates(&self, updates: OptionsSubscription) {
        while let Some(options) = updates.next().await {
            tracing::debug!("Favorites dashboard received options update");
            self.handle_update(options).await;
        }
    }

    async fn load(&self, options: &Options) -> LoadState<RatesBoard> {
        let base = options.base_currency.clone();

        if options.favorites.is_empty() {
            return LoadState::Loaded(RatesBoard {
                base,
                rows: Vec::new(),
                refreshed_at: Utc::now(),
            });
        }

        let codes = options.favorite_codes();
        match self.client.get_rates(&base.code, &codes).await {
            Some(snapshot) => LoadState::Loaded(RatesBoard {
                rows: project_favorites_rates(options, &snapshot),
                base,
                refreshed_at: Utc::now(),
            }),
            None => {
                tracing::warn!("Rates unavailable for base {}", base.code);
                LoadState::Failed
            }
        }
    }
}
