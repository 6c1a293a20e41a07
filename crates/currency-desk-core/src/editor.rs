// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Options editor and currency picker
//
// The editor fetches the catalog once and re-projects it against every new
// options document. The picker is a one-shot list with a highlighted entry.

use crate::bus::OptionsSubscription;
use crate::catalog::CurrencyCatalogClient;
use crate::projection::{project_currency_picker, project_options_editor, OptionsEditorView};
use crate::settings::SettingsStore;
use crate::types::{AppError, Currency, LoadState, Options};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

pub const BASE_CURRENCY_PICKER_TITLE: &str = "Base Currency";

/// Pick one currency from the full catalog
pub struct CurrencyPicker<C: CurrencyCatalogClient + ?Sized> {
    client: Arc<C>,
    title: String,
    selected_code: Option<String>,
}

impl<C: CurrencyCatalogClient + ?Sized> CurrencyPicker<C> {
    pub fn new(client: Arc<C>, title: impl Into<String>, selected_code: Option<String>) -> Self {
        Self {
            client,
            title: title.into(),
            selected_code,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selected_code(&self) -> Option<&str> {
        self.selected_code.as_deref()
    }

    /// Catalog sorted by name with the current selection first
    pub async fn load(&self) -> LoadState<Vec<Currency>> {
        let catalog = self.client.list_currencies().await;
        if catalog.is_none() {
            tracing::warn!("Currency catalog unavailable for picker");
        }
        LoadState::from_option(
            catalog.map(|list| project_currency_picker(&list, self.selected_code.as_deref())),
        )
    }

    pub fn is_selected(&self, currency: &Currency) -> bool {
        self.selected_code.as_deref() == Some(currency.code.as_str())
    }

    /// Record the user's choice and hand it back to the caller
    pub fn select(&mut self, currency: Currency) -> Currency {
        self.selected_code = Some(currency.code.clone());
        currency
    }
}

/// View model for the options screen
pub struct OptionsEditor<C: CurrencyCatalogClient + ?Sized> {
    store: SettingsStore,
    client: Arc<C>,
    catalog: Mutex<Option<Vec<Currency>>>,
    state: watch::Sender<LoadState<OptionsEditorView>>,
}

impl<C: CurrencyCatalogClient + ?Sized> OptionsEditor<C> {
    pub fn new(store: SettingsStore, client: Arc<C>) -> Self {
        let (state, _) = watch::channel(LoadState::Loading);
        Self {
            store,
            client,
            catalog: Mutex::new(None),
            state,
        }
    }

    pub fn state(&self) -> LoadState<OptionsEditorView> {
        self.state.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<LoadState<OptionsEditorView>> {
        self.state.subscribe()
    }

    /// Fetch the catalog and project it against the current options
    pub async fn load(&self) -> LoadState<OptionsEditorView> {
        self.state.send_replace(LoadState::Loading);

        let catalog = self.client.list_currencies().await;
        if catalog.is_none() {
            tracing::warn!("Currency catalog unavailable for options editor");
        }
        *self.cached_catalog() = catalog;

        self.reproject(&self.store.current())
    }

    /// Handle a favorite switch being flipped
    pub fn toggle_favorite(
        &self,
        currency: Currency,
        is_favorite: bool,
    ) -> Result<LoadState<OptionsEditorView>, AppError> {
        if is_favorite {
            self.store.add_favorite(currency)?;
        } else {
            self.store.remove_favorite(&currency)?;
        }
        Ok(self.reproject(&self.store.current()))
    }

    pub fn set_base_currency(
        &self,
        currency: Currency,
    ) -> Result<LoadState<OptionsEditorView>, AppError> {
        self.store.set_base_currency(currency)?;
        Ok(self.reproject(&self.store.current()))
    }

    /// Picker for the base currency, highlighting the current one
    pub fn base_currency_picker(&self) -> CurrencyPicker<C> {
        CurrencyPicker::new(
            self.client.clone(),
            BASE_CURRENCY_PICKER_TITLE,
            Some(self.store.current().base_currency.code),
        )
    }

    /// Re-project on every broadcast until every bus handle is dropped
    pub async fn run_updates(&self, updates: OptionsSubscription) {
        while let Some(options) = updates.next().await {
            self.reproject(&options);
        }
    }

    fn reproject(&self, options: &Options) -> LoadState<OptionsEditorView> {
        let next = match self.cached_catalog().as_deref() {
            Some(catalog) => LoadState::Loaded(project_options_editor(options, catalog)),
            None => LoadState::Failed,
        };
        self.state.send_replace(next.clone());
        next
    }

    fn cached_catalog(&self) -> std::sync::MutexGuard<'_, Option<Vec<Currency>>> {
        self.catalog
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::OptionsBus;
    use crate::catalog::mock::MockCatalogClient;
    use crate::projection::FavoriteSlot;
    use crate::storage::MemoryOptionsStorage;

    fn usd() -> Currency {
        Currency::new("USD", "United States dollar")
    }

    fn cad() -> Currency {
        Currency::new("CAD", "Canadian dollar")
    }

    fn store() -> SettingsStore {
        SettingsStore::new(Arc::new(MemoryOptionsStorage::new()), OptionsBus::new())
    }

    #[tokio::test]
    async fn test_picker_failed_vs_empty() {
        let unavailable = CurrencyPicker::new(Arc::new(MockCatalogClient::new()), "Pick", None);
        assert!(unavailable.load().await.is_failed());

        let empty = CurrencyPicker::new(
            Arc::new(MockCatalogClient::with_currencies(Some(Vec::new()))),
            "Pick",
            None,
        );
        assert_eq!(empty.load().await, LoadState::Loaded(Vec::new()));
    }

    #[tokio::test]
    async fn test_picker_highlights_selection() {
        let client = Arc::new(MockCatalogClient::with_currencies(Some(vec![cad(), usd()])));
        let mut picker = CurrencyPicker::new(client, "Pick", Some("USD".to_string()));

        let list = picker.load().await;
        assert_eq!(list.loaded().unwrap()[0], usd());
        assert!(picker.is_selected(&usd()));

        let chosen = picker.select(cad());
        assert_eq!(chosen, cad());
        assert!(picker.is_selected(&cad()));
        assert!(!picker.is_selected(&usd()));
    }

    #[tokio::test]
    async fn test_editor_add_twice_keeps_single_favorite() {
        let client = Arc::new(MockCatalogClient::with_currencies(Some(vec![usd(), cad()])));
        let store = store();
        let sub = store.subscribe();
        let editor = OptionsEditor::new(store.clone(), client);

        let initial = editor.load().await;
        assert_eq!(
            initial.loaded().unwrap().favorites_rows,
            vec![FavoriteSlot::NoneSelected]
        );

        editor.toggle_favorite(cad(), true).unwrap();
        let view = editor.toggle_favorite(cad(), true).unwrap();

        assert_eq!(store.current().favorites, vec![cad()]);
        assert_eq!(sub.drain().len(), 1);
        let view = view.loaded().unwrap().clone();
        assert_eq!(view.favorites_rows.len(), 1);
        assert!(view.all_currencies_rows.iter().any(|r| r.currency == cad() && r.is_favorite));
    }

    #[tokio::test]
    async fn test_editor_without_catalog_fails_but_still_edits() {
        let store = store();
        let editor = OptionsEditor::new(store.clone(), Arc::new(MockCatalogClient::new()));

        assert!(editor.load().await.is_failed());
        let state = editor.set_base_currency(cad()).unwrap();

        assert!(state.is_failed());
        assert_eq!(store.current().base_currency, cad());
    }

    #[tokio::test]
    async fn test_base_picker_uses_stored_base() {
        let store = store();
        store.set_base_currency(cad()).unwrap();
        let editor = OptionsEditor::new(store, Arc::new(MockCatalogClient::new()));

        let picker = editor.base_currency_picker();
        assert_eq!(picker.title(), BASE_CURRENCY_PICKER_TITLE);
        assert_eq!(picker.selected_code(), Some("CAD"));
    }

    #[tokio::test]
    async fn test_editor_follows_other_screens() {
        let client = Arc::new(MockCatalogClient::with_currencies(Some(vec![usd(), cad()])));
        let storage = Arc::new(MemoryOptionsStorage::new());
        let bus = OptionsBus::new();
        let converter_screen = SettingsStore::new(storage.clone(), bus.clone());
        let editor = Arc::new(OptionsEditor::new(SettingsStore::new(storage, bus), client));
        editor.load().await;
        let mut watcher = editor.watch();

        let updates = editor.store.subscribe();
        let follower = editor.clone();
        tokio::spawn(async move { follower.run_updates(updates).await });

        converter_screen.add_favorite(cad()).unwrap();

        let state = watcher
            .wait_for(|s| {
                matches!(s, LoadState::Loaded(view)
                    if matches!(&view.favorites_rows[0], FavoriteSlot::Currency(row) if row.currency == cad()))
            })
            .await
            .unwrap()
            .clone();
        let view = state.loaded().unwrap();
        assert!(view.all_currencies_rows.iter().any(|r| r.currency == cad() && r.is_favorite));
    }
}
