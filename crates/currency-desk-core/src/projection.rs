// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Display projections
//
// Pure functions from (options, catalog, rates) to what the screens render.

use crate::types::{Currency, Options, RateSnapshot};
use std::fmt;

/// Number of fractional digits shown for rates
pub const RATE_DISPLAY_DIGITS: usize = 3;

/// A favorite's rate, or the marker for "provider gave none"
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateDisplay {
    Rate(f64),
    Unavailable,
}

impl fmt::Display for RateDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rate(rate) => f.write_str(&format_rate(*rate)),
            Self::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// One row of the favorites dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteRateRow {
    pub code: String,
    pub name: String,
    pub rate: RateDisplay,
}

/// A currency row in the options editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditorRow {
    pub currency: Currency,
    pub is_favorite: bool,
}

/// Entry in the editor's favorites section
#[derive(Debug, Clone, PartialEq)]
pub enum FavoriteSlot {
    Currency(EditorRow),
    /// Emitted alone when there are no favorites; rendered as a placeholder
    NoneSelected,
}

/// Everything the options editor shows
#[derive(Debug, Clone, PartialEq)]
pub struct OptionsEditorView {
    pub base_currency_row: Currency,
    pub favorites_rows: Vec<FavoriteSlot>,
    pub all_currencies_rows: Vec<EditorRow>,
}

/// Render a rate with a fixed number of fractional digits
pub fn format_rate(rate: f64) -> String {
    format!("{:.*}", RATE_DISPLAY_DIGITS, rate)
}

fn sorted_by_name(currencies: &[Currency]) -> Vec<Currency> {
    let mut sorted = currencies.to_vec();
    // stable: equal names keep catalog order
    sorted.sort_by(Currency::cmp_by_name);
    sorted
}

/// Favorites in stored order with their rate from the snapshot
pub fn project_favorites_rates(options: &Options, snapshot: &RateSnapshot) -> Vec<FavoriteRateRow> {
    options
        .favorites
        .iter()
        .map(|currency| FavoriteRateRow {
            code: currency.code.clone(),
            name: currency.name.clone(),
            rate: snapshot
                .rate(&currency.code)
                .map_or(RateDisplay::Unavailable, RateDisplay::Rate),
        })
        .collect()
}

/// Catalog sorted by name, with the selected currency moved to the front
pub fn project_currency_picker(catalog: &[Currency], selected_code: Option<&str>) -> Vec<Currency> {
    let mut currencies = sorted_by_name(catalog);

    if let Some(code) = selected_code {
        if let Some(index) = currencies.iter().position(|c| c.code == code) {
            let selected = currencies.remove(index);
            currencies.insert(0, selected);
        }
    }

    currencies
}

/// Base currency, favorites and the full catalog with favorite flags
pub fn project_options_editor(options: &Options, catalog: &[Currency]) -> OptionsEditorView {
    let row = |currency: Currency| EditorRow {
        is_favorite: options.is_favorite(&currency.code),
        currency,
    };

    let favorites_rows = if options.favorites.is_empty() {
        vec![FavoriteSlot::NoneSelected]
    } else {
        sorted_by_name(&options.favorites)
            .into_iter()
            .map(|c| FavoriteSlot::Currency(row(c)))
            .collect()
    };

    let all_currencies_rows = sorted_by_name(catalog).into_iter().map(row).collect();

    OptionsEditorView {
        base_currency_row: options.base_currency.clone(),
        favorites_rows,
        all_currencies_rows,
    }
}
