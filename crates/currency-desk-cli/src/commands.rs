// SPDX-License-Identifier: AGPL-3.0
// Currency Desk CLI - Command Handlers
//
// Each handler drives one core view model and prints its rendered state.
// Unavailable data is reported on stderr with a non-zero exit code; only
// AppError (persistence failures, invalid input) is returned to main.

use crate::state::AppState;
use currency_desk_core::conversion::format_result;
use currency_desk_core::{
    AppError, ConversionOutcome, ConversionSession, Currency, CurrencyPicker, FavoriteSlot,
    FavoritesDashboard, LoadState, OptionsEditor, OptionsEditorView, RatesBoard,
};
use std::fmt::Write;
use std::process::ExitCode;

const UNAVAILABLE_EXIT: u8 = 2;

fn unavailable(message: &str) -> ExitCode {
    eprintln!("{}", message);
    ExitCode::from(UNAVAILABLE_EXIT)
}

/// Render a picker list, marking the selected currency
pub fn render_picker<F>(currencies: &[Currency], is_selected: F) -> String
where
    F: Fn(&Currency) -> bool,
{
    let mut out = String::new();
    for currency in currencies {
        let marker = if is_selected(currency) { '*' } else { ' ' };
        let _ = writeln!(out, "{} {:<4} {}", marker, currency.code, currency.name);
    }
    out
}

/// Render the favorites dashboard
pub fn render_board(state: &LoadState<RatesBoard>) -> String {
    let board = match state {
        LoadState::Loading => return "Loading rates...\n".to_string(),
        LoadState::Failed => return "Problem loading rates\n".to_string(),
        LoadState::Loaded(board) => board,
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "1 {} as of {}",
        board.base.code,
        board.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if board.rows.is_empty() {
        out.push_str("No favorites selected\n");
    }
    for row in &board.rows {
        let _ = writeln!(out, "  {:<4} {:<32} {}", row.code, row.name, row.rate);
    }
    out
}

/// Render the options editor
pub fn render_editor(state: &LoadState<OptionsEditorView>) -> String {
    let view = match state {
        LoadState::Loading => return "Loading options...\n".to_string(),
        LoadState::Failed => return "Problem loading currencies\n".to_string(),
        LoadState::Loaded(view) => view,
    };

    let mut out = String::new();
    let _ = writeln!(out, "Base currency: {}", view.base_currency_row);

    out.push_str("\nFavorites:\n");
    for slot in &view.favorites_rows {
        match slot {
            FavoriteSlot::Currency(row) => {
                let _ = writeln!(out, "  {:<4} {}", row.currency.code, row.currency.name);
            }
            FavoriteSlot::NoneSelected => out.push_str("  No favorites selected\n"),
        }
    }

    out.push_str("\nAll currencies:\n");
    for row in &view.all_currencies_rows {
        let toggle = if row.is_favorite { "[x]" } else { "[ ]" };
        let _ = writeln!(out, "  {} {:<4} {}", toggle, row.currency.code, row.currency.name);
    }
    out
}

/// List the catalog with the selected currency first
pub async fn currencies(state: &AppState, selected: Option<String>) -> Result<ExitCode, AppError> {
    let picker = CurrencyPicker::new(state.client.clone(), "Currencies", selected);

    match picker.load().await {
        LoadState::Loaded(list) => {
            print!("{}", render_picker(&list, |c| picker.is_selected(c)));
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(unavailable("Problem loading currencies")),
    }
}

/// Convert an amount and print the surfaced result
pub async fn convert(
    state: &AppState,
    from: &str,
    to: &str,
    amount: &str,
) -> Result<ExitCode, AppError> {
    let session = ConversionSession::new(state.client.clone());

    match session.convert(from, to, amount).await? {
        ConversionOutcome::Resolved(result) if !result.is_neutral() => {
            println!("{} {} = {}", amount.trim(), from, format_result(&result));
            Ok(ExitCode::SUCCESS)
        }
        _ => Ok(unavailable("Problem converting currency")),
    }
}

/// Show favorites with their rates against the base currency
pub async fn favorites(state: &AppState) -> Result<ExitCode, AppError> {
    let dashboard = FavoritesDashboard::new(state.settings_store(), state.client.clone());
    let board = dashboard.refresh().await;

    print!("{}", render_board(&board));
    if board.is_failed() {
        return Ok(ExitCode::from(UNAVAILABLE_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

/// Show the options editor
pub async fn options(state: &AppState) -> Result<ExitCode, AppError> {
    let editor = OptionsEditor::new(state.settings_store(), state.client.clone());
    let view = editor.load().await;

    print!("{}", render_editor(&view));
    if view.is_failed() {
        // Base currency and favorites are still known without the catalog
        let current = state.settings_store().current();
        println!("Base currency: {}", current.base_currency);
        for favorite in &current.favorites {
            println!("  {:<4} {}", favorite.code, favorite.name);
        }
        return Ok(ExitCode::from(UNAVAILABLE_EXIT));
    }
    Ok(ExitCode::SUCCESS)
}

/// Change the base currency
pub async fn set_base(state: &AppState, code: &str) -> Result<ExitCode, AppError> {
    let editor = OptionsEditor::new(state.settings_store(), state.client.clone());
    let catalog = editor.base_currency_picker().load().await;

    let Some(currency) = find_currency(&catalog, code) else {
        return Ok(unknown_or_unavailable(&catalog, code));
    };

    editor.set_base_currency(currency.clone())?;
    println!("Base currency set to {}", currency);
    Ok(ExitCode::SUCCESS)
}

/// Add a favorite
pub async fn add_favorite(state: &AppState, code: &str) -> Result<ExitCode, AppError> {
    let store = state.settings_store();
    let picker = CurrencyPicker::new(state.client.clone(), "Favorites", None);
    let catalog = picker.load().await;

    let Some(currency) = find_currency(&catalog, code) else {
        return Ok(unknown_or_unavailable(&catalog, code));
    };

    if store.add_favorite(currency.clone())? {
        println!("Added {} to favorites", currency);
    } else {
        println!("{} is already a favorite", currency);
    }
    Ok(ExitCode::SUCCESS)
}

/// Remove a favorite. Works without the catalog since only the code matters.
pub fn remove_favorite(state: &AppState, code: &str) -> Result<ExitCode, AppError> {
    let store = state.settings_store();
    let currency = store
        .current()
        .favorites
        .into_iter()
        .find(|c| c.code.eq_ignore_ascii_case(code));

    match currency {
        Some(currency) => {
            store.remove_favorite(&currency)?;
            println!("Removed {} from favorites", currency);
        }
        None => println!("{} is not a favorite", code.to_uppercase()),
    }
    Ok(ExitCode::SUCCESS)
}

fn find_currency(catalog: &LoadState<Vec<Currency>>, code: &str) -> Option<Currency> {
    catalog
        .loaded()?
        .iter()
        .find(|c| c.code.eq_ignore_ascii_case(code))
        .cloned()
}

fn unknown_or_unavailable(catalog: &LoadState<Vec<Currency>>, code: &str) -> ExitCode {
    match catalog {
        LoadState::Loaded(_) => {
            eprintln!("Unknown currency code: {}", code);
            ExitCode::FAILURE
        }
        _ => unavailable("Problem loading currencies"),
    }
}
