// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Type definitions

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

const DEFAULT_CURRENCY_CODE: &str = "USD";
const DEFAULT_CURRENCY_NAME: &str = "United States dollar";

/// A fiat currency. Two currencies are equal when their codes match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Currency {
    /// ISO code, e.g. "CAD"
    #[serde(rename = "currencyCode")]
    pub code: String,
    /// Display name, e.g. "Canadian dollar"
    #[serde(rename = "currencyName")]
    pub name: String,
}

impl Currency {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }

    /// Display ordering: by name, byte-wise.
    pub fn cmp_by_name(a: &Currency, b: &Currency) -> Ordering {
        a.name.cmp(&b.name)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_CODE, DEFAULT_CURRENCY_NAME)
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

/// The persisted settings document: a base currency plus favorites.
///
/// `favorites` never holds two entries with the same code. Values are
/// replaced wholesale by [`crate::SettingsStore`]; nothing else builds
/// modified copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    pub base_currency: Currency,
    #[serde(default)]
    pub favorites: Vec<Currency>,
}

impl Options {
    pub fn new(base_currency: Currency, favorites: Vec<Currency>) -> Self {
        Self {
            base_currency,
            favorites,
        }
    }

    /// Check whether a currency code is among the favorites
    pub fn is_favorite(&self, code: &str) -> bool {
        self.favorites.iter().any(|c| c.code == code)
    }

    /// Codes of all favorites, in stored order
    pub fn favorite_codes(&self) -> Vec<String> {
        self.favorites.iter().map(|c| c.code.clone()).collect()
    }

    pub(crate) fn with_base_currency(&self, currency: Currency) -> Self {
        Self::new(currency, self.favorites.clone())
    }

    /// Returns `None` when the code is already a favorite.
    pub(crate) fn with_favorite(&self, currency: Currency) -> Option<Self> {
        if self.is_favorite(&currency.code) {
            return None;
        }
        let mut favorites = self.favorites.clone();
        favorites.push(currency);
        Some(Self::new(self.base_currency.clone(), favorites))
    }

    /// Returns `None` when the code is not a favorite.
    pub(crate) fn without_favorite(&self, code: &str) -> Option<Self> {
        if !self.is_favorite(code) {
            return None;
        }
        let favorites = self
            .favorites
            .iter()
            .filter(|c| c.code != code)
            .cloned()
            .collect();
        Some(Self::new(self.base_currency.clone(), favorites))
    }
}

/// Outcome of a point-in-time conversion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub target_code: String,
    pub rate: f64,
}

impl ConversionResult {
    pub fn new(target_code: impl Into<String>, rate: f64) -> Self {
        Self {
            target_code: target_code.into(),
            rate,
        }
    }

    /// The "no result / failed" value
    pub fn neutral() -> Self {
        Self::default()
    }

    pub fn is_neutral(&self) -> bool {
        self.target_code.is_empty() && self.rate == 0.0
    }
}

/// Bulk rates for a base currency.
///
/// A `None` rate means the provider listed the code without a value, which is
/// not the same as a rate of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSnapshot {
    pub base_code: String,
    pub rates: HashMap<String, Option<f64>>,
}

impl RateSnapshot {
    pub fn new(base_code: impl Into<String>, rates: HashMap<String, Option<f64>>) -> Self {
        Self {
            base_code: base_code.into(),
            rates,
        }
    }

    /// Rate for a code, if the provider supplied one
    pub fn rate(&self, code: &str) -> Option<f64> {
        self.rates.get(code).copied().flatten()
    }
}

/// A conversion amount that has passed validation.
///
/// Keeps the caller's text for the outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct Amount {
    text: String,
    value: f64,
}

impl Amount {
    /// Parse user input as a plain, non-negative decimal: digits with at
    /// most one decimal point, no sign and no exponent
    pub fn parse(input: &str) -> Result<Self, AppError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(AppError::InvalidAmount("amount is blank".to_string()));
        }
        if text.starts_with('-') {
            return Err(AppError::InvalidAmount(format!("negative: {}", text)));
        }
        if !is_plain_decimal(text) {
            return Err(AppError::InvalidAmount(format!("not a number: {}", text)));
        }

        let value: f64 = text
            .parse()
            .map_err(|_| AppError::InvalidAmount(format!("not a number: {}", text)))?;

        if !value.is_finite() {
            return Err(AppError::InvalidAmount(format!("not finite: {}", text)));
        }

        Ok(Self {
            text: text.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

fn is_plain_decimal(text: &str) -> bool {
    let mut digits = 0;
    let mut points = 0;
    for c in text.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Loading state of a screen's data.
///
/// `Loaded` with an empty collection is a valid, distinct state from `Failed`.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Loading,
    Loaded(T),
    Failed,
}

impl<T> LoadState<T> {
    /// Map a fetched optional value: absent means the load failed
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(v) => Self::Loaded(v),
            None => Self::Failed,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Error types for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to persist options: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Persistence(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    // The request URL carries the API key in its query string
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = Options::default();
        assert_eq!(options.base_currency.code, "USD");
        assert_eq!(options.base_currency.name, "United States dollar");
        assert!(options.favorites.is_empty());
    }

    #[test]
    fn test_currency_equality_by_code() {
        let a = Currency::new("CAD", "Canadian dollar");
        let b = Currency::new("CAD", "Canadian Dollar (renamed)");
        assert_eq!(a, b);
        assert_ne!(a, Currency::new("GBP", "Canadian dollar"));
    }

    #[test]
    fn test_options_serialization_shape() {
        let options = Options::new(
            Currency::default(),
            vec![Currency::new("CAD", "Canadian dollar")],
        );
        let json = serde_json::to_value(&options).unwrap();
        assert_eq!(json["baseCurrency"]["currencyCode"], "USD");
        assert_eq!(json["favorites"][0]["currencyName"], "Canadian dollar");
    }

    #[test]
    fn test_with_favorite_rejects_duplicate_code() {
        let cad = Currency::new("CAD", "Canadian dollar");
        let options = Options::default().with_favorite(cad.clone()).unwrap();
        assert!(options.with_favorite(cad).is_none());
    }

    #[test]
    fn test_snapshot_absent_is_not_zero() {
        let mut rates = HashMap::new();
        rates.insert("CAD".to_string(), Some(0.0));
        rates.insert("GBP".to_string(), None);
        let snapshot = RateSnapshot::new("USD", rates);
        assert_eq!(snapshot.rate("CAD"), Some(0.0));
        assert_eq!(snapshot.rate("GBP"), None);
        assert_eq!(snapshot.rate("JPY"), None);
    }

    #[test]
    fn test_amount_validation() {
        assert_eq!(Amount::parse(" 12.5 ").unwrap().as_str(), "12.5");
        assert_eq!(Amount::parse("0").unwrap().value(), 0.0);
        assert!(Amount::parse("").is_err());
        assert!(Amount::parse("   ").is_err());
        assert!(Amount::parse("abc").is_err());
        assert!(Amount::parse("-1").is_err());
        assert!(Amount::parse("NaN").is_err());
        assert!(Amount::parse("inf").is_err());
    }

    #[test]
    fn test_amount_rejects_sign_and_exponent() {
        assert!(Amount::parse("-0").is_err());
        assert!(Amount::parse("+5").is_err());
        assert!(Amount::parse("1e3").is_err());
        assert!(Amount::parse("1.2.3").is_err());
        assert!(Amount::parse(".").is_err());
        assert_eq!(Amount::parse(".5").unwrap().value(), 0.5);
        assert_eq!(Amount::parse("10.").unwrap().as_str(), "10.");
        let huge = "9".repeat(400);
        assert!(Amount::parse(&huge).is_err());
    }

    #[test]
    fn test_load_state_from_option() {
        let failed: LoadState<Vec<u8>> = LoadState::from_option(None);
        assert!(failed.is_failed());
        let empty = LoadState::from_option(Some(Vec::<u8>::new()));
        assert_eq!(empty.loaded(), Some(&Vec::new()));
    }
}
