// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Currency catalog client
//
// Talks to the CurrencyScoop REST API. Every call returns an Option:
// transport and decoding failures are logged and reported as absence,
// never as errors.

use crate::config::ClientConfig;
use crate::types::{AppError, Amount, ConversionResult, Currency, RateSnapshot};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashMap;

/// Source of the currency catalog, conversions and bulk rates
#[async_trait]
pub trait CurrencyCatalogClient: Send + Sync {
    /// All known fiat currencies. `None` means the catalog is unavailable,
    /// which is not the same as an empty catalog.
    async fn list_currencies(&self) -> Option<Vec<Currency>>;

    /// Convert `amount` of `from` into `to`
    async fn convert(&self, from: &str, to: &str, amount: &Amount) -> Option<ConversionResult>;

    /// Rates of `codes` against `base_code`. `None` covers the whole request.
    async fn get_rates(&self, base_code: &str, codes: &[String]) -> Option<RateSnapshot>;
}

/// Every CurrencyScoop payload is wrapped in a `response` field
#[derive(Deserialize, Debug)]
struct Envelope<T> {
    response: T,
}

#[derive(Deserialize, Debug)]
struct FiatCurrencies {
    fiats: HashMap<String, FiatEntry>,
}

#[derive(Deserialize, Debug)]
struct FiatEntry {
    currency_code: String,
    currency_name: String,
}

#[derive(Deserialize, Debug)]
struct LatestRates {
    base: String,
    #[serde(default)]
    rates: HashMap<String, Option<f64>>,
}

#[derive(Deserialize, Debug)]
struct ConvertData {
    to: String,
    value: f64,
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, AppError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    Ok(envelope.response)
}

/// Decode a `/v1/currencies` body. The provider keys fiats by code in an
/// unordered map, so the list is sorted by code.
pub(crate) fn decode_currencies(body: &str) -> Result<Vec<Currency>, AppError> {
    let fiats: FiatCurrencies = decode(body)?;
    let mut currencies: Vec<Currency> = fiats
        .fiats
        .into_values()
        .map(|f| Currency::new(f.currency_code, f.currency_name))
        .collect();
    currencies.sort_by(|a, b| a.code.cmp(&b.code));
    Ok(currencies)
}

pub(crate) fn decode_rates(body: &str) -> Result<RateSnapshot, AppError> {
    let latest: LatestRates = decode(body)?;
    Ok(RateSnapshot::new(latest.base, latest.rates))
}

pub(crate) fn decode_conversion(body: &str) -> Result<ConversionResult, AppError> {
    let data: ConvertData = decode(body)?;
    Ok(ConversionResult::new(data.to, data.value))
}

/// Production client for api.currencyscoop.com
pub struct CurrencyScoopClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl CurrencyScoopClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn get_body(&self, path: &str, query: &[(&str, &str)]) -> Result<String, AppError> {
        let mut params: Vec<(&str, &str)> = Vec::with_capacity(query.len() + 1);
        if let Some(key) = &self.config.api_key {
            params.push(("api_key", key.as_str()));
        }
        params.extend_from_slice(query);

        let body = self
            .http
            .get(self.config.endpoint(path))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(body)
    }

    async fn fetch<T, F>(&self, path: &str, query: &[(&str, &str)], decoder: F) -> Option<T>
    where
        F: FnOnce(&str) -> Result<T, AppError>,
    {
        let result = match self.get_body(path, query).await {
            Ok(body) => decoder(&body),
            Err(e) => Err(e),
        };

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Request to /v1/{} failed: {}", path, e);
                None
            }
        }
    }
}

#[async_trait]
impl CurrencyCatalogClient for CurrencyScoopClient {
    async fn list_currencies(&self) -> Option<Vec<Currency>> {
        self.fetch("currencies", &[("type", "fiat")], decode_currencies)
            .await
    }

    async fn convert(&self, from: &str, to: &str, amount: &Amount) -> Option<ConversionResult> {
        self.fetch(
            "convert",
            &[("from", from), ("to", to), ("amount", amount.as_str())],
            decode_conversion,
        )
        .await
    }

    async fn get_rates(&self, base_code: &str, codes: &[String]) -> Option<RateSnapshot> {
        let symbols = codes.join(",");
        self.fetch(
            "latest",
            &[("base", base_code), ("symbols", symbols.as_str())],
            decode_rates,
        )
        .await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted client for tests

    use super::*;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Default)]
    pub struct MockCatalogClient {
        pub currencies: Mutex<Option<Vec<Currency>>>,
        pub rates: Mutex<Option<RateSnapshot>>,
        conversions: Mutex<HashMap<String, Option<ConversionResult>>>,
        gates: Mutex<HashMap<String, oneshot::Receiver<Option<ConversionResult>>>>,
        rates_gate: Mutex<Option<oneshot::Receiver<Option<RateSnapshot>>>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockCatalogClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_currencies(currencies: Option<Vec<Currency>>) -> Self {
            let client = Self::new();
            *client.currencies.lock().unwrap() = currencies;
            client
        }

        pub fn set_rates(&self, rates: Option<RateSnapshot>) {
            *self.rates.lock().unwrap() = rates;
        }

        /// Immediate answer for conversions into `to`
        pub fn set_conversion(&self, to: &str, result: Option<ConversionResult>) {
            self.conversions
                .lock()
                .unwrap()
                .insert(to.to_string(), result);
        }

        /// Hold conversions into `to` until the returned sender fires
        pub fn gate_conversion(&self, to: &str) -> oneshot::Sender<Option<ConversionResult>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(to.to_string(), rx);
            tx
        }

        /// Hold the next rates request until the returned sender fires
        pub fn gate_rates(&self) -> oneshot::Sender<Option<RateSnapshot>> {
            let (tx, rx) = oneshot::channel();
            *self.rates_gate.lock().unwrap() = Some(rx);
            tx
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl CurrencyCatalogClient for MockCatalogClient {
        async fn list_currencies(&self) -> Option<Vec<Currency>> {
            self.record("currencies".to_string());
            self.currencies.lock().unwrap().clone()
        }

        async fn convert(&self, from: &str, to: &str, amount: &Amount) -> Option<ConversionResult> {
            self.record(format!("convert {} {} {}", from, to, amount));
            let gate = self.gates.lock().unwrap().remove(to);
            if let Some(rx) = gate {
                return rx.await.ok().flatten();
            }
            let scripted = self.conversions.lock().unwrap().get(to).cloned();
            scripted.flatten()
        }

        async fn get_rates(&self, base_code: &str, codes: &[String]) -> Option<RateSnapshot> {
            self.record(format!("latest {} {}", base_code, codes.join(",")));
            let gate = self.rates_gate.lock().unwrap().take();
            if let Some(rx) = gate {
                return rx.await.ok().flatten();
            }
            let scripted = self.rates.lock().unwrap().clone();
            scripted
        }
    }
}
