// SPDX-License-Identifier: AGPL-3.0
// Currency Desk Core - Conversion session
//
// Latest request wins: every request gets a monotonically increasing id and
// a result is only surfaced if its id is still the newest when it arrives.

use crate::catalog::CurrencyCatalogClient;
use crate::projection::format_rate;
use crate::types::{AppError, Amount, ConversionResult};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// What the converter screen currently shows
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionState {
    Idle,
    AwaitingResponse { request_id: u64 },
    Resolved(ConversionResult),
}

/// How a single request ended
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutcome {
    Resolved(ConversionResult),
    /// A newer request was issued before this one returned; result discarded
    Superseded,
}

/// Tracks in-flight conversions for one converter screen
pub struct ConversionSession<C: CurrencyCatalogClient + ?Sized> {
    client: Arc<C>,
    latest_id: Arc<AtomicU64>,
    state: Arc<watch::Sender<ConversionState>>,
}

impl<C: CurrencyCatalogClient + ?Sized + 'static> ConversionSession<C> {
    pub fn new(client: Arc<C>) -> Self {
        let (state, _) = watch::channel(ConversionState::Idle);
        Self {
            client,
            latest_id: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
        }
    }

    /// Validate the amount and start a conversion.
    ///
    /// The id is allocated immediately, so any request still in flight is
    /// superseded as soon as this returns. The returned future performs the
    /// single lookup and surfaces the result unless it was superseded.
    pub fn request(
        &self,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Result<impl Future<Output = ConversionOutcome> + Send + 'static, AppError> {
        let amount = Amount::parse(amount)?;

        let latest_id = self.latest_id.clone();
        let mut request_id = 0;
        self.state.send_modify(|state| {
            request_id = latest_id.fetch_add(1, Ordering::SeqCst) + 1;
            *state = ConversionState::AwaitingResponse { request_id };
        });
        tracing::debug!("Conversion #{}: {} {} -> {}", request_id, amount, from, to);

        let client = self.client.clone();
        let state = self.state.clone();
        let from = from.to_string();
        let to = to.to_string();

        Ok(async move {
            let result = client
                .convert(&from, &to, &amount)
                .await
                .unwrap_or_else(ConversionResult::neutral);

            let surfaced = state.send_if_modified(|current| {
                if latest_id.load(Ordering::SeqCst) != request_id {
                    return false;
                }
                *current = ConversionState::Resolved(result.clone());
                true
            });

            if surfaced {
                ConversionOutcome::Resolved(result)
            } else {
                tracing::debug!("Conversion #{} superseded, discarding result", request_id);
                ConversionOutcome::Superseded
            }
        })
    }

    /// Request and wait in one step
    pub async fn convert(
        &self,
        from: &str,
        to: &str,
        amount: &str,
    ) -> Result<ConversionOutcome, AppError> {
        let pending = self.request(from, to, amount)?;
        Ok(pending.await)
    }

    /// The latest surfaced state
    pub fn state(&self) -> ConversionState {
        self.state.borrow().clone()
    }

    /// Watch state changes
    pub fn watch(&self) -> watch::Receiver<ConversionState> {
        self.state.subscribe()
    }
}

/// Render a result as "<rate> <code>", e.g. "0.790 GBP"
pub fn format_result(result: &ConversionResult) -> String {
    format!("{} {}", format_rate(result.rate), result.target_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::mock::MockCatalogClient;

    #[tokio::test]
    async fn test_single_request_resolves() {
        let client = Arc::new(MockCatalogClient::new());
        client.set_conversion("CAD", Some(ConversionResult::new("CAD", 1.25)));
        let session = ConversionSession::new(client.clone());
        assert_eq!(session.state(), ConversionState::Idle);

        let outcome = session.convert("USD", "CAD", "1").await.unwrap();

        let expected = ConversionResult::new("CAD", 1.25);
        assert_eq!(outcome, ConversionOutcome::Resolved(expected.clone()));
        assert_eq!(session.state(), ConversionState::Resolved(expected));
        assert_eq!(client.calls(), vec!["convert USD CAD 1"]);
    }

    #[tokio::test]
    async fn test_stale_result_is_discarded() {
        let client = Arc::new(MockCatalogClient::new());
        let gate_cad = client.gate_conversion("CAD");
        let gate_gbp = client.gate_conversion("GBP");
        let session = ConversionSession::new(client.clone());

        let first = tokio::spawn(session.request("USD", "CAD", "1").unwrap());
        let second = tokio::spawn(session.request("USD", "GBP", "1").unwrap());
        assert_eq!(
            session.state(),
            ConversionState::AwaitingResponse { request_id: 2 }
        );

        gate_gbp
            .send(Some(ConversionResult::new("GBP", 0.79)))
            .unwrap();
        let gbp = ConversionResult::new("GBP", 0.79);
        assert_eq!(
            second.await.unwrap(),
            ConversionOutcome::Resolved(gbp.clone())
        );

        gate_cad
            .send(Some(ConversionResult::new("CAD", 1.25)))
            .unwrap();
        assert_eq!(first.await.unwrap(), ConversionOutcome::Superseded);

        assert_eq!(session.state(), ConversionState::Resolved(gbp));
        assert_eq!(client.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_watchers_see_latest_result() {
        let client = Arc::new(MockCatalogClient::new());
        client.set_conversion("EUR", Some(ConversionResult::new("EUR", 0.91)));
        let session = ConversionSession::new(client);
        let mut watcher = session.watch();

        session.convert("USD", "EUR", "10").await.unwrap();

        assert!(watcher.has_changed().unwrap());
        let seen = watcher.borrow_and_update().clone();
        assert_eq!(
            seen,
            ConversionState::Resolved(ConversionResult::new("EUR", 0.91))
        );
    }

    #[tokio::test]
    async fn test_absent_result_surfaces_neutral() {
        let client = Arc::new(MockCatalogClient::new());
        let session = ConversionSession::new(client);

        let outcome = session.convert("USD", "XYZ", "1").await.unwrap();

        assert_eq!(outcome, ConversionOutcome::Resolved(ConversionResult::neutral()));
        assert_eq!(
            session.state(),
            ConversionState::Resolved(ConversionResult::neutral())
        );
    }

    #[tokio::test]
    async fn test_invalid_amount_issues_nothing() {
        let client = Arc::new(MockCatalogClient::new());
        let session = ConversionSession::new(client.clone());

        for amount in ["", "  ", "ten", "-5"] {
            let result = session.request("USD", "CAD", amount);
            assert!(matches!(result, Err(AppError::InvalidAmount(_))));
        }

        assert_eq!(session.state(), ConversionState::Idle);
        assert!(client.calls().is_empty());
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(&ConversionResult::new("GBP", 0.79)), "0.790 GBP");
        assert_eq!(format_result(&ConversionResult::new("JPY", 12345.6789)), "12345.679 JPY");
    }
}
