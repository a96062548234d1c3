use crate::core::clock::Clock;
use crate::core::price::{PricePoint, PriceSeries, PriceSource, Symbol};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::SecondsFormat;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

#[derive(Debug, Deserialize)]
struct StockListResponse {
    /// Company name to ticker, in upstream order.
    stocks: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ApiPricePoint {
    price: f64,
    #[serde(rename = "lastUpdatedAt")]
    last_updated_at: Option<String>,
}

/// Thin HTTP client for the upstream stock exchange service.
///
/// One request per call, no retries. Transport errors and non-2xx statuses
/// both surface as a plain error.
pub struct StockApiProvider {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
}

impl StockApiProvider {
    pub fn new(base_url: &str, auth_token: Option<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
            clock,
        }
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut request = self.client.get(url);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request error for URL: {url}"))?
            .error_for_status()
            .with_context(|| format!("Stock API not available at {url}"))?;

        debug!(status = %response.status(), "Received stock API response");

        response
            .json::<Value>()
            .await
            .context("Failed to decode stock API response")
    }
}

#[async_trait]
impl PriceSource for StockApiProvider {
    #[instrument(name = "StockListFetch", skip(self))]
    async fn list_symbols(&self) -> Result<Vec<Symbol>> {
        let url = format!("{}/stocks", self.base_url);
        let body = self.get_json(&url).await?;
        let data: StockListResponse =
            serde_json::from_value(body).context("Failed to parse stock list response")?;
        Ok(data.stocks.into_values().collect())
    }

    #[instrument(
        name = "StockSeriesFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_series(&self, symbol: &str, window_minutes: u32) -> Result<PriceSeries> {
        let url = format!(
            "{}/stocks/{}?minutes={}",
            self.base_url, symbol, window_minutes
        );
        let body = self.get_json(&url).await?;

        let items = match body {
            Value::Array(items) => items,
            other => {
                warn!(response = %other, "Expected a price history array, treating as empty");
                return Ok(Vec::new());
            }
        };

        let received_at = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        items
            .into_iter()
            .map(|item| -> Result<PricePoint> {
                let point: ApiPricePoint = serde_json::from_value(item)
                    .with_context(|| format!("Invalid price sample for {symbol}"))?;
                Ok(PricePoint {
                    price: point.price,
                    timestamp: point
                        .last_updated_at
                        .unwrap_or_else(|| received_at.clone()),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "test-token";

    fn provider(server: &MockServer, token: Option<&str>) -> StockApiProvider {
        StockApiProvider::new(
            &server.uri(),
            token.map(str::to_string),
            Arc::new(ManualClock::new(1_750_485_600_000)),
        )
    }

    #[tokio::test]
    async fn test_list_symbols_keeps_upstream_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stocks"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"stocks": {"Nvidia Corporation": "NVDA", "Apple Inc.": "AAPL", "Tesla, Inc.": "TSLA"}}"#,
            ))
            .mount(&server)
            .await;

        let symbols = provider(&server, Some(TOKEN)).list_symbols().await.unwrap();
        assert_eq!(symbols, vec!["NVDA", "AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn test_fetch_series_normalizes_timestamps() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stocks/AAPL"))
            .and(query_param("minutes", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"price": 231.95, "lastUpdatedAt": "2025-06-21T05:55:01.486645Z"},
                    {"price": 232.10}
                ]"#,
            ))
            .mount(&server)
            .await;

        let series = provider(&server, Some(TOKEN))
            .fetch_series("AAPL", 50)
            .await
            .unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].price, 231.95);
        assert_eq!(series[0].timestamp, "2025-06-21T05:55:01.486645Z");
        assert_eq!(series[1].timestamp, "2025-06-21T06:00:00.000Z");
    }

    #[tokio::test]
    async fn test_fetch_series_non_array_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/stocks/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"stock": {"price": 231.95, "lastUpdatedAt": "2025-06-21T05:55:01.486645Z"}}"#,
            ))
            .mount(&server)
            .await;

        let series = provider(&server, None).fetch_series("AAPL", 10).await.unwrap();
        assert!(series.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let provider = provider(&server, None);
        assert!(provider.list_symbols().await.is_err());
        assert!(provider.fetch_series("AAPL", 10).await.is_err());
    }

    #[tokio::test]
    async fn test_transport_error_is_an_error() {
        let provider = StockApiProvider::new(
            "http://127.0.0.1:1",
            None,
            Arc::new(ManualClock::new(0)),
        );
        assert!(provider.list_symbols().await.is_err());
    }
}
