//! Price samples and the upstream price source abstraction

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Opaque uppercase ticker, e.g. `AAPL`.
pub type Symbol = String;

/// A single price sample. The timestamp is the join key used when aligning
/// two series, so it is kept verbatim as the ISO-8601 string it arrived as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub price: f64,
    pub timestamp: String,
}

impl PricePoint {
    pub fn new(price: f64, timestamp: impl Into<String>) -> Self {
        Self {
            price,
            timestamp: timestamp.into(),
        }
    }
}

/// Chronologically ascending samples for one symbol.
pub type PriceSeries = Vec<PricePoint>;

/// Extracts the bare prices of a series, preserving order.
pub fn prices(series: &[PricePoint]) -> Vec<f64> {
    series.iter().map(|p| p.price).collect()
}

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn list_symbols(&self) -> Result<Vec<Symbol>>;

    async fn fetch_series(&self, symbol: &str, window_minutes: u32) -> Result<PriceSeries>;
}
