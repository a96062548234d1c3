//! Fallback producer of plausible price series when the real source is down.

use crate::core::clock::Clock;
use crate::core::price::{PricePoint, PriceSeries, Symbol};
use chrono::{Duration, DurationRound, SecondsFormat};
use rand::Rng;
use std::sync::Arc;

/// Symbol universe reported while running on synthetic data.
pub const DEFAULT_SYMBOLS: [&str; 8] = [
    "AAPL", "GOOGL", "MSFT", "AMZN", "TSLA", "META", "NFLX", "NVDA",
];

const UNKNOWN_BASE_PRICE: f64 = 100.0;

pub fn base_price(symbol: &str) -> f64 {
    match symbol {
        "AAPL" => 150.0,
        "GOOGL" => 2800.0,
        "MSFT" => 310.0,
        "AMZN" => 3200.0,
        "TSLA" => 800.0,
        "META" => 250.0,
        "NFLX" => 400.0,
        "NVDA" => 450.0,
        _ => UNKNOWN_BASE_PRICE,
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticPriceGenerator {
    clock: Arc<dyn Clock>,
}

impl SyntheticPriceGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
    }

    pub fn generate(&self, symbol: &str, window_minutes: u32) -> PriceSeries {
        self.generate_with_rng(symbol, window_minutes, &mut rand::thread_rng())
    }

    /// Random walk around the symbol's base price, one point per minute
    /// ending one minute before now.
    ///
    /// Each step moves by at most 1% of the base price and never drops below
    /// 80% of it. Emitted prices are rounded to cents.
    pub fn generate_with_rng<R: Rng + ?Sized>(
        &self,
        symbol: &str,
        window_minutes: u32,
        rng: &mut R,
    ) -> PriceSeries {
        let base = base_price(symbol);
        let floor = base * 0.8;
        let max_step = base * 0.01;
        // Whole minutes, so series generated moments apart share timestamps
        let now = self.clock.now();
        let now = now.duration_trunc(Duration::minutes(1)).unwrap_or(now);

        let mut current = base;
        (0..window_minutes)
            .map(|i| {
                current = (current + rng.gen_range(-max_step..=max_step)).max(floor);
                let at = now - Duration::minutes(i64::from(window_minutes - i));
                PricePoint {
                    price: (current * 100.0).round() / 100.0,
                    timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
                }
            })
            .collect()
    }
}
