//! Cached, always-available access to price data.
//!
//! [`CachedDataService`] sits between the presentation layer and the real
//! price source. Reads go through a TTL cache; the first source failure
//! switches the service to synthetic data for the rest of its lifetime
//! (or until [`CachedDataService::reset_fallback`]). Callers never see an
//! error from the data path.

use crate::core::cache::TtlCache;
use crate::core::clock::Clock;
use crate::core::price::{PriceSeries, PriceSource, Symbol};
use crate::providers::synthetic::SyntheticPriceGenerator;
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const CACHE_TTL_MILLIS: i64 = 60_000;
pub const EVICTION_INTERVAL: Duration = Duration::from_millis(300_000);

const SYMBOL_LIST_KEY: &str = "symbolList";
const SYNTHETIC_KEY_PREFIX: &str = "synthetic_";

#[derive(Debug, Clone)]
enum CachedData {
    Symbols(Vec<Symbol>),
    Series(PriceSeries),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
    pub using_fallback: bool,
}

/// Shared handle; clones see the same cache and fallback flag.
#[derive(Clone)]
pub struct CachedDataService {
    source: Arc<dyn PriceSource>,
    generator: SyntheticPriceGenerator,
    cache: TtlCache<CachedData>,
    using_fallback: Arc<AtomicBool>,
    clock: Arc<dyn Clock>,
}

impl CachedDataService {
    pub fn new(source: Arc<dyn PriceSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            generator: SyntheticPriceGenerator::new(Arc::clone(&clock)),
            cache: TtlCache::new(CACHE_TTL_MILLIS, Arc::clone(&clock)),
            using_fallback: Arc::new(AtomicBool::new(false)),
            clock,
        }
    }

    pub fn is_using_fallback(&self) -> bool {
        self.using_fallback.load(Ordering::SeqCst)
    }

    /// Lets the next call try the real source again.
    pub fn reset_fallback(&self) {
        if self.using_fallback.swap(false, Ordering::SeqCst) {
            info!("Fallback reset, price source will be retried");
        }
    }

    fn degrade(&self, error: &anyhow::Error) {
        if !self.using_fallback.swap(true, Ordering::SeqCst) {
            warn!(error = %error, "Price source unavailable, switching to synthetic data");
        } else {
            debug!(error = %error, "Price source failed while already on synthetic data");
        }
    }

    /// Keys bucket by TTL window, so each (symbol, window) pair gets a fresh
    /// key once per TTL period.
    fn series_key(&self, symbol: &str, window_minutes: u32) -> String {
        let bucket = self.clock.now_millis().div_euclid(self.cache.ttl_millis());
        format!("{symbol}_{window_minutes}_{bucket}")
    }

    pub async fn get_symbol_list(&self) -> Vec<Symbol> {
        if self.is_using_fallback() {
            return self.generator.symbols();
        }

        if let Some(CachedData::Symbols(symbols)) = self.cache.get(SYMBOL_LIST_KEY).await {
            return symbols;
        }

        match self.source.list_symbols().await {
            Ok(symbols) => {
                debug!(count = symbols.len(), "Fetched symbol list");
                self.cache
                    .put(SYMBOL_LIST_KEY, CachedData::Symbols(symbols.clone()))
                    .await;
                symbols
            }
            Err(e) => {
                self.degrade(&e);
                self.generator.symbols()
            }
        }
    }

    pub async fn get_series(&self, symbol: &str, window_minutes: u32) -> PriceSeries {
        if self.is_using_fallback() {
            return self.synthetic_series(symbol, window_minutes).await;
        }

        let key = self.series_key(symbol, window_minutes);
        if let Some(CachedData::Series(series)) = self.cache.get(&key).await {
            return series;
        }

        match self.source.fetch_series(symbol, window_minutes).await {
            Ok(series) => {
                self.cache.put(key, CachedData::Series(series.clone())).await;
                series
            }
            Err(e) => {
                self.degrade(&e);
                self.synthetic_series(symbol, window_minutes).await
            }
        }
    }

    /// Generated series live under their own prefix so real entries cached
    /// before the switch are never served once the service has degraded.
    async fn synthetic_series(&self, symbol: &str, window_minutes: u32) -> PriceSeries {
        let key = format!(
            "{SYNTHETIC_KEY_PREFIX}{}",
            self.series_key(symbol, window_minutes)
        );
        if let Some(CachedData::Series(series)) = self.cache.get(&key).await {
            return series;
        }

        let series = self.generator.generate(symbol, window_minutes);
        self.cache.put(key, CachedData::Series(series.clone())).await;
        series
    }

    /// Fetches all symbols concurrently. A symbol whose task fails outright
    /// is left out of the result; the others are unaffected.
    pub async fn get_many_series(
        &self,
        symbols: &[Symbol],
        window_minutes: u32,
    ) -> HashMap<Symbol, PriceSeries> {
        let tasks = symbols.iter().map(|symbol| {
            let service = self.clone();
            let symbol = symbol.clone();
            tokio::spawn(async move { service.get_series(&symbol, window_minutes).await })
        });

        let outcomes = join_all(tasks).await;

        symbols
            .iter()
            .zip(outcomes)
            .filter_map(|(symbol, outcome)| match outcome {
                Ok(series) => Some((symbol.clone(), series)),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Series fetch failed, omitting symbol");
                    None
                }
            })
            .collect()
    }

    pub async fn evict_expired(&self) -> usize {
        self.cache.evict_expired().await
    }

    pub async fn cache_stats(&self) -> CacheStats {
        let snapshot = self.cache.snapshot().await;
        CacheStats {
            size: snapshot.size,
            keys: snapshot.keys,
            using_fallback: self.is_using_fallback(),
        }
    }

    /// Checks the real source without touching the cache or fallback flag.
    pub async fn check_source_available(&self) -> bool {
        self.source.list_symbols().await.is_ok()
    }

    /// Periodically purges stale cache entries. Abort the handle to stop.
    pub fn spawn_eviction_task(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // First tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = cache.evict_expired().await;
                debug!(evicted, "Periodic cache sweep");
            }
        })
    }
}
