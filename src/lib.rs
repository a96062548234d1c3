pub mod cli;
pub mod core;
pub mod providers;
pub mod service;

use crate::core::config::AppConfig;
use crate::core::{Clock, Symbol, SystemClock};
use crate::providers::stock_api::StockApiProvider;
use crate::service::{CachedDataService, EVICTION_INTERVAL};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Symbols,
    Stats {
        symbol: Symbol,
        minutes: Option<u32>,
    },
    Correlate {
        symbols: Vec<Symbol>,
        minutes: Option<u32>,
    },
}

/// Wires the stock API, cache and fallback generator into one service.
pub fn build_service(config: &AppConfig, clock: Arc<dyn Clock>) -> CachedDataService {
    let provider = StockApiProvider::new(config.base_url(), config.auth_token(), Arc::clone(&clock));
    CachedDataService::new(Arc::new(provider), clock)
}

fn normalize_symbols(symbols: &[Symbol]) -> Vec<Symbol> {
    symbols.iter().map(|s| s.trim().to_uppercase()).collect()
}

async fn resolve_symbols(
    requested: Vec<Symbol>,
    config: &AppConfig,
    service: &CachedDataService,
) -> Vec<Symbol> {
    if !requested.is_empty() {
        return normalize_symbols(&requested);
    }
    if !config.symbols.is_empty() {
        return normalize_symbols(&config.symbols);
    }
    service.get_symbol_list().await
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("tickcorr starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let service = build_service(&config, Arc::new(SystemClock));
    let sweeper = service.spawn_eviction_task(EVICTION_INTERVAL);

    let result = match command {
        AppCommand::Symbols => cli::symbols::run(&service).await,
        AppCommand::Stats { symbol, minutes } => {
            let minutes = minutes.unwrap_or(config.window_minutes);
            cli::stats::run(&service, &symbol.trim().to_uppercase(), minutes).await
        }
        AppCommand::Correlate { symbols, minutes } => {
            let minutes = minutes.unwrap_or(config.window_minutes);
            let symbols = resolve_symbols(symbols, &config, &service).await;
            cli::correlate::run(&service, &symbols, minutes).await
        }
    };

    let stats = service.cache_stats().await;
    debug!(
        size = stats.size,
        using_fallback = stats.using_fallback,
        "Final cache state"
    );
    sweeper.abort();
    result
}
