//! Terminal presentation of prices, statistics and correlations

pub mod correlate;
pub mod setup;
pub mod stats;
pub mod symbols;
pub mod ui;
