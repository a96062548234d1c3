//! Core data types and the pure correlation/statistics engine

pub mod cache;
pub mod clock;
pub mod config;
pub mod correlation;
pub mod log;
pub mod price;
pub mod statistics;

// Re-export main types for cleaner imports
pub use clock::{Clock, ManualClock, SystemClock};
pub use correlation::{CorrelationMatrix, CorrelationStrength};
pub use price::{PricePoint, PriceSeries, PriceSource, Symbol};
pub use statistics::SeriesStatistics;
