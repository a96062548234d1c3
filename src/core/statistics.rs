//! Descriptive statistics over price samples.
//!
//! All functions are pure and use population formulas (divide by N). Empty
//! inputs yield neutral zeros rather than NaN.

use crate::core::price::{PricePoint, prices};
use anyhow::{Result, ensure};
use serde::Serialize;

pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    variance.sqrt()
}

/// Population covariance. Mismatched lengths are a caller bug and are
/// reported as an error.
pub fn covariance(xs: &[f64], ys: &[f64]) -> Result<f64> {
    ensure!(
        xs.len() == ys.len(),
        "Datasets must have the same length ({} != {})",
        xs.len(),
        ys.len()
    );
    if xs.is_empty() {
        return Ok(0.0);
    }
    let mean_x = mean(xs);
    let mean_y = mean(ys);
    let sum: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    Ok(sum / xs.len() as f64)
}

/// Summary of one symbol's series as shown next to its chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStatistics {
    pub samples: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub latest: f64,
    pub change: f64,
    pub change_percent: f64,
}

impl SeriesStatistics {
    /// Returns `None` for an empty series.
    pub fn from_series(series: &[PricePoint]) -> Option<Self> {
        let values = prices(series);
        let first = *values.first()?;
        let latest = *values.last()?;

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (change, change_percent) = if values.len() < 2 {
            (0.0, 0.0)
        } else {
            let change = latest - first;
            let pct = if first != 0.0 {
                change / first * 100.0
            } else {
                0.0
            };
            (change, pct)
        };

        Some(Self {
            samples: values.len(),
            mean: mean(&values),
            std_dev: std_dev(&values),
            min,
            max,
            latest,
            change,
            change_percent,
        })
    }
}
