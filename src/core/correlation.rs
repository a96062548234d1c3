//! Pairwise correlation of price series.

use crate::core::price::{PricePoint, Symbol, prices};
use crate::core::statistics::{covariance, std_dev};
use chrono::DateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt::Display;

fn compare_timestamps(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

fn keep_common(series: &[PricePoint], common: &HashSet<&str>) -> Vec<PricePoint> {
    let mut seen = HashSet::new();
    let mut kept: Vec<PricePoint> = series
        .iter()
        .filter(|p| common.contains(p.timestamp.as_str()) && seen.insert(p.timestamp.as_str()))
        .cloned()
        .collect();
    kept.sort_by(|a, b| compare_timestamps(&a.timestamp, &b.timestamp));
    kept
}

/// Restricts both series to the timestamps they share, ordered ascending.
///
/// Timestamps match on exact string equality. When a series repeats a
/// timestamp only its first sample is kept, so both outputs always have the
/// same length.
pub fn align(a: &[PricePoint], b: &[PricePoint]) -> (Vec<PricePoint>, Vec<PricePoint>) {
    let in_b: HashSet<&str> = b.iter().map(|p| p.timestamp.as_str()).collect();
    let common: HashSet<&str> = a
        .iter()
        .map(|p| p.timestamp.as_str())
        .filter(|ts| in_b.contains(ts))
        .collect();

    (keep_common(a, &common), keep_common(b, &common))
}

/// Pearson correlation coefficient of two equally sized samples.
///
/// Returns 0 when the coefficient is undefined: mismatched lengths, fewer
/// than two points, or a constant input.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    if xs.len() != ys.len() || xs.len() < 2 {
        return 0.0;
    }

    let sd_x = std_dev(xs);
    let sd_y = std_dev(ys);
    if sd_x == 0.0 || sd_y == 0.0 {
        return 0.0;
    }

    match covariance(xs, ys) {
        Ok(cov) => (cov / (sd_x * sd_y)).clamp(-1.0, 1.0),
        Err(_) => 0.0,
    }
}

/// Correlation of two series after aligning them on shared timestamps.
pub fn correlate_series(a: &[PricePoint], b: &[PricePoint]) -> f64 {
    let (aligned_a, aligned_b) = align(a, b);
    pearson(&prices(&aligned_a), &prices(&aligned_b))
}

/// Square, symmetric symbol-by-symbol correlation table with a unit diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    symbols: Vec<Symbol>,
    values: HashMap<Symbol, HashMap<Symbol, f64>>,
}

impl CorrelationMatrix {
    /// Builds the matrix for `symbols`, computing each unordered pair once.
    ///
    /// A symbol absent from `series_by_symbol` is treated as having an empty
    /// series and correlates 0 with everything but itself. Duplicate symbols
    /// are collapsed.
    pub fn build(symbols: &[Symbol], series_by_symbol: &HashMap<Symbol, Vec<PricePoint>>) -> Self {
        let mut seen = HashSet::new();
        let symbols: Vec<Symbol> = symbols
            .iter()
            .filter(|s| seen.insert(s.as_str()))
            .cloned()
            .collect();

        let mut values: HashMap<Symbol, HashMap<Symbol, f64>> = symbols
            .iter()
            .map(|s| (s.clone(), HashMap::with_capacity(symbols.len())))
            .collect();

        let empty = Vec::new();
        for (i, a) in symbols.iter().enumerate() {
            for b in &symbols[i..] {
                let r = if a == b {
                    1.0
                } else {
                    let series_a = series_by_symbol.get(a).unwrap_or(&empty);
                    let series_b = series_by_symbol.get(b).unwrap_or(&empty);
                    correlate_series(series_a, series_b)
                };
                if let Some(row) = values.get_mut(a) {
                    row.insert(b.clone(), r);
                }
                if let Some(row) = values.get_mut(b) {
                    row.insert(a.clone(), r);
                }
            }
        }

        Self { symbols, values }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        self.values.get(a).and_then(|row| row.get(b)).copied()
    }

    pub fn row(&self, symbol: &str) -> Option<&HashMap<Symbol, f64>> {
        self.values.get(symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize)]
pub enum CorrelationStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    pub fn from_coefficient(r: f64) -> Self {
        let abs = r.abs();
        if abs >= 0.8 {
            CorrelationStrength::VeryStrong
        } else if abs >= 0.6 {
            CorrelationStrength::Strong
        } else if abs >= 0.4 {
            CorrelationStrength::Moderate
        } else if abs >= 0.2 {
            CorrelationStrength::Weak
        } else {
            CorrelationStrength::VeryWeak
        }
    }
}

impl Display for CorrelationStrength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CorrelationStrength::VeryWeak => "Very Weak",
                CorrelationStrength::Weak => "Weak",
                CorrelationStrength::Moderate => "Moderate",
                CorrelationStrength::Strong => "Strong",
                CorrelationStrength::VeryStrong => "Very Strong",
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn series(points: &[(f64, &str)]) -> Vec<PricePoint> {
        points.iter().map(|(p, ts)| PricePoint::new(*p, *ts)).collect()
    }

    fn ts(minute: u32) -> String {
        format!("2025-06-21T10:{minute:02}:00.000Z")
    }

    fn minute_series(prices: &[f64]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(*p, ts(i as u32)))
            .collect()
    }

    #[test]
    fn test_pearson_known_values() {
        assert!((pearson(&[1.0, 2.0, 3.0, 4.0, 5.0], &[2.0, 4.0, 6.0, 8.0, 10.0]) - 1.0).abs() < EPS);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]) + 1.0).abs() < EPS);
        assert_eq!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
    }

    #[test]
    fn test_pearson_self_correlation_and_symmetry() {
        let xs = [101.2, 99.8, 100.4, 102.9, 98.1, 97.5];
        let ys = [55.0, 54.2, 56.1, 53.3, 57.8, 52.0];

        assert!((pearson(&xs, &xs) - 1.0).abs() < EPS);
        assert_eq!(pearson(&xs, &ys), pearson(&ys, &xs));
        let r = pearson(&xs, &ys);
        assert!((-1.0..=1.0).contains(&r));
    }

    #[test]
    fn test_pearson_degenerate_inputs_are_zero() {
        assert_eq!(pearson(&[1.0, 2.0, 3.0], &[1.0, 2.0]), 0.0);
        assert_eq!(pearson(&[1.0], &[2.0]), 0.0);
        assert_eq!(pearson(&[], &[]), 0.0);
        assert_eq!(pearson(&[1.0, 2.0], &[7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_align_intersects_and_sorts() {
        let a = series(&[(3.0, "2025-06-21T10:02:00.000Z"), (1.0, "2025-06-21T10:00:00.000Z"), (2.0, "2025-06-21T10:01:00.000Z")]);
        let b = series(&[(20.0, "2025-06-21T10:01:00.000Z"), (30.0, "2025-06-21T10:02:00.000Z"), (40.0, "2025-06-21T10:03:00.000Z")]);

        let (aa, bb) = align(&a, &b);
        assert_eq!(prices(&aa), vec![2.0, 3.0]);
        assert_eq!(prices(&bb), vec![20.0, 30.0]);
        for (x, y) in aa.iter().zip(&bb) {
            assert_eq!(x.timestamp, y.timestamp);
        }
    }

    #[test]
    fn test_align_without_overlap_is_empty() {
        let a = minute_series(&[1.0, 2.0]);
        let b = series(&[(5.0, "2025-06-22T00:00:00.000Z")]);
        let (aa, bb) = align(&a, &b);
        assert!(aa.is_empty());
        assert!(bb.is_empty());
    }

    #[test]
    fn test_align_duplicate_timestamps_keep_equal_lengths() {
        let a = series(&[(1.0, "t1"), (1.5, "t1"), (2.0, "t2")]);
        let b = series(&[(10.0, "t1"), (20.0, "t2")]);
        let (aa, bb) = align(&a, &b);
        assert_eq!(aa.len(), bb.len());
        assert_eq!(prices(&aa), vec![1.0, 2.0]);
        assert!(aa.len() <= a.len().min(b.len()));
    }

    #[test]
    fn test_matrix_diagonal_and_symmetry() {
        let symbols: Vec<Symbol> = ["AAPL", "MSFT", "NVDA", "EMPTY"].iter().map(|s| s.to_string()).collect();
        let mut data = HashMap::new();
        data.insert("AAPL".to_string(), minute_series(&[1.0, 2.0, 3.0, 4.0]));
        data.insert("MSFT".to_string(), minute_series(&[2.0, 4.0, 6.0, 8.0]));
        data.insert("NVDA".to_string(), minute_series(&[4.0, 1.0, 3.0, 2.0]));
        data.insert("EMPTY".to_string(), Vec::new());

        let matrix = CorrelationMatrix::build(&symbols, &data);

        for a in &symbols {
            assert_eq!(matrix.get(a, a), Some(1.0));
            for b in &symbols {
                assert_eq!(matrix.get(a, b), matrix.get(b, a));
            }
        }
        assert!((matrix.get("AAPL", "MSFT").unwrap() - 1.0).abs() < EPS);
        assert_eq!(matrix.get("AAPL", "EMPTY"), Some(0.0));
        assert_eq!(matrix.row("NVDA").map(|r| r.len()), Some(4));
    }

    #[test]
    fn test_matrix_missing_series_and_duplicates() {
        let symbols: Vec<Symbol> = ["AAPL", "GONE", "AAPL"].iter().map(|s| s.to_string()).collect();
        let mut data = HashMap::new();
        data.insert("AAPL".to_string(), minute_series(&[1.0, 2.0, 3.0]));

        let matrix = CorrelationMatrix::build(&symbols, &data);
        assert_eq!(matrix.symbols(), &["AAPL".to_string(), "GONE".to_string()]);
        assert_eq!(matrix.get("AAPL", "AAPL"), Some(1.0));
        assert_eq!(matrix.get("GONE", "GONE"), Some(1.0));
        assert_eq!(matrix.get("AAPL", "GONE"), Some(0.0));
    }

    #[test]
    fn test_correlation_strength() {
        assert_eq!(CorrelationStrength::from_coefficient(-0.85), CorrelationStrength::VeryStrong);
        assert_eq!(CorrelationStrength::from_coefficient(0.6), CorrelationStrength::Strong);
        assert_eq!(CorrelationStrength::from_coefficient(0.45), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::from_coefficient(-0.2), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::from_coefficient(0.05), CorrelationStrength::VeryWeak);
        assert_eq!(CorrelationStrength::VeryStrong.to_string(), "Very Strong");
    }
}
