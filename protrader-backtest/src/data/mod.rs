//! Price series data model.
//!
//! The engine consumes an already-materialized, validated daily OHLCV series.
//! Fetching, caching, and source failover are collaborator concerns that live
//! outside this crate; tests and the CLI inject fixed series (see `loader`).

mod loader;

pub use loader::load_series;

use chrono::NaiveDate;
use protrader_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single daily OHLCV observation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading date
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl PriceBar {
    /// Full bar range (high - low).
    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}

/// An ordered, validated daily price series.
///
/// Immutable once constructed. Dates are strictly ascending; gaps within the
/// supplied series are the caller's responsibility. Construction goes through
/// `new` so an invalid series cannot exist.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// Build a series from raw bars, validating structure up front.
    pub fn new(bars: Vec<PriceBar>) -> Result<Self> {
        if bars.is_empty() {
            return Err(Error::Data("price series is empty".into()));
        }
        for window in bars.windows(2) {
            if window[1].date <= window[0].date {
                return Err(Error::Data(format!(
                    "price series dates must be strictly ascending ({} followed by {})",
                    window[0].date, window[1].date
                )));
            }
        }
        for bar in &bars {
            if !(bar.open.is_finite()
                && bar.high.is_finite()
                && bar.low.is_finite()
                && bar.close.is_finite()
                && bar.volume.is_finite())
            {
                return Err(Error::Data(format!(
                    "non-finite value in price bar at {}",
                    bar.date
                )));
            }
        }
        Ok(Self { bars })
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// A validated series is never empty, but the standard pairing is kept.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// All bars in date order.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// First bar of the series.
    pub fn first(&self) -> &PriceBar {
        &self.bars[0]
    }

    /// Last bar of the series.
    pub fn last(&self) -> &PriceBar {
        &self.bars[self.bars.len() - 1]
    }

    /// Close column.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// High column.
    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    /// Low column.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    /// Volume column.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    /// Require at least `min_bars` bars, failing fast otherwise.
    pub fn ensure_min_len(&self, min_bars: usize) -> Result<()> {
        if self.bars.len() < min_bars {
            return Err(Error::Data(format!(
                "price series has {} bars, need at least {}",
                self.bars.len(),
                min_bars
            )));
        }
        Ok(())
    }

    /// Buy-and-hold benchmark return over the whole series (percentage).
    pub fn buy_hold_return_pct(&self) -> f64 {
        let first = self.first().close;
        if first > 0.0 {
            (self.last().close / first - 1.0) * 100.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, close: f64) -> PriceBar {
        PriceBar {
            date,
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0,
        }
    }

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(n)
    }

    #[test]
    fn test_empty_series_rejected() {
        let err = PriceSeries::new(Vec::new()).unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn test_unsorted_series_rejected() {
        let bars = vec![bar(day(1), 100.0), bar(day(0), 101.0)];
        assert!(PriceSeries::new(bars).is_err());
    }

    #[test]
    fn test_duplicate_dates_rejected() {
        let bars = vec![bar(day(0), 100.0), bar(day(0), 101.0)];
        assert!(PriceSeries::new(bars).is_err());
    }

    #[test]
    fn test_non_finite_bar_rejected() {
        let mut b = bar(day(0), 100.0);
        b.close = f64::NAN;
        assert!(PriceSeries::new(vec![b]).is_err());
    }

    #[test]
    fn test_column_views() {
        let bars = vec![bar(day(0), 100.0), bar(day(1), 110.0)];
        let series = PriceSeries::new(bars).unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![100.0, 110.0]);
        assert!((series.buy_hold_return_pct() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_ensure_min_len() {
        let series = PriceSeries::new(vec![bar(day(0), 100.0)]).unwrap();
        assert!(series.ensure_min_len(1).is_ok());
        assert!(series.ensure_min_len(2).is_err());
    }
}
