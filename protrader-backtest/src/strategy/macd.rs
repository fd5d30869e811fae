//! MACD crossover strategy.

use super::{SignalSeries, SignalStrategy};
use crate::data::PriceSeries;
use crate::indicators::macd;

/// Buy on a bullish MACD/signal crossover, sell on a bearish one.
///
/// A crossover is detected by comparing the current above/below-signal state
/// to the previous bar's state, so each crossing fires on exactly one bar.
#[derive(Debug, Clone, Default)]
pub struct MacdCrossover;

impl MacdCrossover {
    pub fn new() -> Self {
        Self
    }
}

impl SignalStrategy for MacdCrossover {
    fn name(&self) -> &'static str {
        "MACD Crossover"
    }

    fn signals(&self, series: &PriceSeries) -> SignalSeries {
        let macd_series = macd(&series.closes());
        let above: Vec<bool> = macd_series
            .macd
            .iter()
            .zip(&macd_series.signal)
            .map(|(m, s)| m > s)
            .collect();

        let mut entries = vec![false; above.len()];
        let mut exits = vec![false; above.len()];
        for i in 0..above.len() {
            // The bar before the series is treated as below for entries and
            // above for exits, so a series that starts crossed still fires.
            let prev_above = if i == 0 { false } else { above[i - 1] };
            let prev_above_for_exit = if i == 0 { true } else { above[i - 1] };
            entries[i] = above[i] && !prev_above;
            exits[i] = !above[i] && prev_above_for_exit;
        }

        SignalSeries { entries, exits }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_util::series_from_closes;

    #[test]
    fn test_v_shape_fires_single_entry() {
        // Downtrend into an uptrend: exactly one bullish crossover expected
        // near the turn.
        let mut closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        closes.extend((0..60).map(|i| 140.0 + i as f64 * 2.0));
        let series = series_from_closes(&closes);

        let signals = MacdCrossover::new().signals(&series);
        let entry_count = signals.entries.iter().filter(|&&e| e).count();
        assert_eq!(entry_count, 1, "expected one bullish crossover");
    }

    #[test]
    fn test_peak_fires_exit() {
        // Uptrend into a downtrend: a bearish crossover follows the peak.
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        closes.extend((0..60).map(|i| 220.0 - i as f64 * 2.0));
        let series = series_from_closes(&closes);

        let signals = MacdCrossover::new().signals(&series);
        assert!(signals.exits.iter().any(|&e| e));
    }

    #[test]
    fn test_entry_and_exit_never_same_bar() {
        let closes: Vec<f64> = (0..150)
            .map(|i| 100.0 + (i as f64 / 10.0).sin() * 20.0)
            .collect();
        let series = series_from_closes(&closes);

        let signals = MacdCrossover::new().signals(&series);
        for i in 0..signals.len() {
            assert!(!(signals.entries[i] && signals.exits[i]), "bar {}", i);
        }
    }
}
