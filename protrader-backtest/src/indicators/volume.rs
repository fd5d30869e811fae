//! Volume indicators: volume ratio and On-Balance Volume.

use serde::{Deserialize, Serialize};

use crate::data::PriceSeries;

/// On-Balance Volume: cumulative signed volume.
///
/// Sign is +1 when the close rose against the prior bar, else -1; the first
/// bar counts positive.
pub fn obv(series: &PriceSeries) -> Vec<f64> {
    let bars = series.bars();
    let mut result = Vec::with_capacity(bars.len());
    let mut running = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        let sign = if i == 0 || bar.close > bars[i - 1].close {
            1.0
        } else {
            -1.0
        };
        running += sign * bar.volume;
        result.push(running);
    }
    result
}

/// Volume analysis snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VolumeAnalysis {
    /// Last bar's volume
    pub current_volume: f64,
    /// Rolling mean volume over the window
    pub avg_volume: f64,
    /// current_volume / avg_volume (1.0 when the average is unusable)
    pub volume_ratio: f64,
    /// Percent change of OBV over the window (0 with insufficient data)
    pub obv_trend: f64,
}

/// Compute the volume snapshot over `min(window, len)` trailing bars.
pub fn volume_analysis(series: &PriceSeries, window: usize) -> VolumeAnalysis {
    let volumes = series.volumes();
    let len = volumes.len();
    let window = window.min(len).max(1);

    let current_volume = volumes[len - 1];
    let avg_volume = volumes[len - window..].iter().sum::<f64>() / window as f64;

    let volume_ratio = if avg_volume > 0.0 && avg_volume.is_finite() {
        current_volume / avg_volume
    } else {
        1.0
    };

    let obv_series = obv(series);
    let obv_trend = if len >= window && window > 1 {
        let base = obv_series[len - window];
        if base != 0.0 {
            (obv_series[len - 1] - base) / base * 100.0
        } else {
            0.0
        }
    } else {
        0.0
    };

    VolumeAnalysis {
        current_volume,
        avg_volume,
        volume_ratio,
        obv_trend,
    }
}

// ============================================================================
// Tests
// ============================================================================
