//! Relative Strength Index with Wilder's smoothing.

/// RSI over a close series using Wilder's smoothing.
///
/// Average gain/loss use the exponentially weighted mean with center-of-mass
/// `period - 1` (smoothing factor `1 / period`), adjust-free recursion.
/// Values are NaN until `period` bars have been observed.
///
/// Edge cases: a zero average loss with positive gains reads 100 (fully
/// overbought, not a division fault); a flat series stays NaN.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut result = vec![f64::NAN; closes.len()];
    if period < 2 || closes.len() < period {
        return result;
    }

    let alpha = 1.0 / period as f64;
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 0..closes.len() {
        let (gain, loss) = if i == 0 {
            (0.0, 0.0)
        } else {
            let delta = closes[i] - closes[i - 1];
            (delta.max(0.0), (-delta).max(0.0))
        };

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = gain * alpha + avg_gain * (1.0 - alpha);
            avg_loss = loss * alpha + avg_loss * (1.0 - alpha);
        }

        if i + 1 < period {
            continue;
        }

        if avg_loss == 0.0 {
            result[i] = if avg_gain > 0.0 { 100.0 } else { f64::NAN };
        } else {
            let rs = avg_gain / avg_loss;
            result[i] = 100.0 - 100.0 / (1.0 + rs);
        }
    }

    result
}

/// Last RSI value, substituting the neutral 50 when undefined.
pub fn rsi_last(closes: &[f64], period: usize) -> f64 {
    let value = rsi(closes, period).last().copied().unwrap_or(f64::NAN);
    if value.is_nan() {
        50.0
    } else {
        value
    }
}

// ============================================================================
// Tests
// ============================================================================
