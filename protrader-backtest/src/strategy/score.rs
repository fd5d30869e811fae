//! Weighted technical scoring over computed indicator values.
//!
//! This is a rules-evaluation concern adjacent to the simulation core: a pure
//! function over an `IndicatorSnapshot`, never consulted by the backtest
//! state machine. Scores are 0-100 per component, weighted, and capped at 85
//! overall (no instrument scores a perfect setup).

use serde::Serialize;

use crate::indicators::IndicatorSnapshot;

/// ADX level above which the market is treated as trending.
const ADX_TREND_THRESHOLD: f64 = 25.0;

/// No setup is perfect; the aggregate score is capped here.
const MAX_SCORE: f64 = 85.0;

/// One scored component with its weight.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreComponent {
    pub name: &'static str,
    pub score: f64,
    pub weight: f64,
}

/// Aggregate technical score with the component breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct TechnicalScore {
    /// Weighted 0-85 score; 50 is neutral
    pub score: f64,
    /// Whether ADX reads the market as trending
    pub is_trending: bool,
    /// Per-component contributions
    pub components: Vec<ScoreComponent>,
}

/// Cap a score at the realistic maximum.
fn cap_score(score: f64) -> f64 {
    score.min(MAX_SCORE)
}

/// Compute the weighted technical score for a snapshot.
pub fn technical_score(snapshot: &IndicatorSnapshot, current_price: f64) -> TechnicalScore {
    let is_trending = snapshot.momentum.adx > ADX_TREND_THRESHOLD;
    let ma = &snapshot.moving_averages;

    // RSI, interpreted against trend context: oversold readings are weighted
    // harder in ranging markets, and an overbought reading above the major
    // averages is tolerated in a trend.
    let rsi = snapshot.rsi;
    let rsi_score = if is_trending {
        if rsi < 30.0 {
            90.0
        } else if rsi < 40.0 {
            70.0
        } else if rsi < 60.0 {
            50.0
        } else if rsi < 70.0 {
            30.0
        } else if current_price > ma.sma_50 && current_price > ma.sma_200 {
            40.0
        } else {
            10.0
        }
    } else if rsi < 30.0 {
        100.0
    } else if rsi < 40.0 {
        75.0
    } else if rsi < 60.0 {
        50.0
    } else if rsi < 70.0 {
        25.0
    } else {
        0.0
    };

    // MACD with a dynamic histogram threshold scaled by price and ATR.
    let macd = &snapshot.macd;
    let dynamic_threshold = (current_price * 0.001).max(snapshot.atr * 0.1);
    let macd_score = if macd.histogram > 0.0 && macd.macd > macd.signal {
        if macd.histogram > dynamic_threshold {
            100.0
        } else {
            75.0
        }
    } else if macd.histogram > 0.0 {
        60.0
    } else if macd.histogram < 0.0 && macd.macd < macd.signal {
        if macd.histogram < -dynamic_threshold {
            0.0
        } else {
            25.0
        }
    } else {
        40.0
    };

    // Bollinger %B: low in the band is constructive, high is stretched.
    let price_pos = snapshot.bollinger.price_position;
    let bb_score = if price_pos < 0.2 {
        100.0
    } else if price_pos < 0.4 {
        75.0
    } else if price_pos < 0.6 {
        50.0
    } else if price_pos < 0.8 {
        25.0
    } else {
        0.0
    };

    // Moving-average stack: 25 points per alignment.
    let mut ma_score = 0.0;
    if current_price > ma.sma_20 {
        ma_score += 25.0;
    }
    if current_price > ma.sma_50 {
        ma_score += 25.0;
    }
    if current_price > ma.sma_200 {
        ma_score += 25.0;
    }
    if ma.sma_20 > ma.sma_50 && ma.sma_50 > ma.sma_200 {
        ma_score += 25.0;
    }

    // Volume confirmation.
    let volume = &snapshot.volume;
    let volume_score = if volume.volume_ratio > 1.5 && volume.obv_trend > 0.0 {
        100.0
    } else if volume.volume_ratio > 1.2 {
        75.0
    } else if volume.volume_ratio > 0.8 {
        50.0
    } else {
        25.0
    };

    // Momentum: ROC base, nudged by stochastic extremes.
    let momentum = &snapshot.momentum;
    let mut momentum_score: f64 = if momentum.roc_10 > 5.0 {
        100.0
    } else if momentum.roc_10 > 2.0 {
        75.0
    } else if momentum.roc_10 < -5.0 {
        0.0
    } else if momentum.roc_10 < -2.0 {
        25.0
    } else {
        50.0
    };
    if momentum.stochastic_k < 20.0 {
        momentum_score = (momentum_score + 20.0).min(100.0);
    } else if momentum.stochastic_k > 80.0 {
        momentum_score = (momentum_score - 20.0).max(0.0);
    }

    let components = vec![
        ScoreComponent {
            name: "RSI",
            score: rsi_score,
            weight: 20.0,
        },
        ScoreComponent {
            name: "MACD",
            score: macd_score,
            weight: 20.0,
        },
        ScoreComponent {
            name: "Bollinger Bands",
            score: bb_score,
            weight: 15.0,
        },
        ScoreComponent {
            name: "Moving Averages",
            score: ma_score,
            weight: 15.0,
        },
        ScoreComponent {
            name: "Volume",
            score: volume_score,
            weight: 10.0,
        },
        ScoreComponent {
            name: "Momentum",
            score: momentum_score,
            weight: 20.0,
        },
    ];

    let total_weight: f64 = components.iter().map(|c| c.weight).sum();
    let weighted: f64 = components.iter().map(|c| c.score * c.weight).sum::<f64>() / total_weight;

    TechnicalScore {
        score: cap_score(weighted),
        is_trending,
        components,
    }
}

// ============================================================================
// Tests
// ============================================================================
