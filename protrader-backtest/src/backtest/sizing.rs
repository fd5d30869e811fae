//! Volatility-adjusted position sizing.

/// Compute the share count for an entry.
///
/// Two independent caps apply simultaneously: never risk more than
/// `risk_pct` of capital to the stop, and never commit more than
/// `max_position_pct` of capital regardless of stop distance.
///
/// A stop at or above the entry price implies an unbounded position; that is
/// a configuration defect, and the trade is refused with a zero size.
pub fn position_size(
    capital: f64,
    entry_price: f64,
    stop_price: f64,
    risk_pct: f64,
    max_position_pct: f64,
) -> f64 {
    if entry_price <= 0.0 || capital <= 0.0 {
        return 0.0;
    }

    let risk_per_share = entry_price - stop_price;
    if risk_per_share <= 0.0 {
        return 0.0;
    }

    let risk_amount = capital * (risk_pct / 100.0);
    let shares_by_risk = risk_amount / risk_per_share;

    let max_investment = capital * (max_position_pct / 100.0);
    let shares_by_cap = max_investment / entry_price;

    shares_by_risk.min(shares_by_cap)
}

// ============================================================================
// Tests
// ============================================================================
