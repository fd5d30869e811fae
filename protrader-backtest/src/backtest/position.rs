//! Open-position state for the risk-managed engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mutable state of the single open position.
///
/// The engine holds at most one of these at a time (`Option<PositionState>`
/// encodes FLAT vs IN_POSITION). Created on entry acceptance, mutated daily
/// while open, dropped on exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionState {
    /// Shares held
    pub shares: f64,
    /// Entry fill price
    pub entry_price: f64,
    /// Entry date
    pub entry_date: NaiveDate,
    /// Current stop level; ratchets upward once the trailing stop arms
    pub stop_loss_price: f64,
    /// Profit target
    pub take_profit_price: f64,
    /// Highest close observed since entry
    pub highest_price_since_entry: f64,
    /// Whether the trailing mechanism has armed
    pub trailing_stop_active: bool,
}

impl PositionState {
    /// Open a new position.
    pub fn open(
        shares: f64,
        entry_price: f64,
        entry_date: NaiveDate,
        stop_loss_price: f64,
        take_profit_price: f64,
    ) -> Self {
        Self {
            shares,
            entry_price,
            entry_date,
            stop_loss_price,
            take_profit_price,
            highest_price_since_entry: entry_price,
            trailing_stop_active: false,
        }
    }

    /// Calendar days held as of `date`.
    pub fn days_held(&self, date: NaiveDate) -> i64 {
        (date - self.entry_date).num_days()
    }

    /// Unrealized P&L percentage at `price`.
    pub fn unrealized_pnl_pct(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price * 100.0
    }

    /// Invested principal.
    pub fn principal(&self) -> f64 {
        self.shares * self.entry_price
    }

    /// Market value at `price`.
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares * price
    }

    /// Track the day's price and advance the trailing-stop state.
    ///
    /// The trailing stop arms once unrealized profit reaches
    /// `trailing_stop_pct`; from then on the stop only ratchets upward,
    /// following the highest observed price. It never moves down.
    pub fn update_trailing(&mut self, price: f64, trailing_stop_pct: f64) {
        if price > self.highest_price_since_entry {
            self.highest_price_since_entry = price;
        }

        let trailing_level = self.highest_price_since_entry * (1.0 - trailing_stop_pct / 100.0);
        if !self.trailing_stop_active && self.unrealized_pnl_pct(price) >= trailing_stop_pct {
            self.trailing_stop_active = true;
            self.stop_loss_price = trailing_level;
        }
        if self.trailing_stop_active {
            self.stop_loss_price = self.stop_loss_price.max(trailing_level);
        }
    }

    /// Check if the take-profit level is reached at `price`.
    pub fn take_profit_hit(&self, price: f64) -> bool {
        price >= self.take_profit_price
    }

    /// Check if the stop level is reached at `price`.
    pub fn stop_hit(&self, price: f64) -> bool {
        price <= self.stop_loss_price
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + chrono::Days::new(n)
    }

    fn open_position() -> PositionState {
        // Entry 100, stop 95, target 115, trailing arms at +10%.
        PositionState::open(50.0, 100.0, day(0), 95.0, 115.0)
    }

    #[test]
    fn test_open_state() {
        let pos = open_position();
        assert!((pos.highest_price_since_entry - 100.0).abs() < 1e-9);
        assert!(!pos.trailing_stop_active);
        assert!((pos.principal() - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_days_held() {
        let pos = open_position();
        assert_eq!(pos.days_held(day(0)), 0);
        assert_eq!(pos.days_held(day(45)), 45);
    }

    #[test]
    fn test_trigger_checks() {
        let pos = open_position();
        assert!(pos.take_profit_hit(115.0));
        assert!(!pos.take_profit_hit(114.99));
        assert!(pos.stop_hit(95.0));
        assert!(!pos.stop_hit(95.01));
    }

    #[test]
    fn test_trailing_arms_at_threshold() {
        let mut pos = open_position();

        pos.update_trailing(108.0, 10.0);
        assert!(!pos.trailing_stop_active);
        assert!((pos.stop_loss_price - 95.0).abs() < 1e-9);

        pos.update_trailing(110.0, 10.0);
        assert!(pos.trailing_stop_active);
        assert!((pos.stop_loss_price - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_stop_never_retreats() {
        let mut pos = open_position();
        let prices = [110.0, 120.0, 114.0, 118.0, 108.0, 125.0];

        let mut last_stop = pos.stop_loss_price;
        for price in prices {
            pos.update_trailing(price, 10.0);
            assert!(
                pos.stop_loss_price >= last_stop - 1e-12,
                "stop moved down at price {}",
                price
            );
            last_stop = pos.stop_loss_price;
        }

        // Peak was 125: the stop must sit at 112.5.
        assert!((pos.stop_loss_price - 112.5).abs() < 1e-9);
    }

    #[test]
    fn test_highest_price_tracks_peak_only() {
        let mut pos = open_position();
        pos.update_trailing(104.0, 10.0);
        pos.update_trailing(101.0, 10.0);
        assert!((pos.highest_price_since_entry - 104.0).abs() < 1e-9);
    }
}
