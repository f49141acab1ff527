//! Immutable snapshots produced by the indicator calculation services.
//!
//! Each `*State`/`*Value` type here is a point-in-time, read-only view; the
//! calculation services in [`crate::domain_service::calculation`] own the
//! mutable running state and hand out these snapshots on every update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendStatus {
    Up,
    Down,
    Neutral,
}

/// Fast/slow EMA pair snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaState {
    pub fast_ema: f64,
    pub slow_ema: f64,
    pub trend_status: TrendStatus,
}

impl EmaState {
    pub fn is_bullish(&self) -> bool {
        self.fast_ema > self.slow_ema
    }

    pub fn is_bearish(&self) -> bool {
        self.fast_ema < self.slow_ema
    }

    pub fn is_uptrend(&self) -> bool {
        self.trend_status == TrendStatus::Up
    }

    pub fn is_downtrend(&self) -> bool {
        self.trend_status == TrendStatus::Down
    }

    pub fn spread(&self) -> f64 {
        self.fast_ema - self.slow_ema
    }

    pub fn spread_pct(&self) -> f64 {
        if self.slow_ema == 0.0 {
            return 0.0;
        }
        (self.fast_ema - self.slow_ema) / self.slow_ema * 100.0
    }
}

/// DIF/DEA/histogram snapshot of the MACD indicator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdValue {
    pub dif: f64,
    pub dea: f64,
    pub macd_bar: f64,
}

impl MacdValue {
    pub fn is_golden_cross(&self) -> bool {
        self.dif > self.dea
    }

    pub fn is_death_cross(&self) -> bool {
        self.dif < self.dea
    }

    pub fn is_above_zero(&self) -> bool {
        self.dif > 0.0
    }

    pub fn is_below_zero(&self) -> bool {
        self.dif < 0.0
    }
}

/// DeMark TD Sequential counter snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdValue {
    /// Positive for a buy-setup count, negative for a sell-setup count.
    pub td_count: i32,
    pub td_setup: i32,
    pub has_buy_8_9: bool,
    pub has_sell_8_9: bool,
}

impl TdValue {
    pub fn is_buy_setup_complete(&self) -> bool {
        self.td_count >= 9
    }

    pub fn is_sell_setup_complete(&self) -> bool {
        self.td_count <= -9
    }

    pub fn is_buy_signal_active(&self) -> bool {
        self.has_buy_8_9 || self.is_buy_setup_complete()
    }

    pub fn is_sell_signal_active(&self) -> bool {
        self.has_sell_8_9 || self.is_sell_setup_complete()
    }
}

/// MACD histogram "dullness": a run of consecutively shrinking histogram
/// bars that has not (yet) resolved into a confirmed divergence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DullnessState {
    pub is_top_active: bool,
    pub is_bottom_active: bool,
    pub start_time: Option<DateTime<Utc>>,
    pub start_price: f64,
    pub start_diff: f64,
    pub is_top_invalidated: bool,
    pub is_bottom_invalidated: bool,
}

impl DullnessState {
    pub fn is_active(&self) -> bool {
        self.is_top_active || self.is_bottom_active
    }

    pub fn is_invalidated(&self) -> bool {
        self.is_top_invalidated || self.is_bottom_invalidated
    }

    pub fn with_top_active(start_time: DateTime<Utc>, start_price: f64, start_diff: f64) -> Self {
        Self {
            is_top_active: true,
            start_time: Some(start_time),
            start_price,
            start_diff,
            ..Default::default()
        }
    }

    pub fn with_bottom_active(start_time: DateTime<Utc>, start_price: f64, start_diff: f64) -> Self {
        Self {
            is_bottom_active: true,
            start_time: Some(start_time),
            start_price,
            start_diff,
            ..Default::default()
        }
    }

    pub fn with_top_invalidated(&self) -> Self {
        Self {
            is_top_active: false,
            is_top_invalidated: true,
            ..*self
        }
    }

    pub fn with_bottom_invalidated(&self) -> Self {
        Self {
            is_bottom_active: false,
            is_bottom_invalidated: true,
            ..*self
        }
    }

    pub fn reset() -> Self {
        Self::default()
    }
}

/// Confirmed MACD top/bottom divergence against price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct DivergenceState {
    pub is_top_confirmed: bool,
    pub is_bottom_confirmed: bool,
    pub confirm_time: Option<DateTime<Utc>>,
    pub confirm_price: f64,
    pub confirm_diff: f64,
}

impl DivergenceState {
    pub fn is_confirmed(&self) -> bool {
        self.is_top_confirmed || self.is_bottom_confirmed
    }

    pub fn with_top_confirmed(confirm_time: DateTime<Utc>, confirm_price: f64, confirm_diff: f64) -> Self {
        Self {
            is_top_confirmed: true,
            confirm_time: Some(confirm_time),
            confirm_price,
            confirm_diff,
            ..Default::default()
        }
    }

    pub fn with_bottom_confirmed(confirm_time: DateTime<Utc>, confirm_price: f64, confirm_diff: f64) -> Self {
        Self {
            is_bottom_confirmed: true,
            confirm_time: Some(confirm_time),
            confirm_price,
            confirm_diff,
            ..Default::default()
        }
    }

    pub fn reset() -> Self {
        Self::default()
    }
}

/// Aggregate of every indicator family's latest value for one instrument,
/// returned by `IndicatorService::calculate_all`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct IndicatorResult {
    pub macd_value: Option<MacdValue>,
    pub td_value: Option<TdValue>,
    pub ema_state: Option<EmaState>,
    pub dullness_state: Option<DullnessState>,
    pub divergence_state: Option<DivergenceState>,
}

impl IndicatorResult {
    pub fn is_complete(&self) -> bool {
        self.macd_value.is_some()
            && self.td_value.is_some()
            && self.ema_state.is_some()
            && self.dullness_state.is_some()
            && self.divergence_state.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ema_state_relations() {
        let s = EmaState {
            fast_ema: 105.0,
            slow_ema: 100.0,
            trend_status: TrendStatus::Up,
        };
        assert!(s.is_bullish());
        assert!(s.is_uptrend());
        assert!((s.spread() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn macd_cross_detection() {
        let m = MacdValue { dif: 1.2, dea: 0.8, macd_bar: 0.8 };
        assert!(m.is_golden_cross());
        assert!(!m.is_death_cross());
    }

    #[test]
    fn td_setup_completion_thresholds() {
        let t = TdValue { td_count: 9, td_setup: 9, has_buy_8_9: false, has_sell_8_9: false };
        assert!(t.is_buy_setup_complete());
        assert!(t.is_buy_signal_active());
    }

    #[test]
    fn dullness_transitions() {
        let now = Utc::now();
        let s = DullnessState::with_top_active(now, 4100.0, 12.5);
        assert!(s.is_active());
        let invalidated = s.with_top_invalidated();
        assert!(invalidated.is_invalidated());
        assert!(!invalidated.is_active());
    }

    #[test]
    fn divergence_confirmation() {
        let now = Utc::now();
        let d = DivergenceState::with_bottom_confirmed(now, 3900.0, -8.0);
        assert!(d.is_confirmed());
        assert!(!d.is_top_confirmed);
    }
}
