//! Exponential moving average math, stateless and reusable by the MACD
//! calculator for its signal line.
//!
//! Matches pandas' `Series.ewm(span=N, adjust=False).mean()` recurrence:
//! the first value seeds the series, each following value blends in the
//! latest observation with `alpha = 2 / (span + 1)`.

use crate::value_objects::{Bar, EmaState, TrendStatus};

pub const DEFAULT_FAST_PERIOD: usize = 12;
pub const DEFAULT_SLOW_PERIOD: usize = 26;

fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Runs the `ewm(adjust=False)` recurrence over `closes`, returning one EMA
/// value per input bar (same length, no leading NaNs/None: the series is
/// seeded by the first close).
pub fn ewm_series(closes: &[f64], span: usize) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }
    let a = alpha(span);
    let mut out = Vec::with_capacity(closes.len());
    let mut prev = closes[0];
    out.push(prev);
    for &c in &closes[1..] {
        prev = a * c + (1.0 - a) * prev;
        out.push(prev);
    }
    out
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EmaCalculator;

impl EmaCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Fast/slow EMA series over the whole bar history, aligned index for
    /// index with `bars`.
    pub fn compute(&self, bars: &[Bar], period_fast: usize, period_slow: usize) -> (Vec<f64>, Vec<f64>) {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        (ewm_series(&closes, period_fast), ewm_series(&closes, period_slow))
    }

    /// Latest EMA state, or `None` if there isn't enough history to judge
    /// a trend (`trend_lookback` bars of fast/slow EMA are required).
    pub fn latest_state(&self, bars: &[Bar], period_fast: usize, period_slow: usize, trend_lookback: usize) -> Option<EmaState> {
        if bars.is_empty() {
            return None;
        }
        let (fast, slow) = self.compute(bars, period_fast, period_slow);
        let trend_status = self.determine_trend(&fast, &slow, trend_lookback);
        Some(EmaState { fast_ema: *fast.last()?, slow_ema: *slow.last()?, trend_status })
    }

    /// Up: fast stays above slow across the lookback window and fast is
    /// still rising. Down: the mirror image. Anything else is neutral.
    pub fn determine_trend(&self, fast: &[f64], slow: &[f64], lookback: usize) -> TrendStatus {
        if fast.len() < lookback || slow.len() < lookback {
            return TrendStatus::Neutral;
        }
        let fast_recent = &fast[fast.len() - lookback..];
        let slow_recent = &slow[slow.len() - lookback..];

        let fast_direction = fast_recent[fast_recent.len() - 1] - fast_recent[0];
        let is_fast_above_slow = fast_recent.iter().zip(slow_recent).all(|(f, s)| f > s);
        let is_fast_below_slow = fast_recent.iter().zip(slow_recent).all(|(f, s)| f < s);

        if is_fast_above_slow && fast_direction > 0.0 {
            TrendStatus::Up
        } else if is_fast_below_slow && fast_direction < 0.0 {
            TrendStatus::Down
        } else {
            TrendStatus::Neutral
        }
    }

    /// (is_golden_cross, is_death_cross) from the last two fast/slow pairs.
    pub fn check_cross(&self, fast: &[f64], slow: &[f64]) -> (bool, bool) {
        if fast.len() < 2 || slow.len() < 2 {
            return (false, false);
        }
        let n = fast.len();
        let (prev_fast, prev_slow) = (fast[n - 2], slow[n - 2]);
        let (curr_fast, curr_slow) = (fast[n - 1], slow[n - 1]);

        let golden = prev_fast <= prev_slow && curr_fast > curr_slow;
        let death = prev_fast >= prev_slow && curr_fast < curr_slow;
        (golden, death)
    }

    pub fn spread_pct(&self, fast_ema: f64, slow_ema: f64) -> Option<f64> {
        if slow_ema == 0.0 {
            return None;
        }
        Some((fast_ema - slow_ema) / slow_ema * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bars(closes: &[f64]) -> Vec<Bar> {
        closes.iter().map(|&c| Bar::new(Utc::now(), c, c + 1.0, c - 1.0, c, 10)).collect()
    }

    #[test]
    fn ewm_seeds_from_first_value() {
        let series = ewm_series(&[10.0, 10.0, 10.0], 5);
        assert!((series[0] - 10.0).abs() < 1e-9);
        assert!((series[2] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn uptrend_requires_fast_above_slow_and_rising() {
        let calc = EmaCalculator::new();
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let b = bars(&closes);
        let state = calc.latest_state(&b, 5, 20, 5).unwrap();
        assert!(state.is_uptrend());
        assert!(state.is_bullish());
    }

    #[test]
    fn flat_series_is_neutral() {
        let calc = EmaCalculator::new();
        let b = bars(&vec![100.0; 30]);
        let state = calc.latest_state(&b, 5, 20, 5).unwrap();
        assert_eq!(state.trend_status, TrendStatus::Neutral);
    }

    #[test]
    fn golden_cross_detected_on_crossing_bars() {
        let calc = EmaCalculator::new();
        let fast = vec![9.0, 9.5, 10.5];
        let slow = vec![10.0, 10.0, 10.0];
        let (golden, death) = calc.check_cross(&fast, &slow);
        assert!(golden);
        assert!(!death);
    }
}
