//! DIF/DEA/histogram MACD math and red/green bar peak detection.

use chrono::{DateTime, Utc};

use crate::value_objects::{Bar, MacdValue};

use super::ema_calc::ewm_series;

pub const DEFAULT_FAST_PERIOD: usize = 12;
pub const DEFAULT_SLOW_PERIOD: usize = 26;
pub const DEFAULT_SIGNAL_PERIOD: usize = 9;

/// One detected top (red bar) or bottom (green bar) peak in the MACD
/// histogram, used by the dullness/divergence state machines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdPeak {
    pub index: usize,
    pub datetime: DateTime<Utc>,
    pub price: f64,
    pub dif: f64,
    pub is_top: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MacdCalculator;

impl MacdCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Returns `(dif, dea, macd_bar)` series, one entry per input bar.
    pub fn compute(
        &self,
        bars: &[Bar],
        fast_period: usize,
        slow_period: usize,
        signal_period: usize,
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        if bars.is_empty() {
            return (Vec::new(), Vec::new(), Vec::new());
        }
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ema_fast = ewm_series(&closes, fast_period);
        let ema_slow = ewm_series(&closes, slow_period);

        let dif: Vec<f64> = ema_fast.iter().zip(&ema_slow).map(|(f, s)| f - s).collect();
        let dea = ewm_series(&dif, signal_period);
        let macd: Vec<f64> = dif.iter().zip(&dea).map(|(d, e)| 2.0 * (d - e)).collect();

        (dif, dea, macd)
    }

    pub fn latest_value(&self, bars: &[Bar], fast_period: usize, slow_period: usize, signal_period: usize) -> Option<MacdValue> {
        if bars.is_empty() {
            return None;
        }
        let (dif, dea, macd) = self.compute(bars, fast_period, slow_period, signal_period);
        Some(MacdValue { dif: *dif.last()?, dea: *dea.last()?, macd_bar: *macd.last()? })
    }

    /// A bar at index `i` is a top peak if its histogram value is positive
    /// and is the maximum within `[i - lookback, i + lookback]`; a bottom
    /// peak mirrors this on the negative side. Edge bars without a full
    /// window on both sides are never reported.
    pub fn detect_peaks(&self, bars: &[Bar], macd: &[f64], dif: &[f64], lookback: usize) -> Vec<MacdPeak> {
        let n = macd.len();
        if n <= 2 * lookback {
            return Vec::new();
        }

        let mut peaks = Vec::new();
        for i in lookback..n - lookback {
            let current = macd[i];
            let window = (i - lookback)..=(i + lookback);

            if current > 0.0 {
                let is_peak = window.clone().filter(|&j| j != i).all(|j| current >= macd[j]);
                if is_peak {
                    peaks.push(MacdPeak { index: i, datetime: bars[i].datetime, price: bars[i].close, dif: dif[i], is_top: true });
                }
            } else if current < 0.0 {
                let is_valley = window.filter(|&j| j != i).all(|j| current <= macd[j]);
                if is_valley {
                    peaks.push(MacdPeak { index: i, datetime: bars[i].datetime, price: bars[i].close, dif: dif[i], is_top: false });
                }
            }
        }
        peaks
    }

    pub fn check_cross(&self, dif: &[f64], dea: &[f64]) -> (bool, bool) {
        if dif.len() < 2 || dea.len() < 2 {
            return (false, false);
        }
        let n = dif.len();
        let (prev_dif, prev_dea) = (dif[n - 2], dea[n - 2]);
        let (curr_dif, curr_dea) = (dif[n - 1], dea[n - 1]);

        let golden = prev_dif <= prev_dea && curr_dif > curr_dea;
        let death = prev_dif >= prev_dea && curr_dif < curr_dea;
        (golden, death)
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
    fn compute_produces_one_value_per_bar() {
        let calc = MacdCalculator::new();
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let b = bars(&closes);
        let (dif, dea, macd) = calc.compute(&b, 12, 26, 9);
        assert_eq!(dif.len(), b.len());
        assert_eq!(dea.len(), b.len());
        assert_eq!(macd.len(), b.len());
    }

    #[test]
    fn detect_peaks_finds_local_extremes() {
        let calc = MacdCalculator::new();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin() * 10.0).collect();
        let b = bars(&closes);
        let (dif, _dea, macd) = calc.compute(&b, 12, 26, 9);
        let peaks = calc.detect_peaks(&b, &macd, &dif, 5);
        assert!(!peaks.is_empty());
    }

    #[test]
    fn cross_detection_requires_at_least_two_points() {
        let calc = MacdCalculator::new();
        let (golden, death) = calc.check_cross(&[1.0], &[1.0]);
        assert!(!golden && !death);
    }
}
