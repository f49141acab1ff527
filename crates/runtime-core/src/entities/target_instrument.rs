//! TargetInstrument entity: the per-contract bar history and indicator bag.
//!
//! Deliberately anemic, mirroring the original design: this struct holds
//! data, not behavior. All calculation lives in `domain_service::calculation`
//! and `domain_service::indicator_service`; this module only owns storage.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Bar, DivergenceState, DullnessState, EmaState, MacdValue, TdValue};

/// A single named indicator value, tagged by variant so that producers and
/// consumers get typed access instead of `Any`-style downcasting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum IndicatorSlot {
    Macd(MacdValue),
    Ema(EmaState),
    Td(TdValue),
    Dullness(DullnessState),
    Divergence(DivergenceState),
}

/// Bars beyond this count are trimmed from the front of the ring buffer.
/// Generous enough to cover every indicator's lookback (MACD 26, TD 13,
/// EMA spans up to a few hundred) with headroom for historical display.
pub const DEFAULT_BAR_CAPACITY: usize = 2000;

/// Minimum bar count before indicators are considered reliable.
pub const MIN_BARS_FOR_INDICATORS: usize = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetInstrument {
    pub vt_symbol: String,
    bars: VecDeque<Bar>,
    capacity: usize,
    indicators: Vec<(String, IndicatorSlot)>,
    pub last_update_time: Option<DateTime<Utc>>,
}

impl TargetInstrument {
    pub fn new(vt_symbol: impl Into<String>) -> Self {
        Self {
            vt_symbol: vt_symbol.into(),
            bars: VecDeque::with_capacity(DEFAULT_BAR_CAPACITY),
            capacity: DEFAULT_BAR_CAPACITY,
            indicators: Vec::new(),
            last_update_time: None,
        }
    }

    pub fn with_capacity(vt_symbol: impl Into<String>, capacity: usize) -> Self {
        Self {
            vt_symbol: vt_symbol.into(),
            bars: VecDeque::with_capacity(capacity),
            capacity,
            indicators: Vec::new(),
            last_update_time: None,
        }
    }

    pub fn append_bar(&mut self, bar: Bar) {
        if self.bars.len() >= self.capacity {
            self.bars.pop_front();
        }
        self.last_update_time = Some(bar.datetime);
        self.bars.push_back(bar);
    }

    pub fn latest_bar(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// Most recent `n` bars, oldest first.
    pub fn bar_history(&self, n: usize) -> Vec<Bar> {
        let len = self.bars.len();
        let skip = len.saturating_sub(n);
        self.bars.iter().skip(skip).copied().collect()
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn has_enough_data(&self) -> bool {
        self.bars.len() >= MIN_BARS_FOR_INDICATORS
    }

    pub fn latest_close(&self) -> f64 {
        self.bars.back().map(|b| b.close).unwrap_or(0.0)
    }

    pub fn latest_high(&self) -> f64 {
        self.bars.back().map(|b| b.high).unwrap_or(0.0)
    }

    pub fn latest_low(&self) -> f64 {
        self.bars.back().map(|b| b.low).unwrap_or(0.0)
    }

    pub fn set_indicator(&mut self, key: impl Into<String>, slot: IndicatorSlot) {
        let key = key.into();
        if let Some(entry) = self.indicators.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = slot;
        } else {
            self.indicators.push((key, slot));
        }
    }

    pub fn get_indicator(&self, key: &str) -> Option<&IndicatorSlot> {
        self.indicators.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(close: f64) -> Bar {
        Bar::new(Utc::now(), close, close + 1.0, close - 1.0, close, 100)
    }

    #[test]
    fn append_trims_to_capacity() {
        let mut instr = TargetInstrument::with_capacity("rb2501.SHFE", 3);
        for i in 0..5 {
            instr.append_bar(bar(100.0 + i as f64));
        }
        assert_eq!(instr.bar_count(), 3);
        assert_eq!(instr.latest_close(), 104.0);
    }

    #[test]
    fn has_enough_data_threshold() {
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        for i in 0..29 {
            instr.append_bar(bar(100.0 + i as f64));
        }
        assert!(!instr.has_enough_data());
        instr.append_bar(bar(130.0));
        assert!(instr.has_enough_data());
    }

    #[test]
    fn indicator_slot_roundtrip() {
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        instr.set_indicator(
            "macd",
            IndicatorSlot::Macd(MacdValue { dif: 1.0, dea: 0.5, macd_bar: 1.0 }),
        );
        match instr.get_indicator("macd") {
            Some(IndicatorSlot::Macd(v)) => assert!((v.dif - 1.0).abs() < 1e-9),
            _ => panic!("expected macd slot"),
        }
    }

    #[test]
    fn bar_history_returns_oldest_first() {
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        for i in 0..10 {
            instr.append_bar(bar(100.0 + i as f64));
        }
        let hist = instr.bar_history(3);
        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0].close, 107.0);
        assert_eq!(hist[2].close, 109.0);
    }
}
