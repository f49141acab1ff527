//! Orchestrates the EMA/MACD/TD calculators plus the dullness and
//! divergence state machines into one [`IndicatorResult`] per call.

use crate::entities::TargetInstrument;
use crate::value_objects::{
    Bar, DivergenceState, DullnessState, IndicatorResult, MacdValue,
};

use super::calculation::{
    ema_calc, macd_calc, td_calc, EmaCalculator, MacdCalculator, TdCalculator,
};

/// Bars either side of a candidate index required to call it a local
/// extreme in the MACD histogram.
pub const PEAK_LOOKBACK: usize = 5;

/// Bars of trailing history a trend/dullness judgement is based on.
const TREND_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy)]
pub struct IndicatorService {
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
}

impl Default for IndicatorService {
    fn default() -> Self {
        Self {
            macd_fast: macd_calc::DEFAULT_FAST_PERIOD,
            macd_slow: macd_calc::DEFAULT_SLOW_PERIOD,
            macd_signal: macd_calc::DEFAULT_SIGNAL_PERIOD,
            ema_fast: ema_calc::DEFAULT_FAST_PERIOD,
            ema_slow: ema_calc::DEFAULT_SLOW_PERIOD,
        }
    }
}

impl IndicatorService {
    pub fn new(macd_fast: usize, macd_slow: usize, macd_signal: usize, ema_fast: usize, ema_slow: usize) -> Self {
        Self { macd_fast, macd_slow, macd_signal, ema_fast, ema_slow }
    }

    /// Runs every indicator family over `instrument`'s full bar history and
    /// advances the dullness/divergence state machines from their previous
    /// values. Returns a default (all-`None`) result below the minimum bar
    /// count, mirroring the original's empty-DTO short circuit.
    pub fn calculate_all(
        &self,
        instrument: &TargetInstrument,
        prev_dullness: Option<DullnessState>,
        prev_divergence: Option<DivergenceState>,
    ) -> IndicatorResult {
        if !instrument.has_enough_data() {
            return IndicatorResult::default();
        }
        let bars = instrument.bar_history(instrument.bar_count());

        let macd_calc = MacdCalculator::new();
        let (dif, dea, macd_bar) = macd_calc.compute(&bars, self.macd_fast, self.macd_slow, self.macd_signal);
        let macd_value = macd_calc.latest_value(&bars, self.macd_fast, self.macd_slow, self.macd_signal);

        let td_calc = TdCalculator::new();
        let td_value = td_calc.latest_value(&bars);

        let ema_calc = EmaCalculator::new();
        let ema_state = ema_calc.latest_state(&bars, self.ema_fast, self.ema_slow, TREND_LOOKBACK);

        let bar_time = bars.last().expect("has_enough_data checked above").datetime;

        let prev_dullness = prev_dullness.unwrap_or_default();
        let new_dullness = self.check_dullness(&macd_bar, &dif, bar_time, prev_dullness);

        let prev_divergence = prev_divergence.unwrap_or_default();
        let new_divergence = self.check_divergence(&bars, &macd_calc, &macd_bar, &dif, new_dullness, prev_divergence);

        IndicatorResult {
            macd_value,
            td_value,
            ema_state,
            dullness_state: Some(new_dullness),
            divergence_state: Some(new_divergence),
        }
    }

    /// Top dullness: MACD above zero with the histogram shrinking for two
    /// bars running; it invalidates the moment the histogram expands
    /// again, and resets whenever the DIF line crosses the zero axis.
    /// Bottom dullness mirrors this below zero. A newly-activated state is
    /// stamped with `bar_time` (the latest bar's own datetime), not wall
    /// clock time, so replaying the same bar stream is deterministic.
    pub fn check_dullness(
        &self,
        macd_bar: &[f64],
        dif: &[f64],
        bar_time: chrono::DateTime<chrono::Utc>,
        prev_state: DullnessState,
    ) -> DullnessState {
        let n = macd_bar.len();
        if n < 3 {
            return prev_state;
        }

        let current = MacdValue { dif: dif[n - 1], dea: 0.0, macd_bar: macd_bar[n - 1] };
        let prev1 = MacdValue { dif: dif[n - 2], dea: 0.0, macd_bar: macd_bar[n - 2] };
        let prev2 = MacdValue { dif: dif[n - 3], dea: 0.0, macd_bar: macd_bar[n - 3] };

        if current.is_above_zero() {
            if current.macd_bar < prev1.macd_bar && prev1.macd_bar < prev2.macd_bar {
                if !prev_state.is_top_active {
                    return DullnessState::with_top_active(bar_time, 0.0, current.dif);
                }
            } else if prev_state.is_top_active && current.macd_bar > prev1.macd_bar {
                return prev_state.with_top_invalidated();
            }
        } else if current.is_below_zero() {
            if current.macd_bar > prev1.macd_bar && prev1.macd_bar > prev2.macd_bar {
                if !prev_state.is_bottom_active {
                    return DullnessState::with_bottom_active(bar_time, 0.0, current.dif);
                }
            } else if prev_state.is_bottom_active && current.macd_bar < prev1.macd_bar {
                return prev_state.with_bottom_invalidated();
            }
        }

        if prev_state.is_active()
            && ((prev1.is_above_zero() && current.is_below_zero()) || (prev1.is_below_zero() && current.is_above_zero()))
        {
            return DullnessState::reset();
        }

        prev_state
    }

    /// Top divergence confirms when price prints a new high but the DIF
    /// line's matching peak is lower than the prior one, and only while
    /// top dullness is active; bottom divergence mirrors this.
    pub fn check_divergence(
        &self,
        bars: &[Bar],
        macd_calc: &MacdCalculator,
        macd_bar: &[f64],
        dif: &[f64],
        dullness_state: DullnessState,
        prev_state: DivergenceState,
    ) -> DivergenceState {
        if bars.len() < 20 {
            return prev_state;
        }

        let peaks = macd_calc.detect_peaks(bars, macd_bar, dif, PEAK_LOOKBACK);
        if peaks.len() < 2 {
            return prev_state;
        }

        let last = bars.last().expect("checked len above");
        let current_dif = *dif.last().expect("checked len above");

        let top_peaks: Vec<_> = peaks.iter().filter(|p| p.is_top).collect();
        let bottom_peaks: Vec<_> = peaks.iter().filter(|p| !p.is_top).collect();

        if top_peaks.len() >= 2 && dullness_state.is_top_active {
            let recent = top_peaks[top_peaks.len() - 1];
            let prior = top_peaks[top_peaks.len() - 2];
            if recent.price > prior.price && recent.dif < prior.dif {
                return DivergenceState::with_top_confirmed(last.datetime, last.close, current_dif);
            }
        }

        if bottom_peaks.len() >= 2 && dullness_state.is_bottom_active {
            let recent = bottom_peaks[bottom_peaks.len() - 1];
            let prior = bottom_peaks[bottom_peaks.len() - 2];
            if recent.price < prior.price && recent.dif > prior.dif {
                return DivergenceState::with_bottom_confirmed(last.datetime, last.close, current_dif);
            }
        }

        prev_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn instrument_with_bars(closes: &[f64]) -> TargetInstrument {
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        for &c in closes {
            instr.append_bar(Bar::new(Utc::now(), c, c + 1.0, c - 1.0, c, 10));
        }
        instr
    }

    #[test]
    fn below_minimum_bars_returns_empty_result() {
        let instr = instrument_with_bars(&[100.0; 10]);
        let svc = IndicatorService::default();
        let result = svc.calculate_all(&instr, None, None);
        assert!(result.macd_value.is_none());
        assert!(!result.is_complete());
    }

    #[test]
    fn enough_bars_produces_complete_result() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0).collect();
        let instr = instrument_with_bars(&closes);
        let svc = IndicatorService::default();
        let result = svc.calculate_all(&instr, None, None);
        assert!(result.is_complete());
    }

    #[test]
    fn top_dullness_forms_on_shrinking_red_bars() {
        let svc = IndicatorService::default();
        let macd_bar = vec![0.0, 5.0, 3.0, 1.0];
        let dif = vec![0.0, 2.0, 2.0, 2.0];
        let state = svc.check_dullness(&macd_bar, &dif, Utc::now(), DullnessState::default());
        assert!(state.is_top_active);
    }

    #[test]
    fn dullness_resets_on_zero_cross() {
        let svc = IndicatorService::default();
        let prev = DullnessState::with_top_active(Utc::now(), 100.0, 5.0);
        let macd_bar = vec![1.0, 1.0, -1.0];
        let dif = vec![1.0, 1.0, -1.0];
        let state = svc.check_dullness(&macd_bar, &dif, Utc::now(), prev);
        assert!(!state.is_active());
    }

    #[test]
    fn divergence_requires_active_dullness() {
        let svc = IndicatorService::default();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0).collect();
        let bars: Vec<Bar> = closes.iter().map(|&c| Bar::new(Utc::now(), c, c + 1.0, c - 1.0, c, 10)).collect();
        let macd_calc = MacdCalculator::new();
        let (dif, _dea, macd_bar) = macd_calc.compute(&bars, 12, 26, 9);
        let divergence = svc.check_divergence(&bars, &macd_calc, &macd_bar, &dif, DullnessState::default(), DivergenceState::default());
        assert!(!divergence.is_confirmed());
    }

    #[test]
    fn replaying_the_same_bar_stream_twice_yields_identical_state() {
        let base = Utc::now();
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.2).sin() * 5.0).collect();
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        for (i, &c) in closes.iter().enumerate() {
            let t = base + chrono::Duration::minutes(i as i64);
            instr.append_bar(Bar::new(t, c, c + 1.0, c - 1.0, c, 10));
        }

        let svc = IndicatorService::default();
        let first = svc.calculate_all(&instr, None, None);
        let second = svc.calculate_all(&instr, None, None);
        assert_eq!(first.dullness_state, second.dullness_state);
        assert_eq!(first.divergence_state, second.divergence_state);
    }
}
