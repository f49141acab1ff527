//! Open/close signal derivation from an instrument's indicator bag.
//!
//! Signal strings follow `ACTION_REASON` naming (`long_bottom_divergence`,
//! `close_long_top_dullness_invalidated`) so a downstream alert or log line
//! is self-describing without a lookup table.

use crate::entities::target_instrument::IndicatorSlot;
use crate::entities::{Position, TargetInstrument};
use crate::value_objects::Direction;

/// Generates open/close signal strings from an instrument's indicator bag.
/// A blank default (always `None`) is a legitimate implementation for a
/// strategy that only trades on external triggers; [`DivergenceSignalService`]
/// is the reference rule set driving `_execute_open`/`_execute_close`.
pub trait SignalService {
    fn check_open_signal(&self, instrument: &TargetInstrument) -> Option<String>;
    fn check_close_signal(&self, instrument: &TargetInstrument, position: &Position) -> Option<String>;
}

/// Opens on a confirmed MACD divergence, closes when the opposing setup or
/// dullness invalidation contradicts the position it opened.
#[derive(Debug, Clone, Copy, Default)]
pub struct DivergenceSignalService;

impl DivergenceSignalService {
    pub fn new() -> Self {
        Self
    }
}

impl SignalService for DivergenceSignalService {
    fn check_open_signal(&self, instrument: &TargetInstrument) -> Option<String> {
        let divergence = match instrument.get_indicator("divergence") {
            Some(IndicatorSlot::Divergence(d)) => *d,
            _ => return None,
        };
        let td = match instrument.get_indicator("td") {
            Some(IndicatorSlot::Td(t)) => Some(*t),
            _ => None,
        };

        if divergence.is_bottom_confirmed {
            return Some("long_bottom_divergence".to_string());
        }
        if divergence.is_top_confirmed {
            return Some("short_top_divergence".to_string());
        }

        if let Some(td) = td {
            if td.is_buy_setup_complete() {
                return Some("long_td_setup_9".to_string());
            }
            if td.is_sell_setup_complete() {
                return Some("short_td_setup_9".to_string());
            }
        }

        None
    }

    fn check_close_signal(&self, instrument: &TargetInstrument, position: &Position) -> Option<String> {
        let dullness = match instrument.get_indicator("dullness") {
            Some(IndicatorSlot::Dullness(d)) => *d,
            _ => return None,
        };
        let divergence = match instrument.get_indicator("divergence") {
            Some(IndicatorSlot::Divergence(d)) => *d,
            _ => return None,
        };

        match position.side {
            Direction::Long => {
                if divergence.is_top_confirmed {
                    return Some("close_long_top_divergence".to_string());
                }
                if dullness.is_bottom_invalidated {
                    return Some("close_long_bottom_dullness_invalidated".to_string());
                }
            }
            Direction::Short => {
                if divergence.is_bottom_confirmed {
                    return Some("close_short_bottom_divergence".to_string());
                }
                if dullness.is_top_invalidated {
                    return Some("close_short_top_dullness_invalidated".to_string());
                }
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::{Bar, DivergenceState, DullnessState, TdValue};
    use chrono::Utc;

    fn instrument_with(divergence: DivergenceState, td: Option<TdValue>) -> TargetInstrument {
        let mut instr = TargetInstrument::new("rb2501.SHFE");
        instr.append_bar(Bar::new(Utc::now(), 100.0, 101.0, 99.0, 100.0, 10));
        instr.set_indicator("divergence", IndicatorSlot::Divergence(divergence));
        if let Some(td) = td {
            instr.set_indicator("td", IndicatorSlot::Td(td));
        }
        instr
    }

    #[test]
    fn bottom_divergence_opens_long() {
        let svc = DivergenceSignalService::new();
        let instr = instrument_with(
            DivergenceState::with_bottom_confirmed(Utc::now(), 95.0, -3.0),
            None,
        );
        assert_eq!(svc.check_open_signal(&instr), Some("long_bottom_divergence".to_string()));
    }

    #[test]
    fn td_setup_opens_when_no_divergence() {
        let svc = DivergenceSignalService::new();
        let instr = instrument_with(
            DivergenceState::default(),
            Some(TdValue { td_count: 9, td_setup: 9, has_buy_8_9: true, has_sell_8_9: false }),
        );
        assert_eq!(svc.check_open_signal(&instr), Some("long_td_setup_9".to_string()));
    }

    #[test]
    fn no_signal_without_indicators() {
        let svc = DivergenceSignalService::new();
        let instr = TargetInstrument::new("rb2501.SHFE");
        assert_eq!(svc.check_open_signal(&instr), None);
    }

    #[test]
    fn long_position_closes_on_top_divergence() {
        let svc = DivergenceSignalService::new();
        let mut instr = instrument_with(DivergenceState::with_top_confirmed(Utc::now(), 105.0, 2.0), None);
        instr.set_indicator("dullness", IndicatorSlot::Dullness(DullnessState::default()));
        let position = Position::new("rb2501.SHFE", "rb2501.SHFE", "long_bottom_divergence", 1, Utc::now())
            .with_side(Direction::Long);
        assert_eq!(
            svc.check_close_signal(&instr, &position),
            Some("close_long_top_divergence".to_string())
        );
    }
}
