//! DeMark TD Sequential setup counting.

use crate::value_objects::{Bar, TdValue};

/// Bars back a close is compared against when counting a setup.
pub const LOOKBACK: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct TdCalculator;

impl TdCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Running `(td_count, td_setup)` series. `td_count` is positive while
    /// counting a buy setup (close below the bar 4 back), negative while
    /// counting a sell setup, and resets to 0 on a tie. `td_setup` latches
    /// to ±9 once a count reaches that magnitude, 0 otherwise.
    pub fn compute(&self, bars: &[Bar]) -> (Vec<i32>, Vec<i32>) {
        let n = bars.len();
        let mut td_count = vec![0i32; n];
        let mut td_setup = vec![0i32; n];

        for i in LOOKBACK..n {
            let compare_price = bars[i - LOOKBACK].close;
            let current_price = bars[i].close;
            let prev_count = td_count[i - 1];

            td_count[i] = if current_price < compare_price {
                if prev_count > 0 { prev_count + 1 } else { 1 }
            } else if current_price > compare_price {
                if prev_count < 0 { prev_count - 1 } else { -1 }
            } else {
                0
            };

            td_setup[i] = if td_count[i] >= 9 {
                9
            } else if td_count[i] <= -9 {
                -9
            } else {
                0
            };
        }

        (td_count, td_setup)
    }

    pub fn latest_value(&self, bars: &[Bar]) -> Option<TdValue> {
        if bars.is_empty() {
            return None;
        }
        let (td_count, td_setup) = self.compute(bars);
        let (has_buy_8_9, has_sell_8_9) = self.check_8_9_signal(&td_count, 3);

        Some(TdValue {
            td_count: *td_count.last()?,
            td_setup: *td_setup.last()?,
            has_buy_8_9,
            has_sell_8_9,
        })
    }

    /// Whether an 8 or 9 count (either side) appeared within the last
    /// `lookback` bars.
    pub fn check_8_9_signal(&self, td_count: &[i32], lookback: usize) -> (bool, bool) {
        if td_count.is_empty() {
            return (false, false);
        }
        let recent = &td_count[td_count.len().saturating_sub(lookback)..];
        let has_buy = recent.iter().any(|&c| c == 8 || c == 9);
        let has_sell = recent.iter().any(|&c| c == -8 || c == -9);
        (has_buy, has_sell)
    }

    /// Index (counting from the end) of the most recent completed buy and
    /// sell setups, if any.
    pub fn find_setup_bars(&self, td_setup: &[i32]) -> (Option<usize>, Option<usize>) {
        let mut buy_idx = None;
        let mut sell_idx = None;

        for i in (0..td_setup.len()).rev() {
            if td_setup[i] == 9 && buy_idx.is_none() {
                buy_idx = Some(i);
            } else if td_setup[i] == -9 && sell_idx.is_none() {
                sell_idx = Some(i);
            }
            if buy_idx.is_some() && sell_idx.is_some() {
                break;
            }
        }

        (buy_idx, sell_idx)
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
    fn monotonic_decline_counts_up_to_setup() {
        let calc = TdCalculator::new();
        let closes: Vec<f64> = (0..14).map(|i| 100.0 - i as f64).collect();
        let b = bars(&closes);
        let (td_count, td_setup) = calc.compute(&b);
        assert_eq!(*td_count.last().unwrap(), 9);
        assert_eq!(*td_setup.last().unwrap(), 9);
    }

    #[test]
    fn monotonic_rise_counts_down_to_sell_setup() {
        let calc = TdCalculator::new();
        let closes: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        let b = bars(&closes);
        let (td_count, td_setup) = calc.compute(&b);
        assert_eq!(*td_count.last().unwrap(), -9);
        assert_eq!(*td_setup.last().unwrap(), -9);
    }

    #[test]
    fn tie_resets_count() {
        let calc = TdCalculator::new();
        let mut closes: Vec<f64> = (0..6).map(|i| 100.0 - i as f64).collect();
        closes.push(closes[closes.len() - 4]);
        let b = bars(&closes);
        let (td_count, _) = calc.compute(&b);
        assert_eq!(*td_count.last().unwrap(), 0);
    }

    #[test]
    fn find_setup_bars_locates_most_recent_each_side() {
        let calc = TdCalculator::new();
        let td_setup = vec![0, 0, 9, 0, 0, -9, 0];
        let (buy, sell) = calc.find_setup_bars(&td_setup);
        assert_eq!(buy, Some(2));
        assert_eq!(sell, Some(5));
    }
}
