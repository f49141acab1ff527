//! Selects a virtual-OTM strike from an option chain and gates it on
//! liquidity before the position sizer is allowed to trade it.

use crate::value_objects::{MarketTick, OptionContract, OptionType};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptionSelectorConfig {
    /// 0-based rank in the nearest-first OTM ordering (see DESIGN.md for
    /// why this departs from the reference's 1-based indexing).
    pub strike_level: usize,
    pub min_bid_price: f64,
    pub min_bid_volume: i64,
    pub min_trading_days: i64,
    pub max_trading_days: i64,
}

impl Default for OptionSelectorConfig {
    fn default() -> Self {
        Self {
            strike_level: 0,
            min_bid_price: 0.0,
            min_bid_volume: 0,
            min_trading_days: 0,
            max_trading_days: i64::MAX,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OptionSelectorService {
    config: OptionSelectorConfig,
}

impl OptionSelectorService {
    pub fn new(config: OptionSelectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptionSelectorConfig {
        &self.config
    }

    /// Filters `chain` to `option_type`, applies the liquidity and expiry
    /// window filters, keeps only strictly out-of-the-money rows and
    /// returns the one at `strike_level` in nearest-first order (or the
    /// deepest OTM row if fewer are available).
    pub fn select(&self, chain: &[OptionContract], option_type: OptionType, underlying_price: f64) -> Option<OptionContract> {
        if underlying_price <= 0.0 {
            return None;
        }

        let mut candidates: Vec<(f64, &OptionContract)> = chain
            .iter()
            .filter(|c| c.option_type == option_type)
            .filter(|c| c.bid_price >= self.config.min_bid_price && c.bid_volume >= self.config.min_bid_volume)
            .filter(|c| c.days_to_expiry >= self.config.min_trading_days && c.days_to_expiry <= self.config.max_trading_days)
            .filter_map(|c| {
                let distance = otm_distance(c, option_type, underlying_price);
                (distance > 0.0).then_some((distance, c))
            })
            .collect();

        if candidates.is_empty() {
            return None;
        }

        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let idx = self.config.strike_level.min(candidates.len() - 1);
        Some(candidates[idx].1.clone())
    }

    /// Additional pre-trade liquidity gate against a live top-of-book tick,
    /// independent of the static chain snapshot consulted by `select`.
    pub fn check_liquidity(
        &self,
        tick: &MarketTick,
        contract: &OptionContract,
        volume_threshold: i64,
        bid_threshold: i64,
        max_spread_ticks: f64,
        pricetick: f64,
    ) -> bool {
        if pricetick <= 0.0 {
            return false;
        }
        if tick.volume < volume_threshold || tick.bid_volume_1 < bid_threshold {
            return false;
        }
        let _ = contract;
        (tick.ask_price - tick.bid_price) / pricetick < max_spread_ticks
    }
}

fn otm_distance(contract: &OptionContract, option_type: OptionType, underlying_price: f64) -> f64 {
    match option_type {
        OptionType::Call => (contract.strike_price - underlying_price) / underlying_price,
        OptionType::Put => (underlying_price - contract.strike_price) / underlying_price,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(strike: f64, bid_price: f64, bid_volume: i64, days: i64) -> OptionContract {
        OptionContract {
            vt_symbol: format!("IO2501-C-{strike}.CFFEX"),
            underlying_symbol: "IF2501".into(),
            option_type: OptionType::Call,
            strike_price: strike,
            expiry_date: "2025-01-17".into(),
            diff1: 0.0,
            bid_price,
            bid_volume,
            ask_price: bid_price + 1.0,
            ask_volume: bid_volume,
            days_to_expiry: days,
        }
    }

    #[test]
    fn picks_nearest_otm_strike_at_level_zero() {
        let svc = OptionSelectorService::new(OptionSelectorConfig { strike_level: 0, ..Default::default() });
        let chain = vec![call(4100.0, 10.0, 5, 20), call(4200.0, 8.0, 5, 20), call(3900.0, 20.0, 5, 20)];
        let selected = svc.select(&chain, OptionType::Call, 4000.0).unwrap();
        assert!((selected.strike_price - 4100.0).abs() < 1e-9);
    }

    #[test]
    fn strike_level_beyond_range_clamps_to_deepest() {
        let svc = OptionSelectorService::new(OptionSelectorConfig { strike_level: 10, ..Default::default() });
        let chain = vec![call(4100.0, 10.0, 5, 20), call(4200.0, 8.0, 5, 20)];
        let selected = svc.select(&chain, OptionType::Call, 4000.0).unwrap();
        assert!((selected.strike_price - 4200.0).abs() < 1e-9);
    }

    #[test]
    fn in_the_money_rows_are_excluded() {
        let svc = OptionSelectorService::new(OptionSelectorConfig::default());
        let chain = vec![call(3900.0, 20.0, 5, 20)];
        assert!(svc.select(&chain, OptionType::Call, 4000.0).is_none());
    }

    #[test]
    fn illiquid_rows_are_excluded() {
        let svc = OptionSelectorService::new(OptionSelectorConfig { min_bid_price: 5.0, min_bid_volume: 10, ..Default::default() });
        let chain = vec![call(4100.0, 2.0, 1, 20)];
        assert!(svc.select(&chain, OptionType::Call, 4000.0).is_none());
    }

    #[test]
    fn liquidity_gate_checks_spread_and_volume() {
        let svc = OptionSelectorService::new(OptionSelectorConfig::default());
        let tick = MarketTick { bid_price: 10.0, bid_volume_1: 20, ask_price: 10.4, volume: 100 };
        let contract = call(4100.0, 10.0, 20, 20);
        assert!(svc.check_liquidity(&tick, &contract, 50, 10, 5.0, 0.2));
        assert!(!svc.check_liquidity(&tick, &contract, 500, 10, 5.0, 0.2));
    }
}
