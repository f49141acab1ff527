//! Monitors portfolio delta exposure and generates a hedge instruction once
//! it drifts outside the configured tolerance band.

use crate::events::DomainEvent;
use crate::value_objects::{Direction, HedgeResult, HedgingConfig, Offset, OrderInstruction, PortfolioGreeks};

#[derive(Debug, Clone)]
pub struct DeltaHedgingEngine {
    config: HedgingConfig,
}

impl DeltaHedgingEngine {
    pub fn new(config: HedgingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HedgingConfig {
        &self.config
    }

    pub fn check_and_hedge(
        &self,
        portfolio_greeks: &PortfolioGreeks,
        current_price: f64,
    ) -> (HedgeResult, Vec<DomainEvent>) {
        let cfg = &self.config;

        if cfg.hedge_instrument_multiplier <= 0.0 {
            return (HedgeResult::no_hedge("invalid config: contract multiplier <= 0"), vec![]);
        }
        if cfg.hedge_instrument_delta == 0.0 {
            return (HedgeResult::no_hedge("hedge instrument delta is zero"), vec![]);
        }
        if current_price <= 0.0 {
            return (HedgeResult::no_hedge("current price <= 0"), vec![]);
        }

        let delta_diff = portfolio_greeks.total_delta - cfg.target_delta;
        if delta_diff.abs() <= cfg.hedging_band {
            return (HedgeResult::no_hedge("delta drift within tolerance band"), vec![]);
        }

        let raw_volume =
            (cfg.target_delta - portfolio_greeks.total_delta) / (cfg.hedge_instrument_delta * cfg.hedge_instrument_multiplier);
        let hedge_volume = raw_volume.round() as i64;

        if hedge_volume == 0 {
            return (HedgeResult::no_hedge("hedge volume rounds to zero"), vec![]);
        }

        let (direction, hedge_volume) = if hedge_volume > 0 {
            (Direction::Long, hedge_volume)
        } else {
            (Direction::Short, hedge_volume.abs())
        };

        let instruction = OrderInstruction::new(
            cfg.hedge_instrument_vt_symbol.clone(),
            direction,
            Offset::Open,
            hedge_volume,
        )
        .with_price(current_price)
        .with_signal("delta_hedge");

        let result = HedgeResult {
            should_hedge: true,
            hedge_volume,
            hedge_direction: Some(direction),
            instruction: Some(instruction),
            reason: format!("delta drift {:.4} exceeds band {}", delta_diff, cfg.hedging_band),
        };

        let sign = if direction == Direction::Long { 1.0 } else { -1.0 };
        let expected_delta_after = portfolio_greeks.total_delta
            + hedge_volume as f64 * cfg.hedge_instrument_delta * cfg.hedge_instrument_multiplier * sign;

        let event = DomainEvent::HedgeExecuted {
            hedge_volume,
            hedge_direction: direction,
            portfolio_delta_before: portfolio_greeks.total_delta,
            portfolio_delta_after: expected_delta_after,
            hedge_instrument: cfg.hedge_instrument_vt_symbol.clone(),
        };

        (result, vec![event])
    }
}
