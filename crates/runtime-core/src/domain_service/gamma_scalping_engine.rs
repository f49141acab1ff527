//! Rebalances toward zero delta while a portfolio holds positive gamma.

use crate::events::DomainEvent;
use crate::value_objects::{Direction, GammaScalpConfig, Offset, OrderInstruction, PortfolioGreeks, ScalpResult};

#[derive(Debug, Clone)]
pub struct GammaScalpingEngine {
    config: GammaScalpConfig,
}

impl GammaScalpingEngine {
    pub fn new(config: GammaScalpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GammaScalpConfig {
        &self.config
    }

    pub fn check_and_rebalance(
        &self,
        portfolio_greeks: &PortfolioGreeks,
        current_price: f64,
    ) -> (ScalpResult, Vec<DomainEvent>) {
        let cfg = &self.config;

        if portfolio_greeks.total_gamma <= 0.0 {
            return (ScalpResult::reject("portfolio gamma is not positive"), vec![]);
        }
        if cfg.hedge_instrument_multiplier <= 0.0 {
            return (ScalpResult::reject("invalid config: contract multiplier <= 0"), vec![]);
        }
        if cfg.hedge_instrument_delta == 0.0 {
            return (ScalpResult::reject("hedge instrument delta is zero"), vec![]);
        }
        if current_price <= 0.0 {
            return (ScalpResult::reject("current price <= 0"), vec![]);
        }

        let portfolio_delta = portfolio_greeks.total_delta;
        if portfolio_delta.abs() <= cfg.rebalance_threshold {
            return (ScalpResult::no_rebalance(), vec![]);
        }

        let raw_volume = -portfolio_delta / (cfg.hedge_instrument_delta * cfg.hedge_instrument_multiplier);
        let rebalance_volume = raw_volume.round() as i64;

        if rebalance_volume == 0 {
            return (ScalpResult::no_rebalance(), vec![]);
        }

        let (direction, rebalance_volume) = if rebalance_volume > 0 {
            (Direction::Long, rebalance_volume)
        } else {
            (Direction::Short, rebalance_volume.abs())
        };

        let instruction = OrderInstruction::new(
            cfg.hedge_instrument_vt_symbol.clone(),
            direction,
            Offset::Open,
            rebalance_volume,
        )
        .with_price(current_price)
        .with_signal("gamma_scalp");

        let result = ScalpResult {
            should_rebalance: true,
            rejected: false,
            reject_reason: None,
            rebalance_volume,
            rebalance_direction: Some(direction),
            instruction: Some(instruction),
        };

        let event = DomainEvent::GammaScalpExecuted {
            rebalance_volume,
            rebalance_direction: direction,
            portfolio_delta_before: portfolio_delta,
            portfolio_gamma: portfolio_greeks.total_gamma,
            hedge_instrument: cfg.hedge_instrument_vt_symbol.clone(),
        };

        (result, vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn greeks(total_delta: f64, total_gamma: f64) -> PortfolioGreeks {
        PortfolioGreeks {
            total_delta,
            total_gamma,
            total_theta: 0.0,
            total_vega: 0.0,
            position_count: 1,
            timestamp: Utc::now(),
        }
    }

    fn config() -> GammaScalpConfig {
        GammaScalpConfig {
            rebalance_threshold: 20.0,
            hedge_instrument_vt_symbol: "IF2501.CFFEX".into(),
            hedge_instrument_delta: 1.0,
            hedge_instrument_multiplier: 300.0,
        }
    }

    #[test]
    fn negative_gamma_rejects() {
        let engine = GammaScalpingEngine::new(config());
        let (result, events) = engine.check_and_rebalance(&greeks(50.0, -1.0), 4000.0);
        assert!(result.rejected);
        assert!(events.is_empty());
    }

    #[test]
    fn within_threshold_does_not_rebalance() {
        let engine = GammaScalpingEngine::new(config());
        let (result, events) = engine.check_and_rebalance(&greeks(10.0, 5.0), 4000.0);
        assert!(!result.should_rebalance);
        assert!(!result.rejected);
        assert!(events.is_empty());
    }

    #[test]
    fn beyond_threshold_rebalances_toward_zero() {
        let engine = GammaScalpingEngine::new(config());
        let (result, events) = engine.check_and_rebalance(&greeks(900.0, 5.0), 4000.0);
        assert!(result.should_rebalance);
        assert_eq!(result.rebalance_direction, Some(Direction::Short));
        assert_eq!(result.rebalance_volume, 3);
        assert_eq!(events.len(), 1);
    }
}
