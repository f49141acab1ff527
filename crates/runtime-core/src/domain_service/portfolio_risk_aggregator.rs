//! Pre-trade per-position Greeks limits and portfolio-level Greeks
//! aggregation with threshold-breach event emission.

use chrono::Utc;

use crate::events::{DomainEvent, GreekName, RiskLevel};
use crate::value_objects::{GreeksResult, PortfolioGreeks, PositionGreeksEntry, RiskCheckResult, RiskThresholds};

#[derive(Debug, Clone)]
pub struct PortfolioRiskAggregator {
    thresholds: RiskThresholds,
}

impl PortfolioRiskAggregator {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RiskThresholds {
        &self.thresholds
    }

    /// Checks whether `|greek * volume * multiplier|` exceeds the
    /// per-position limits, in delta/gamma/vega order; the first breach
    /// wins.
    pub fn check_position_risk(&self, greeks: &GreeksResult, volume: i64, multiplier: f64) -> RiskCheckResult {
        let weighted_delta = (greeks.delta * volume as f64 * multiplier).abs();
        let weighted_gamma = (greeks.gamma * volume as f64 * multiplier).abs();
        let weighted_vega = (greeks.vega * volume as f64 * multiplier).abs();

        if weighted_delta > self.thresholds.position_delta_limit {
            return RiskCheckResult::reject(format!(
                "delta risk exceeded: |{weighted_delta:.4}| > {}",
                self.thresholds.position_delta_limit
            ));
        }
        if weighted_gamma > self.thresholds.position_gamma_limit {
            return RiskCheckResult::reject(format!(
                "gamma risk exceeded: |{weighted_gamma:.4}| > {}",
                self.thresholds.position_gamma_limit
            ));
        }
        if weighted_vega > self.thresholds.position_vega_limit {
            return RiskCheckResult::reject(format!(
                "vega risk exceeded: |{weighted_vega:.4}| > {}",
                self.thresholds.position_vega_limit
            ));
        }

        RiskCheckResult::pass()
    }

    pub fn aggregate_portfolio_greeks(&self, positions: &[PositionGreeksEntry]) -> (PortfolioGreeks, Vec<DomainEvent>) {
        let mut total_delta = 0.0;
        let mut total_gamma = 0.0;
        let mut total_theta = 0.0;
        let mut total_vega = 0.0;

        for entry in positions {
            let weight = entry.volume as f64 * entry.multiplier;
            total_delta += entry.greeks.delta * weight;
            total_gamma += entry.greeks.gamma * weight;
            total_theta += entry.greeks.theta * weight;
            total_vega += entry.greeks.vega * weight;
        }

        let snapshot = PortfolioGreeks {
            total_delta,
            total_gamma,
            total_theta,
            total_vega,
            position_count: positions.len(),
            timestamp: Utc::now(),
        };

        let mut events = Vec::new();

        if total_delta.abs() > self.thresholds.portfolio_delta_limit {
            events.push(DomainEvent::GreeksRiskBreach {
                level: RiskLevel::Portfolio,
                greek_name: GreekName::Delta,
                current_value: total_delta,
                limit_value: self.thresholds.portfolio_delta_limit,
            });
        }
        if total_gamma.abs() > self.thresholds.portfolio_gamma_limit {
            events.push(DomainEvent::GreeksRiskBreach {
                level: RiskLevel::Portfolio,
                greek_name: GreekName::Gamma,
                current_value: total_gamma,
                limit_value: self.thresholds.portfolio_gamma_limit,
            });
        }
        if total_vega.abs() > self.thresholds.portfolio_vega_limit {
            events.push(DomainEvent::GreeksRiskBreach {
                level: RiskLevel::Portfolio,
                greek_name: GreekName::Vega,
                current_value: total_vega,
                limit_value: self.thresholds.portfolio_vega_limit,
            });
        }

        (snapshot, events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(delta: f64, gamma: f64, vega: f64, volume: i64) -> PositionGreeksEntry {
        PositionGreeksEntry {
            greeks: GreeksResult::ok(delta, gamma, 0.0, vega),
            volume,
            multiplier: 1.0,
        }
    }

    #[test]
    fn position_risk_passes_within_limits() {
        let agg = PortfolioRiskAggregator::new(RiskThresholds::default());
        let greeks = GreeksResult::ok(0.5, 0.01, -0.02, 5.0);
        let result = agg.check_position_risk(&greeks, 4, 10.0);
        assert!(result.passed);
    }

    #[test]
    fn position_risk_rejects_delta_breach() {
        let agg = PortfolioRiskAggregator::new(RiskThresholds::default());
        let greeks = GreeksResult::ok(0.9, 0.01, -0.02, 5.0);
        let result = agg.check_position_risk(&greeks, 100, 10.0);
        assert!(!result.passed);
        assert!(result.reject_reason.unwrap().contains("delta"));
    }

    #[test]
    fn portfolio_aggregation_emits_breach_on_limit_exceeded() {
        let agg = PortfolioRiskAggregator::new(RiskThresholds::default());
        let positions = vec![entry(5.0, 1.0, 50.0, 50), entry(-1.0, 0.5, 10.0, 20)];
        let (snapshot, events) = agg.aggregate_portfolio_greeks(&positions);
        assert_eq!(snapshot.position_count, 2);
        assert!(events.iter().any(|e| matches!(
            e,
            DomainEvent::GreeksRiskBreach { greek_name: GreekName::Delta, .. }
        )));
    }

    #[test]
    fn empty_portfolio_has_zero_greeks_and_no_events() {
        let agg = PortfolioRiskAggregator::new(RiskThresholds::default());
        let (snapshot, events) = agg.aggregate_portfolio_greeks(&[]);
        assert_eq!(snapshot.total_delta, 0.0);
        assert!(events.is_empty());
    }
}
