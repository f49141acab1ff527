//! Portfolio and position-level Greeks risk limits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::greeks::GreeksResult;

/// Absolute limits checked by [`crate::domain_service::portfolio_risk_aggregator::PortfolioRiskAggregator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub position_delta_limit: f64,
    pub position_gamma_limit: f64,
    pub position_vega_limit: f64,
    pub portfolio_delta_limit: f64,
    pub portfolio_gamma_limit: f64,
    pub portfolio_vega_limit: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            position_delta_limit: 50.0,
            position_gamma_limit: 10.0,
            position_vega_limit: 500.0,
            portfolio_delta_limit: 200.0,
            portfolio_gamma_limit: 40.0,
            portfolio_vega_limit: 2000.0,
        }
    }
}

/// Outcome of a pre-trade Greeks risk check for a single position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskCheckResult {
    pub passed: bool,
    pub reject_reason: Option<String>,
}

impl RiskCheckResult {
    pub fn pass() -> Self {
        Self { passed: true, reject_reason: None }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self { passed: false, reject_reason: Some(reason.into()) }
    }
}

/// A single active position's contribution to portfolio Greeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionGreeksEntry {
    pub greeks: GreeksResult,
    pub volume: i64,
    pub multiplier: f64,
}

/// Weighted sum of all active positions' Greeks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PortfolioGreeks {
    pub total_delta: f64,
    pub total_gamma: f64,
    pub total_theta: f64,
    pub total_vega: f64,
    pub position_count: usize,
    pub timestamp: DateTime<Utc>,
}
