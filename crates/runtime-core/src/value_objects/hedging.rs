//! Configuration and results for delta-hedging and gamma-scalping.

use serde::{Deserialize, Serialize};

use super::order_instruction::{Direction, OrderInstruction};

/// Configuration for [`crate::domain_service::delta_hedging_engine::DeltaHedgingEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgingConfig {
    pub target_delta: f64,
    /// Tolerance band; no hedge is generated while `|delta - target| <= band`.
    pub hedging_band: f64,
    pub hedge_instrument_vt_symbol: String,
    pub hedge_instrument_delta: f64,
    pub hedge_instrument_multiplier: f64,
}

impl Default for HedgingConfig {
    fn default() -> Self {
        Self {
            target_delta: 0.0,
            hedging_band: 10.0,
            hedge_instrument_vt_symbol: String::new(),
            hedge_instrument_delta: 1.0,
            hedge_instrument_multiplier: 1.0,
        }
    }
}

/// Outcome of a [`crate::domain_service::delta_hedging_engine::DeltaHedgingEngine::check_and_hedge`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HedgeResult {
    pub should_hedge: bool,
    pub hedge_volume: i64,
    pub hedge_direction: Option<Direction>,
    pub instruction: Option<OrderInstruction>,
    pub reason: String,
}

impl HedgeResult {
    pub fn no_hedge(reason: impl Into<String>) -> Self {
        Self {
            should_hedge: false,
            hedge_volume: 0,
            hedge_direction: None,
            instruction: None,
            reason: reason.into(),
        }
    }
}

/// Configuration for [`crate::domain_service::gamma_scalping_engine::GammaScalpingEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GammaScalpConfig {
    pub rebalance_threshold: f64,
    pub hedge_instrument_vt_symbol: String,
    pub hedge_instrument_delta: f64,
    pub hedge_instrument_multiplier: f64,
}

impl Default for GammaScalpConfig {
    fn default() -> Self {
        Self {
            rebalance_threshold: 20.0,
            hedge_instrument_vt_symbol: String::new(),
            hedge_instrument_delta: 1.0,
            hedge_instrument_multiplier: 1.0,
        }
    }
}

/// Outcome of a [`crate::domain_service::gamma_scalping_engine::GammaScalpingEngine::check_and_rebalance`] call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalpResult {
    pub should_rebalance: bool,
    pub rejected: bool,
    pub reject_reason: Option<String>,
    pub rebalance_volume: i64,
    pub rebalance_direction: Option<Direction>,
    pub instruction: Option<OrderInstruction>,
}

impl ScalpResult {
    pub fn no_rebalance() -> Self {
        Self {
            should_rebalance: false,
            rejected: false,
            reject_reason: None,
            rebalance_volume: 0,
            rebalance_direction: None,
            instruction: None,
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            should_rebalance: false,
            rejected: true,
            reject_reason: Some(reason.into()),
            rebalance_volume: 0,
            rebalance_direction: None,
            instruction: None,
        }
    }
}
