//! Inputs and outputs for Black-Scholes Greeks calculations.

use serde::{Deserialize, Serialize};

use super::contract::OptionType;

/// Inputs to the Black-Scholes model, annualized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksInput {
    pub spot_price: f64,
    pub strike_price: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
    pub risk_free_rate: f64,
    pub volatility: f64,
    pub option_type: OptionType,
}

/// Calculated Greeks, or a failure reason if the inputs were invalid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub success: bool,
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub error: Option<GreeksError>,
}

/// Why a Greeks calculation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreeksError {
    NonPositivePrice,
    NegativeTimeToExpiry,
    NonPositiveVolatility,
    NumericOverflow,
}

impl GreeksResult {
    pub fn ok(delta: f64, gamma: f64, theta: f64, vega: f64) -> Self {
        Self {
            success: true,
            delta,
            gamma,
            theta,
            vega,
            error: None,
        }
    }

    pub fn err(error: GreeksError) -> Self {
        Self {
            success: false,
            delta: 0.0,
            gamma: 0.0,
            theta: 0.0,
            vega: 0.0,
            error: Some(error),
        }
    }
}

/// Result of a Newton-Raphson (with bisection fallback) implied volatility
/// search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IvResult {
    pub success: bool,
    pub implied_volatility: f64,
    pub iterations: u32,
    pub error: Option<IvError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IvError {
    NonPositiveMarketPrice,
    BelowIntrinsicValue,
    NotConverged,
}

impl IvResult {
    pub fn ok(implied_volatility: f64, iterations: u32) -> Self {
        Self {
            success: true,
            implied_volatility,
            iterations,
            error: None,
        }
    }

    pub fn err(error: IvError, iterations: u32) -> Self {
        Self {
            success: false,
            implied_volatility: 0.0,
            iterations,
            error: Some(error),
        }
    }
}
