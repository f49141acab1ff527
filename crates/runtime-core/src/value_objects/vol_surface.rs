//! Volatility surface value objects.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single market-observed implied volatility quote.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolQuote {
    pub strike: f64,
    pub time_to_expiry: f64,
    pub implied_vol: f64,
}

/// A built volatility surface: a grid of strikes x expiries, each cell
/// holding an implied vol (0.0 where no quote was observed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSurfaceSnapshot {
    pub strikes: Vec<f64>,
    pub expiries: Vec<f64>,
    /// Row-major: `vol_matrix[expiry_idx][strike_idx]`.
    pub vol_matrix: Vec<Vec<f64>>,
    pub timestamp: DateTime<Utc>,
}

/// Result of a bilinear-interpolated query against a [`VolSurfaceSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolQueryResult {
    pub success: bool,
    pub implied_vol: f64,
    pub error: Option<String>,
}

impl VolQueryResult {
    pub fn ok(implied_vol: f64) -> Self {
        Self { success: true, implied_vol, error: None }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self { success: false, implied_vol: 0.0, error: Some(error.into()) }
    }
}

/// Implied vol smile at a fixed time-to-expiry, across strikes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolSmile {
    pub time_to_expiry: f64,
    pub strikes: Vec<f64>,
    pub vols: Vec<f64>,
}

/// Implied vol term structure at a fixed strike, across expiries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermStructure {
    pub strike: f64,
    pub expiries: Vec<f64>,
    pub vols: Vec<f64>,
}
