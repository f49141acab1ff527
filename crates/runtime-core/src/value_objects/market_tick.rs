//! Minimal top-of-book snapshot consulted by liquidity gates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    pub bid_price: f64,
    pub bid_volume_1: i64,
    pub ask_price: f64,
    pub volume: i64,
}
