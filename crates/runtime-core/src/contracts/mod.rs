//! Gateway-boundary DTOs: the raw callback payload shapes a trading gateway
//! reports back to the pipeline, before anything in the aggregates has
//! interpreted them.
//!
//! These are intentionally thinner and more "stringly typed" than
//! [`crate::aggregates::position_aggregate::OrderUpdate`] and friends — a
//! gateway reports whatever vocabulary the exchange API hands it back, and
//! `on_order`/`on_trade`/`on_position` translate that into the aggregate's
//! own update types before calling `update_from_order` etc.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::contract::PositionDirection;
use crate::value_objects::order_instruction::{Direction, Offset};

/// Raw order-report callback payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderData {
    pub vt_orderid: String,
    pub vt_symbol: String,
    pub direction: Direction,
    pub offset: Offset,
    pub volume: i64,
    pub traded: i64,
    pub price: f64,
    pub status: String,
    pub datetime: DateTime<Utc>,
}

/// Raw trade-report callback payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeData {
    pub vt_tradeid: String,
    pub vt_orderid: String,
    pub vt_symbol: String,
    pub direction: Direction,
    pub offset: Offset,
    pub volume: i64,
    pub price: f64,
    pub datetime: DateTime<Utc>,
}

/// Raw position-report callback payload (the exchange's view, reconciled
/// against the strategy's own `Position` by `update_from_position`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionData {
    pub vt_symbol: String,
    pub direction: PositionDirection,
    pub volume: f64,
    pub yd_volume: f64,
    pub price: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_data_round_trips_through_json() {
        let order = OrderData {
            vt_orderid: "o1".to_string(),
            vt_symbol: "rb2501.SHFE".to_string(),
            direction: Direction::Long,
            offset: Offset::Open,
            volume: 2,
            traded: 0,
            price: 3500.0,
            status: "NOTTRADED".to_string(),
            datetime: Utc::now(),
        };
        let json = serde_json::to_string(&order).unwrap();
        let back: OrderData = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
