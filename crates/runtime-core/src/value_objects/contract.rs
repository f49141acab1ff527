//! Contract and account value objects sourced from the gateway.
//!
//! These mirror the trade-relevant subset of an exchange's contract and
//! account data, trimmed to what the strategy layer actually consults
//! before sizing and submitting orders.

use serde::{Deserialize, Serialize};

/// Trading parameters for a single contract, used to validate and round
/// orders before they are handed to a gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractParams {
    pub vt_symbol: String,
    pub size: f64,
    pub pricetick: f64,
    pub min_volume: f64,
    pub max_volume: Option<f64>,
    pub stop_supported: bool,
    pub net_position: bool,
}

impl ContractParams {
    pub fn new(vt_symbol: impl Into<String>, size: f64, pricetick: f64) -> Self {
        Self {
            vt_symbol: vt_symbol.into(),
            size,
            pricetick,
            min_volume: 1.0,
            max_volume: None,
            stop_supported: false,
            net_position: false,
        }
    }

    /// Rounds a price to the nearest valid tick.
    pub fn round_price(&self, price: f64) -> f64 {
        if self.pricetick <= 0.0 {
            return price;
        }
        (price / self.pricetick).round() * self.pricetick
    }

    pub fn is_valid_volume(&self, volume: f64) -> bool {
        if volume < self.min_volume {
            return false;
        }
        if let Some(max) = self.max_volume {
            if volume > max {
                return false;
            }
        }
        true
    }
}

/// Option type discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Call,
    Put,
}

/// A single listed option contract as surfaced by the option chain, along
/// with enough top-of-book data for the selection services to rank it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub vt_symbol: String,
    pub underlying_symbol: String,
    pub option_type: OptionType,
    pub strike_price: f64,
    pub expiry_date: String,
    /// Distance between strike and underlying price; used to rank
    /// nearest-the-money contracts (see `OptionSelectorService`).
    pub diff1: f64,
    pub bid_price: f64,
    pub bid_volume: i64,
    pub ask_price: f64,
    pub ask_volume: i64,
    pub days_to_expiry: i64,
}

/// Immutable snapshot of the trading account's capital usage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balance: f64,
    pub available: f64,
    pub frozen: f64,
}

impl AccountSnapshot {
    pub fn new(balance: f64, available: f64) -> Self {
        Self {
            balance,
            available,
            frozen: 0.0,
        }
    }

    pub fn used(&self) -> f64 {
        (self.balance - self.available).max(0.0)
    }

    pub fn usage_ratio(&self) -> f64 {
        if self.balance <= 0.0 {
            return 0.0;
        }
        self.used() / self.balance
    }
}

/// Holding direction as reported by the account/position gateway. Distinct
/// from [`crate::value_objects::order_instruction::Direction`]: a gateway
/// position can be reported net rather than split long/short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionDirection {
    Long,
    Short,
    Net,
}

/// Immutable snapshot of a gateway-reported position, used to reconcile
/// against the strategy's own bookkeeping in [`crate::aggregates::PositionAggregate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub vt_symbol: String,
    pub direction: PositionDirection,
    pub volume: f64,
    pub frozen: f64,
    pub price: f64,
    pub pnl: f64,
    pub yd_volume: f64,
}

impl PositionSnapshot {
    pub fn available(&self) -> f64 {
        (self.volume - self.frozen).max(0.0)
    }

    pub fn today_volume(&self) -> f64 {
        (self.volume - self.yd_volume).max(0.0)
    }

    pub fn is_long(&self) -> bool {
        self.direction == PositionDirection::Long
    }

    pub fn is_short(&self) -> bool {
        self.direction == PositionDirection::Short
    }
}

/// A two-sided quote request for market-making style execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub vt_symbol: String,
    pub bid_price: f64,
    pub bid_volume: i64,
    pub ask_price: f64,
    pub ask_volume: i64,
    pub reference: String,
}

impl QuoteRequest {
    pub fn spread(&self) -> f64 {
        self.ask_price - self.bid_price
    }

    pub fn mid_price(&self) -> f64 {
        (self.bid_price + self.ask_price) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_price_snaps_to_tick() {
        let params = ContractParams::new("IO2501-C-4000.CFFEX", 100.0, 0.2);
        assert!((params.round_price(125.05) - 125.0).abs() < 1e-9);
    }

    #[test]
    fn volume_bounds_are_enforced() {
        let mut params = ContractParams::new("rb2501.SHFE", 10.0, 1.0);
        params.max_volume = Some(5.0);
        assert!(params.is_valid_volume(3.0));
        assert!(!params.is_valid_volume(6.0));
        assert!(!params.is_valid_volume(0.5));
    }

    #[test]
    fn account_usage_ratio() {
        let acct = AccountSnapshot::new(100_000.0, 60_000.0);
        assert!((acct.used() - 40_000.0).abs() < 1e-9);
        assert!((acct.usage_ratio() - 0.4).abs() < 1e-9);
    }

    #[test]
    fn quote_request_spread_and_mid() {
        let q = QuoteRequest {
            vt_symbol: "IO2501-C-4000.CFFEX".into(),
            bid_price: 120.0,
            bid_volume: 2,
            ask_price: 124.0,
            ask_volume: 2,
            reference: "mm".into(),
        };
        assert!((q.spread() - 4.0).abs() < 1e-9);
        assert!((q.mid_price() - 122.0).abs() < 1e-9);
    }
}
