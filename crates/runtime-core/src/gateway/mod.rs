//! Demand interfaces the core needs from an external trading gateway.
//!
//! The core never talks to an exchange API directly — it depends on these
//! four trait boundaries, implemented once per real gateway and once by
//! [`backtest`] for deterministic replay. The traits are deliberately
//! narrow: only the calls the pipeline actually issues.

pub mod backtest;

use crate::value_objects::{ContractParams, OptionContract, OrderInstruction, PositionDirection, PositionSnapshot, QuoteRequest};
use crate::Result;

/// Market data: quote subscription and contract metadata.
pub trait MarketDataGateway {
    fn subscribe(&mut self, vt_symbol: &str) -> Result<()>;
    fn get_tick(&self, vt_symbol: &str) -> Option<MarketTickView>;
    fn get_contract(&self, vt_symbol: &str) -> Option<ContractParams>;
    fn get_all_contracts(&self) -> Vec<ContractParams>;

    /// The live option chain quoted against one underlying. Not every
    /// deployment needs this (a pure futures strategy never calls it), so
    /// it defaults to empty rather than forcing every implementer to stub it.
    fn option_chain(&self, _underlying_vt_symbol: &str) -> Vec<OptionContract> {
        Vec::new()
    }
}

/// Top-of-book view returned by a market data gateway.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTickView {
    pub bid_price: f64,
    pub bid_volume: i64,
    pub ask_price: f64,
    pub ask_volume: i64,
    pub last_price: f64,
    pub volume: i64,
}

/// Account balance and position reporting.
pub trait AccountGateway {
    fn get_balance(&self) -> Result<f64>;
    fn get_position(&self, vt_symbol: &str, direction: PositionDirection) -> Option<PositionSnapshot>;
    fn get_all_positions(&self) -> Vec<PositionSnapshot>;
}

/// Order submission and cancellation. A single instruction may fan out into
/// more than one exchange order (e.g. a strangle's two legs submitted
/// together), hence the `Vec` return.
pub trait TradeExecutionGateway {
    fn send_order(&mut self, instruction: &OrderInstruction) -> Result<Vec<String>>;
    fn cancel_order(&mut self, vt_orderid: &str) -> Result<()>;
    fn cancel_all_orders(&mut self) -> Result<()>;
}

/// Market-making quote submission. Optional: not every deployment needs it.
pub trait QuoteGateway {
    fn send_quote(&mut self, request: &QuoteRequest) -> Result<String>;
    fn cancel_quote(&mut self, vt_quoteid: &str) -> Result<()>;
    fn all_quotes(&self) -> Vec<String>;
}
