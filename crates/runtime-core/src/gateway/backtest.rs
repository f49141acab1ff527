//! Backtest substitutes for the four gateway traits: a contract registry
//! seeded from [`crate::domain_service::ContractFactory`], a tick
//! synthesizer that fabricates a two-sided quote from the latest bar close
//! with liquidity generous enough to pass the selection services' gates,
//! and a simulated execution path that fills every order immediately at
//! its requested price and emits the matching order/trade callbacks.

use std::collections::HashMap;

use chrono::Utc;

use super::{AccountGateway, MarketDataGateway, MarketTickView, QuoteGateway, TradeExecutionGateway};
use crate::contracts::{OrderData, TradeData};
use crate::domain_service::contract_factory::ContractFactory;
use crate::error::RuntimeError;
use crate::value_objects::contract_meta::ParsedSymbol;
use crate::value_objects::{ContractParams, OptionContract, OrderInstruction, PositionDirection, PositionSnapshot, QuoteRequest};
use crate::Result;

/// Volume fabricated on both sides of a synthesized tick. Generous enough
/// that `OptionSelectorService::check_liquidity`'s default thresholds never
/// reject a backtest quote for lack of depth.
const SYNTHETIC_BOOK_VOLUME: i64 = 1_000;

/// A minimal simulated gateway: orders fill in full, immediately, at their
/// submitted price (or the latest known price for a market order).
#[derive(Debug, Default)]
pub struct BacktestGateway {
    contracts: HashMap<String, ContractParams>,
    latest_price: HashMap<String, f64>,
    positions: HashMap<(String, PositionDirection), PositionSnapshot>,
    balance: f64,
    subscribed: Vec<String>,
    next_order_seq: u64,
    pending_callbacks: Vec<Callback>,
    quotes: Vec<String>,
    option_chains: HashMap<String, Vec<OptionContract>>,
}

#[derive(Debug, Clone)]
enum Callback {
    Order(OrderData),
    Trade(TradeData),
}

impl BacktestGateway {
    pub fn new(starting_balance: f64) -> Self {
        Self { balance: starting_balance, ..Default::default() }
    }

    /// Registers a contract's trading parameters, deriving the default
    /// `pricetick`/`size` from the caller if the symbol was never seen
    /// before. Call this once per symbol the strategy will ever quote.
    pub fn register_contract(&mut self, vt_symbol: impl Into<String>, size: f64, pricetick: f64) {
        let vt_symbol = vt_symbol.into();
        self.contracts.insert(vt_symbol.clone(), ContractParams::new(vt_symbol, size, pricetick));
    }

    /// Seeds (or refreshes) the registry entry for `vt_symbol` purely from
    /// its parsed symbol shape, for callers that only care that the
    /// contract is resolvable, not its tick size.
    pub fn seed_from_factory(&mut self, vt_symbol: &str, size: f64, pricetick: f64) -> Result<()> {
        let _: ParsedSymbol = ContractFactory::new().create(vt_symbol);
        self.register_contract(vt_symbol, size, pricetick);
        Ok(())
    }

    /// Updates the latest traded price used to synthesize ticks and fill
    /// market orders. Called by the pipeline once per bar.
    pub fn on_bar_close(&mut self, vt_symbol: &str, close: f64) {
        self.latest_price.insert(vt_symbol.to_string(), close);
    }

    pub fn set_balance(&mut self, balance: f64) {
        self.balance = balance;
    }

    /// Replaces the quoted option chain for one underlying. A backtest
    /// driver refreshes this from its historical option-tick feed once per
    /// bar (or session); there is no synthesis here, unlike the futures
    /// tick fabrication above, since strike/expiry shape cannot be derived
    /// from an underlying close alone.
    pub fn set_option_chain(&mut self, underlying_vt_symbol: impl Into<String>, chain: Vec<OptionContract>) {
        self.option_chains.insert(underlying_vt_symbol.into(), chain);
    }

    /// Drains and returns the order/trade callbacks accumulated since the
    /// last drain, in emission order, split into their two channels (a
    /// simulated gateway emits both for the same fill back to back, in
    /// order, just as a real one would).
    pub fn drain_callbacks(&mut self) -> (Vec<OrderData>, Vec<TradeData>) {
        let mut orders = Vec::new();
        let mut trades = Vec::new();
        for cb in self.pending_callbacks.drain(..) {
            match cb {
                Callback::Order(o) => orders.push(o),
                Callback::Trade(t) => trades.push(t),
            }
        }
        (orders, trades)
    }

    fn next_orderid(&mut self) -> String {
        self.next_order_seq += 1;
        format!("bt-{}", self.next_order_seq)
    }
}

impl MarketDataGateway for BacktestGateway {
    fn subscribe(&mut self, vt_symbol: &str) -> Result<()> {
        if !self.subscribed.contains(&vt_symbol.to_string()) {
            self.subscribed.push(vt_symbol.to_string());
        }
        Ok(())
    }

    fn get_tick(&self, vt_symbol: &str) -> Option<MarketTickView> {
        let close = *self.latest_price.get(vt_symbol)?;
        let tick = self.contracts.get(vt_symbol).map(|c| c.pricetick).unwrap_or(1.0).max(0.0001);
        Some(MarketTickView {
            bid_price: close - tick,
            bid_volume: SYNTHETIC_BOOK_VOLUME,
            ask_price: close + tick,
            ask_volume: SYNTHETIC_BOOK_VOLUME,
            last_price: close,
            volume: SYNTHETIC_BOOK_VOLUME,
        })
    }

    fn get_contract(&self, vt_symbol: &str) -> Option<ContractParams> {
        self.contracts.get(vt_symbol).cloned()
    }

    fn get_all_contracts(&self) -> Vec<ContractParams> {
        self.contracts.values().cloned().collect()
    }

    fn option_chain(&self, underlying_vt_symbol: &str) -> Vec<OptionContract> {
        self.option_chains.get(underlying_vt_symbol).cloned().unwrap_or_default()
    }
}

impl AccountGateway for BacktestGateway {
    fn get_balance(&self) -> Result<f64> {
        Ok(self.balance)
    }

    fn get_position(&self, vt_symbol: &str, direction: PositionDirection) -> Option<PositionSnapshot> {
        self.positions.get(&(vt_symbol.to_string(), direction)).cloned()
    }

    fn get_all_positions(&self) -> Vec<PositionSnapshot> {
        self.positions.values().cloned().collect()
    }
}

impl TradeExecutionGateway for BacktestGateway {
    /// Fills immediately in full: a market order (price == 0) fills at the
    /// latest known price, a limit order fills at its own price. Unknown
    /// symbols are rejected rather than silently fabricated.
    fn send_order(&mut self, instruction: &OrderInstruction) -> Result<Vec<String>> {
        if !self.contracts.contains_key(&instruction.vt_symbol) {
            return Err(RuntimeError::ContractResolution {
                vt_symbol: instruction.vt_symbol.clone(),
                reason: "not registered with the backtest gateway".to_string(),
            });
        }

        let fill_price = if instruction.price > 0.0 {
            instruction.price
        } else {
            *self.latest_price.get(&instruction.vt_symbol).unwrap_or(&0.0)
        };

        let vt_orderid = self.next_orderid();
        let now = Utc::now();

        self.pending_callbacks.push(Callback::Order(OrderData {
            vt_orderid: vt_orderid.clone(),
            vt_symbol: instruction.vt_symbol.clone(),
            direction: instruction.direction,
            offset: instruction.offset,
            volume: instruction.volume,
            traded: instruction.volume,
            price: fill_price,
            status: "ALLTRADED".to_string(),
            datetime: now,
        }));
        self.pending_callbacks.push(Callback::Trade(TradeData {
            vt_tradeid: format!("{vt_orderid}-t1"),
            vt_orderid: vt_orderid.clone(),
            vt_symbol: instruction.vt_symbol.clone(),
            direction: instruction.direction,
            offset: instruction.offset,
            volume: instruction.volume,
            price: fill_price,
            datetime: now,
        }));

        Ok(vec![vt_orderid])
    }

    fn cancel_order(&mut self, _vt_orderid: &str) -> Result<()> {
        // Orders fill synchronously in send_order, so there is never an
        // open order left to cancel; a no-op keeps the call site simple.
        Ok(())
    }

    fn cancel_all_orders(&mut self) -> Result<()> {
        Ok(())
    }
}

impl QuoteGateway for BacktestGateway {
    fn send_quote(&mut self, request: &QuoteRequest) -> Result<String> {
        let vt_quoteid = format!("btq-{}", self.quotes.len() + 1);
        self.quotes.push(vt_quoteid.clone());
        let _ = request;
        Ok(vt_quoteid)
    }

    fn cancel_quote(&mut self, vt_quoteid: &str) -> Result<()> {
        self.quotes.retain(|q| q != vt_quoteid);
        Ok(())
    }

    fn all_quotes(&self) -> Vec<String> {
        self.quotes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::order_instruction::{Direction, Offset};

    fn gateway() -> BacktestGateway {
        let mut gw = BacktestGateway::new(1_000_000.0);
        gw.register_contract("rb2501.SHFE", 10.0, 1.0);
        gw.on_bar_close("rb2501.SHFE", 3500.0);
        gw
    }

    #[test]
    fn tick_is_synthesized_from_latest_close() {
        let gw = gateway();
        let tick = gw.get_tick("rb2501.SHFE").unwrap();
        assert_eq!(tick.last_price, 3500.0);
        assert_eq!(tick.bid_price, 3499.0);
        assert_eq!(tick.ask_price, 3501.0);
        assert!(tick.bid_volume >= SYNTHETIC_BOOK_VOLUME);
    }

    #[test]
    fn send_order_fills_immediately_and_queues_callbacks() {
        let mut gw = gateway();
        let instruction = OrderInstruction::new("rb2501.SHFE", Direction::Long, Offset::Open, 2).with_signal("test");
        let ids = gw.send_order(&instruction).unwrap();
        assert_eq!(ids.len(), 1);

        let (orders, trades) = gw.drain_callbacks();
        assert_eq!(orders.len(), 1);
        assert_eq!(trades.len(), 1);
        assert_eq!(orders[0].status, "ALLTRADED");
        assert_eq!(trades[0].volume, 2);
    }

    #[test]
    fn market_order_fills_at_latest_price() {
        let mut gw = gateway();
        let instruction = OrderInstruction::new("rb2501.SHFE", Direction::Short, Offset::Close, 1).with_signal("test");
        gw.send_order(&instruction).unwrap();
        let (_orders, trades) = gw.drain_callbacks();
        assert_eq!(trades[0].price, 3500.0);
    }

    #[test]
    fn unregistered_symbol_is_rejected() {
        let mut gw = BacktestGateway::new(1_000_000.0);
        let instruction = OrderInstruction::new("XX9999.SHFE", Direction::Long, Offset::Open, 1).with_signal("test");
        assert!(gw.send_order(&instruction).is_err());
    }
}
