//! Immutable value objects shared across the domain layer.
//!
//! Every type here is a plain data carrier: no identity, no hidden state,
//! equal by value. Entities and aggregates hold these, domain services
//! consume and produce them.

pub mod advanced_order;
pub mod bar;
pub mod contract;
pub mod contract_meta;
pub mod greeks;
pub mod hedging;
pub mod indicator_state;
pub mod market_tick;
pub mod order_execution;
pub mod order_instruction;
pub mod risk;
pub mod vol_surface;

pub use advanced_order::{
    AdvancedOrder, AdvancedOrderRequest, AdvancedOrderStatus, AdvancedOrderType, ChildOrder, SliceEntry,
};
pub use bar::Bar;
pub use contract::{
    AccountSnapshot, ContractParams, OptionContract, OptionType, PositionDirection, PositionSnapshot,
    QuoteRequest,
};
pub use contract_meta::{product_exchange, Exchange, FutureSymbol, OptionSymbol, ParsedSymbol, SelectedContract};
pub use greeks::{GreeksError, GreeksInput, GreeksResult, IvError, IvResult};
pub use hedging::{GammaScalpConfig, HedgeResult, HedgingConfig, ScalpResult};
pub use indicator_state::{
    DivergenceState, DullnessState, EmaState, IndicatorResult, MacdValue, TdValue, TrendStatus,
};
pub use market_tick::MarketTick;
pub use order_execution::OrderExecutionConfig;
pub use order_instruction::{Direction, Offset, OrderInstruction, OrderType};
pub use risk::{PortfolioGreeks, PositionGreeksEntry, RiskCheckResult, RiskThresholds};
pub use vol_surface::{TermStructure, VolQueryResult, VolQuote, VolSmile, VolSurfaceSnapshot};
