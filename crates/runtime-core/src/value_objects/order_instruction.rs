//! Trading instruction value objects.
//!
//! An [`OrderInstruction`] is the output of the Decider side of the
//! strategy (position sizing / hedging / scalping engines). It carries no
//! behavior beyond what its own fields expose; the Doer side (the engine,
//! via a [`crate::gateway`] trait) is responsible for turning it into an
//! actual order sent to the exchange.

use serde::{Deserialize, Serialize};

/// Trading direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "long",
            Direction::Short => "short",
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Long => Direction::Short,
            Direction::Short => Direction::Long,
        }
    }
}

/// Open/close flag, matching CTP-style offset conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Offset {
    Open,
    Close,
    CloseToday,
    CloseYesterday,
}

/// Order execution style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
    /// Fill And Kill: execute whatever is immediately available, cancel the rest.
    Fak,
    /// Fill Or Kill: execute entirely or cancel entirely.
    Fok,
}

impl Default for OrderType {
    fn default() -> Self {
        OrderType::Limit
    }
}

/// A single trading instruction produced by a decision service.
///
/// This is the hand-off point between the "decide what to trade" side of
/// the strategy and the "send it to the exchange" side. It is intentionally
/// immutable; constructing a new one is the only way to change intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderInstruction {
    pub vt_symbol: String,
    pub direction: Direction,
    pub offset: Offset,
    pub volume: i64,
    pub price: f64,
    pub signal: String,
    pub order_type: OrderType,
}

impl OrderInstruction {
    pub fn new(vt_symbol: impl Into<String>, direction: Direction, offset: Offset, volume: i64) -> Self {
        Self {
            vt_symbol: vt_symbol.into(),
            direction,
            offset,
            volume,
            price: 0.0,
            signal: String::new(),
            order_type: OrderType::Limit,
        }
    }

    pub fn with_price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }

    pub fn with_signal(mut self, signal: impl Into<String>) -> Self {
        self.signal = signal.into();
        self
    }

    pub fn with_order_type(mut self, order_type: OrderType) -> Self {
        self.order_type = order_type;
        self
    }

    pub fn is_open(&self) -> bool {
        self.offset == Offset::Open
    }

    pub fn is_close(&self) -> bool {
        matches!(self.offset, Offset::Close | Offset::CloseToday | Offset::CloseYesterday)
    }

    pub fn is_buy(&self) -> bool {
        self.direction == Direction::Long
    }

    pub fn is_sell(&self) -> bool {
        self.direction == Direction::Short
    }
}

impl std::fmt::Display for OrderInstruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let dir = if self.is_buy() { "Buy" } else { "Sell" };
        let off = if self.is_open() { "Open" } else { "Close" };
        write!(
            f,
            "OrderInstruction({dir} {off} {} x{} @{:.2} [{:?}])",
            self.vt_symbol, self.volume, self.price, self.order_type
        )
    }
}
