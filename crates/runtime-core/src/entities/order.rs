//! Order entity: tracks the lifecycle of a single submitted order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{Direction, Offset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Submitting,
    NotTraded,
    PartTraded,
    AllTraded,
    Cancelled,
    Rejected,
}

/// A single order sent to a gateway, tracked by the strategy so it can
/// reconcile fills and decide when a position's intent is fully realized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub vt_orderid: String,
    pub vt_symbol: String,
    pub direction: Direction,
    pub offset: Offset,
    pub volume: i64,
    pub price: f64,
    pub status: OrderStatus,
    pub traded: i64,
    pub signal: String,
    pub create_time: DateTime<Utc>,
    pub update_time: Option<DateTime<Utc>>,
}

impl Order {
    pub fn new(
        vt_orderid: impl Into<String>,
        vt_symbol: impl Into<String>,
        direction: Direction,
        offset: Offset,
        volume: i64,
        create_time: DateTime<Utc>,
    ) -> Self {
        Self {
            vt_orderid: vt_orderid.into(),
            vt_symbol: vt_symbol.into(),
            direction,
            offset,
            volume,
            price: 0.0,
            status: OrderStatus::Submitting,
            traded: 0,
            signal: String::new(),
            create_time,
            update_time: None,
        }
    }

    pub fn update_status(&mut self, new_status: OrderStatus, traded: i64, now: DateTime<Utc>) {
        self.status = new_status;
        self.traded = traded;
        self.update_time = Some(now);
    }

    pub fn add_trade(&mut self, trade_volume: i64, now: DateTime<Utc>) {
        self.traded += trade_volume;
        self.update_time = Some(now);

        if self.traded >= self.volume {
            self.status = OrderStatus::AllTraded;
        } else if self.traded > 0 {
            self.status = OrderStatus::PartTraded;
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Submitting | OrderStatus::NotTraded | OrderStatus::PartTraded)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, OrderStatus::AllTraded | OrderStatus::Cancelled | OrderStatus::Rejected)
    }

    pub fn is_open_order(&self) -> bool {
        self.offset == Offset::Open
    }

    pub fn is_close_order(&self) -> bool {
        matches!(self.offset, Offset::Close | Offset::CloseToday | Offset::CloseYesterday)
    }

    pub fn remaining_volume(&self) -> i64 {
        (self.volume - self.traded).max(0)
    }
}
