//! Domain events raised by aggregates and domain services.
//!
//! These are pure notifications of something that already happened; nothing
//! downstream is allowed to reject them. Producers push them onto an
//! aggregate's internal queue (see [`crate::aggregates::PositionAggregate::pop_domain_events`]);
//! the pipeline drains the queue each cycle and fans events out through
//! [`super::event_bus::EventBus`] to the notifier and monitor repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DomainEvent {
    ManualCloseDetected {
        vt_symbol: String,
        volume: i64,
        timestamp: DateTime<Utc>,
    },
    ManualOpenDetected {
        vt_symbol: String,
        volume: i64,
        timestamp: DateTime<Utc>,
    },
    RiskLimitExceeded {
        vt_symbol: String,
        limit_type: RiskLimitType,
        current_volume: i64,
        limit_volume: i64,
    },
    GreeksRiskBreach {
        level: RiskLevel,
        greek_name: GreekName,
        current_value: f64,
        limit_value: f64,
    },
    HedgeExecuted {
        hedge_volume: i64,
        hedge_direction: Direction,
        portfolio_delta_before: f64,
        portfolio_delta_after: f64,
        hedge_instrument: String,
    },
    GammaScalpExecuted {
        rebalance_volume: i64,
        rebalance_direction: Direction,
        portfolio_delta_before: f64,
        portfolio_gamma: f64,
        hedge_instrument: String,
    },
    IcebergComplete {
        order_id: String,
        vt_symbol: String,
        total_volume: i64,
        filled_volume: i64,
    },
    IcebergCancelled {
        order_id: String,
        vt_symbol: String,
        filled_volume: i64,
        remaining_volume: i64,
    },
    TwapComplete {
        order_id: String,
        vt_symbol: String,
        total_volume: i64,
    },
    VwapComplete {
        order_id: String,
        vt_symbol: String,
        total_volume: i64,
    },
    RolloverExecuted {
        product_code: String,
        from_vt_symbol: String,
        to_vt_symbol: String,
        timestamp: DateTime<Utc>,
    },
    OrderTimeout {
        vt_orderid: String,
        vt_symbol: String,
        timestamp: DateTime<Utc>,
    },
    OrderRetryExhausted {
        vt_orderid: String,
        vt_symbol: String,
        retry_count: u32,
        timestamp: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLimitType {
    Global,
    Contract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Position,
    Portfolio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GreekName {
    Delta,
    Gamma,
    Theta,
    Vega,
}

impl DomainEvent {
    /// Stable category string, used by the event bus for topic-style
    /// dispatch and by the notifier to pick a message template.
    pub fn category(&self) -> &'static str {
        match self {
            DomainEvent::ManualCloseDetected { .. } => "manual_close",
            DomainEvent::ManualOpenDetected { .. } => "manual_open",
            DomainEvent::RiskLimitExceeded { .. } => "risk_limit",
            DomainEvent::GreeksRiskBreach { .. } => "greeks_risk_breach",
            DomainEvent::HedgeExecuted { .. } => "hedge_executed",
            DomainEvent::GammaScalpExecuted { .. } => "gamma_scalp",
            DomainEvent::IcebergComplete { .. } => "iceberg_complete",
            DomainEvent::IcebergCancelled { .. } => "iceberg_cancelled",
            DomainEvent::TwapComplete { .. } => "twap_complete",
            DomainEvent::VwapComplete { .. } => "vwap_complete",
            DomainEvent::RolloverExecuted { .. } => "rollover",
            DomainEvent::OrderTimeout { .. } => "order_timeout",
            DomainEvent::OrderRetryExhausted { .. } => "order_retry_exhausted",
        }
    }
}
