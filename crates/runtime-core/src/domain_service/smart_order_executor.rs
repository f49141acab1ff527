//! Adaptive limit pricing, timeout detection and retry stepping for
//! resting orders.
//!
//! Unlike [`super::advanced_order_scheduler::AdvancedOrderScheduler`], which
//! only decides *how much* to release and *when*, this service decides *at
//! what price* — and watches the clock for orders that never filled.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::entities::order::OrderStatus;
use crate::events::DomainEvent;
use crate::value_objects::order_execution::OrderExecutionConfig;
use crate::value_objects::order_instruction::Direction;

/// A resting order this executor is responsible for timing out and retrying.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedOrder {
    pub vt_orderid: String,
    pub vt_symbol: String,
    pub direction: Direction,
    pub submit_time: DateTime<Utc>,
    pub status: OrderStatus,
    pub retry_count: u32,
}

impl TrackedOrder {
    pub fn new(vt_orderid: impl Into<String>, vt_symbol: impl Into<String>, direction: Direction, submit_time: DateTime<Utc>) -> Self {
        Self {
            vt_orderid: vt_orderid.into(),
            vt_symbol: vt_symbol.into(),
            direction,
            submit_time,
            status: OrderStatus::Submitting,
            retry_count: 0,
        }
    }

    fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Submitting | OrderStatus::NotTraded | OrderStatus::PartTraded)
    }
}

/// A cancel-and-resubmit instruction returned by [`SmartOrderExecutor::retry`].
#[derive(Debug, Clone, PartialEq)]
pub struct RetryIntent {
    pub vt_orderid: String,
    pub vt_symbol: String,
    pub new_price: f64,
    pub retry_count: u32,
}

#[derive(Debug, Clone, Default)]
pub struct SmartOrderExecutor {
    config: OrderExecutionConfig,
    orders: HashMap<String, TrackedOrder>,
}

impl SmartOrderExecutor {
    pub fn new(config: OrderExecutionConfig) -> Self {
        Self { config, orders: HashMap::new() }
    }

    pub fn register(&mut self, order: TrackedOrder) {
        self.orders.insert(order.vt_orderid.clone(), order);
    }

    pub fn update_status(&mut self, vt_orderid: &str, status: OrderStatus) {
        if let Some(order) = self.orders.get_mut(vt_orderid) {
            order.status = status;
        }
    }

    pub fn order(&self, vt_orderid: &str) -> Option<&TrackedOrder> {
        self.orders.get(vt_orderid)
    }

    /// Adaptive entry/exit price: SHORT sells into the bid, LONG buys into
    /// the ask, each stepped `slippage_ticks` away from the quote to improve
    /// fill probability. A non-positive quote falls back to `original_price`
    /// unchanged (Property 9).
    pub fn adaptive_price(&self, direction: Direction, bid_price: f64, ask_price: f64, original_price: f64) -> f64 {
        let slip = self.config.slippage_ticks as f64 * self.config.price_tick;
        match direction {
            Direction::Short => {
                if bid_price > 0.0 {
                    self.align_price(bid_price - slip)
                } else {
                    original_price
                }
            }
            Direction::Long => {
                if ask_price > 0.0 {
                    self.align_price(ask_price + slip)
                } else {
                    original_price
                }
            }
        }
    }

    /// Rounds `price` to the nearest `price_tick`. A non-positive tick is
    /// treated as identity (Property 10).
    pub fn align_price(&self, price: f64) -> f64 {
        let tick = self.config.price_tick;
        if tick <= 0.0 {
            return price;
        }
        (price / tick).round() * tick
    }

    /// Every registered order still active for `now - submit_time >=
    /// timeout_seconds` produces a cancel intent and an `OrderTimeout`
    /// event (Property 8).
    pub fn check_timeouts(&self, now: DateTime<Utc>) -> (Vec<String>, Vec<DomainEvent>) {
        let mut cancel_ids = Vec::new();
        let mut events = Vec::new();
        for order in self.orders.values() {
            if !order.is_active() {
                continue;
            }
            let elapsed = (now - order.submit_time).num_seconds();
            if elapsed >= self.config.timeout_seconds {
                cancel_ids.push(order.vt_orderid.clone());
                events.push(DomainEvent::OrderTimeout {
                    vt_orderid: order.vt_orderid.clone(),
                    vt_symbol: order.vt_symbol.clone(),
                    timestamp: now,
                });
            }
        }
        (cancel_ids, events)
    }

    /// One tick more aggressive than `current_price`, stepping the retry
    /// counter. Returns `None` (and an `OrderRetryExhausted` event) once
    /// `retry_count` reaches `max_retries` (Property 11).
    pub fn retry(&mut self, vt_orderid: &str, current_price: f64, now: DateTime<Utc>) -> (Option<RetryIntent>, Option<DomainEvent>) {
        let Some(order) = self.orders.get_mut(vt_orderid) else {
            return (None, None);
        };

        if order.retry_count >= self.config.max_retries {
            return (
                None,
                Some(DomainEvent::OrderRetryExhausted {
                    vt_orderid: order.vt_orderid.clone(),
                    vt_symbol: order.vt_symbol.clone(),
                    retry_count: order.retry_count,
                    timestamp: now,
                }),
            );
        }

        let step = self.config.price_tick;
        let stepped = match order.direction {
            Direction::Short => current_price - step,
            Direction::Long => current_price + step,
        };
        let new_price = self.align_price(stepped);
        order.retry_count += 1;

        (
            Some(RetryIntent {
                vt_orderid: order.vt_orderid.clone(),
                vt_symbol: order.vt_symbol.clone(),
                new_price,
                retry_count: order.retry_count,
            }),
            None,
        )
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn config() -> OrderExecutionConfig {
        OrderExecutionConfig { timeout_seconds: 30, max_retries: 2, slippage_ticks: 1, price_tick: 1.0 }
    }

    #[test]
    fn short_prices_off_bid_minus_slippage() {
        let exec = SmartOrderExecutor::new(config());
        assert_eq!(exec.adaptive_price(Direction::Short, 100.0, 101.0, 50.0), 99.0);
    }

    #[test]
    fn long_prices_off_ask_plus_slippage() {
        let exec = SmartOrderExecutor::new(config());
        assert_eq!(exec.adaptive_price(Direction::Long, 100.0, 101.0, 50.0), 102.0);
    }

    #[test]
    fn non_positive_quote_falls_back_to_original_price() {
        let exec = SmartOrderExecutor::new(config());
        assert_eq!(exec.adaptive_price(Direction::Short, 0.0, 101.0, 50.0), 50.0);
        assert_eq!(exec.adaptive_price(Direction::Long, 100.0, -1.0, 50.0), 50.0);
    }

    #[test]
    fn price_tick_zero_is_identity() {
        let exec = SmartOrderExecutor::new(OrderExecutionConfig { price_tick: 0.0, ..config() });
        assert_eq!(exec.align_price(123.456), 123.456);
    }

    #[test]
    fn stale_order_produces_timeout_event() {
        let mut exec = SmartOrderExecutor::new(config());
        let now = Utc::now();
        exec.register(TrackedOrder::new("o1", "rb2501.SHFE", Direction::Short, now - Duration::seconds(31)));
        let (ids, events) = exec.check_timeouts(now);
        assert_eq!(ids, vec!["o1".to_string()]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn fresh_order_has_no_timeout() {
        let mut exec = SmartOrderExecutor::new(config());
        let now = Utc::now();
        exec.register(TrackedOrder::new("o1", "rb2501.SHFE", Direction::Short, now - Duration::seconds(5)));
        let (ids, _events) = exec.check_timeouts(now);
        assert!(ids.is_empty());
    }

    #[test]
    fn retry_steps_one_tick_more_aggressive() {
        let mut exec = SmartOrderExecutor::new(config());
        let now = Utc::now();
        exec.register(TrackedOrder::new("o1", "rb2501.SHFE", Direction::Short, now));
        let (intent, event) = exec.retry("o1", 99.0, now);
        let intent = intent.unwrap();
        assert_eq!(intent.new_price, 98.0);
        assert_eq!(intent.retry_count, 1);
        assert!(event.is_none());
    }

    #[test]
    fn retry_exhausts_after_max_retries() {
        let mut exec = SmartOrderExecutor::new(config());
        let now = Utc::now();
        exec.register(TrackedOrder::new("o1", "rb2501.SHFE", Direction::Long, now));
        exec.retry("o1", 100.0, now);
        exec.retry("o1", 101.0, now);
        let (intent, event) = exec.retry("o1", 102.0, now);
        assert!(intent.is_none());
        assert!(matches!(event, Some(DomainEvent::OrderRetryExhausted { retry_count: 2, .. })));
    }
}
