//! PositionAggregate: the read-write root managing strategy-owned positions.
//!
//! Responsibilities mirror the original design closely:
//! 1. own the `positions` map (strategy-initiated holdings)
//! 2. track `pending_orders` (orders still in flight)
//! 3. detect manual intervention (closes/opens outside the strategy) and
//!    raise domain events for it
//! 4. enforce daily open-volume limits, resetting at each new trading day
//! 5. queue domain events for the pipeline to drain and fan out

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Order, OrderStatus, Position};
use crate::events::{DomainEvent, RiskLimitType};
use crate::value_objects::Offset;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionAggregate {
    positions: HashMap<String, Position>,
    pending_orders: HashMap<String, Order>,
    managed_symbols: HashSet<String>,
    domain_events: Vec<DomainEvent>,
    daily_open_count: HashMap<String, i64>,
    global_daily_open_count: i64,
    last_trading_date: Option<NaiveDate>,
}

/// Minimal shape of an order-status update as delivered by a gateway
/// callback; kept separate from [`Order`] so the aggregate can accept
/// partial/loosely-typed updates without the gateway needing to construct
/// a full entity.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub vt_orderid: String,
    pub status: OrderStatus,
    pub traded: i64,
}

#[derive(Debug, Clone)]
pub struct TradeUpdate {
    pub vt_symbol: String,
    pub volume: i64,
    pub offset: Offset,
    pub price: f64,
    pub datetime: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PositionUpdate {
    pub vt_symbol: String,
    pub actual_volume: i64,
}

impl PositionAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_position(
        &mut self,
        option_vt_symbol: impl Into<String>,
        underlying_vt_symbol: impl Into<String>,
        signal: impl Into<String>,
        target_volume: i64,
        now: DateTime<Utc>,
    ) -> &Position {
        let option_vt_symbol = option_vt_symbol.into();
        let position = Position::new(option_vt_symbol.clone(), underlying_vt_symbol, signal, target_volume, now);
        self.managed_symbols.insert(option_vt_symbol.clone());
        self.positions.insert(option_vt_symbol.clone(), position);
        self.positions.get(&option_vt_symbol).unwrap()
    }

    pub fn position(&self, vt_symbol: &str) -> Option<&Position> {
        self.positions.get(vt_symbol)
    }

    pub fn positions_by_underlying(&self, underlying_vt_symbol: &str) -> Vec<&Position> {
        self.positions
            .values()
            .filter(|p| p.underlying_vt_symbol == underlying_vt_symbol && !p.is_closed && p.volume > 0)
            .collect()
    }

    pub fn active_positions(&self) -> Vec<&Position> {
        self.positions.values().filter(|p| p.is_active()).collect()
    }

    pub fn all_positions(&self) -> Vec<&Position> {
        self.positions.values().collect()
    }

    pub fn add_pending_order(&mut self, order: Order) {
        self.pending_orders.insert(order.vt_orderid.clone(), order);
    }

    pub fn pending_order(&self, vt_orderid: &str) -> Option<&Order> {
        self.pending_orders.get(vt_orderid)
    }

    pub fn all_pending_orders(&self) -> Vec<&Order> {
        self.pending_orders.values().collect()
    }

    pub fn has_pending_close(&self, position: &Position) -> bool {
        self.pending_orders
            .values()
            .any(|o| o.vt_symbol == position.vt_symbol && o.is_close_order() && o.is_active())
    }

    /// Resets daily open-volume counters if `current_date` differs from the
    /// last seen trading date.
    pub fn on_new_trading_day(&mut self, current_date: NaiveDate) {
        if self.last_trading_date != Some(current_date) {
            self.daily_open_count.clear();
            self.global_daily_open_count = 0;
            self.last_trading_date = Some(current_date);
        }
    }

    pub fn record_open_usage(&mut self, vt_symbol: &str, volume: i64, global_limit: i64, contract_limit: i64) {
        self.global_daily_open_count += volume;
        let entry = self.daily_open_count.entry(vt_symbol.to_string()).or_insert(0);
        *entry += volume;
        let contract_count = *entry;

        if self.global_daily_open_count >= global_limit {
            self.domain_events.push(DomainEvent::RiskLimitExceeded {
                vt_symbol: "GLOBAL".into(),
                limit_type: RiskLimitType::Global,
                current_volume: self.global_daily_open_count,
                limit_volume: global_limit,
            });
        }

        if contract_count >= contract_limit {
            self.domain_events.push(DomainEvent::RiskLimitExceeded {
                vt_symbol: vt_symbol.to_string(),
                limit_type: RiskLimitType::Contract,
                current_volume: contract_count,
                limit_volume: contract_limit,
            });
        }
    }

    pub fn daily_open_volume(&self, vt_symbol: &str) -> i64 {
        self.daily_open_count.get(vt_symbol).copied().unwrap_or(0)
    }

    pub fn global_daily_open_volume(&self) -> i64 {
        self.global_daily_open_count
    }

    /// Volume reserved by still-open open-offset orders, optionally
    /// restricted to one contract.
    pub fn reserved_open_volume(&self, vt_symbol: Option<&str>) -> i64 {
        self.pending_orders
            .values()
            .filter(|o| o.is_open_order() && o.is_active())
            .filter(|o| vt_symbol.map(|s| o.vt_symbol == s).unwrap_or(true))
            .map(|o| o.remaining_volume())
            .sum()
    }

    pub fn update_from_order(&mut self, update: OrderUpdate, now: DateTime<Utc>) {
        let remove = if let Some(order) = self.pending_orders.get_mut(&update.vt_orderid) {
            order.update_status(update.status, update.traded, now);
            order.is_finished()
        } else {
            false
        };
        if remove {
            self.pending_orders.remove(&update.vt_orderid);
        }
    }

    pub fn update_from_trade(&mut self, trade: TradeUpdate) {
        if !self.managed_symbols.contains(&trade.vt_symbol) {
            return;
        }
        let Some(position) = self.positions.get_mut(&trade.vt_symbol) else {
            return;
        };

        if trade.offset == Offset::Open {
            position.add_fill(trade.volume, trade.price, trade.datetime);
            self.record_open_usage(&trade.vt_symbol, trade.volume, 50, 2);
        } else {
            position.reduce_volume(trade.volume, trade.datetime);
        }
    }

    /// Compares a gateway-reported position against the strategy's own
    /// bookkeeping, raising manual-intervention events on any mismatch.
    pub fn update_from_position(&mut self, update: PositionUpdate, now: DateTime<Utc>) {
        if !self.managed_symbols.contains(&update.vt_symbol) {
            return;
        }
        let Some(position) = self.positions.get_mut(&update.vt_symbol) else {
            return;
        };

        if update.actual_volume < position.volume {
            let manual_volume = position.volume - update.actual_volume;
            position.mark_as_manually_closed(manual_volume, now);
            self.domain_events.push(DomainEvent::ManualCloseDetected {
                vt_symbol: update.vt_symbol,
                volume: manual_volume,
                timestamp: now,
            });
        } else if update.actual_volume > position.volume {
            let manual_volume = update.actual_volume - position.volume;
            self.domain_events.push(DomainEvent::ManualOpenDetected {
                vt_symbol: update.vt_symbol,
                volume: manual_volume,
                timestamp: now,
            });
        }
    }

    pub fn pop_domain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.domain_events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.domain_events.is_empty()
    }

    pub fn is_managed(&self, vt_symbol: &str) -> bool {
        self.managed_symbols.contains(vt_symbol)
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.pending_orders.clear();
        self.managed_symbols.clear();
        self.domain_events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value_objects::Direction;

    fn new_aggregate_with_position() -> PositionAggregate {
        let mut agg = PositionAggregate::new();
        agg.create_position("IO2501-C-4000.CFFEX", "IO2501.CFFEX", "short_strangle", 4, Utc::now());
        agg
    }

    #[test]
    fn trade_update_opens_position_and_tracks_usage() {
        let mut agg = new_aggregate_with_position();
        agg.update_from_trade(TradeUpdate {
            vt_symbol: "IO2501-C-4000.CFFEX".into(),
            volume: 2,
            offset: Offset::Open,
            price: 125.0,
            datetime: Utc::now(),
        });
        assert_eq!(agg.position("IO2501-C-4000.CFFEX").unwrap().volume, 2);
        assert_eq!(agg.daily_open_volume("IO2501-C-4000.CFFEX"), 2);
    }

    #[test]
    fn global_limit_breach_emits_event() {
        let mut agg = new_aggregate_with_position();
        agg.record_open_usage("IO2501-C-4000.CFFEX", 50, 50, 100);
        let events = agg.pop_domain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            DomainEvent::RiskLimitExceeded { limit_type: RiskLimitType::Global, .. }
        )));
    }

    #[test]
    fn manual_close_detected_on_volume_mismatch() {
        let mut agg = new_aggregate_with_position();
        agg.update_from_trade(TradeUpdate {
            vt_symbol: "IO2501-C-4000.CFFEX".into(),
            volume: 4,
            offset: Offset::Open,
            price: 125.0,
            datetime: Utc::now(),
        });
        agg.update_from_position(
            PositionUpdate { vt_symbol: "IO2501-C-4000.CFFEX".into(), actual_volume: 1 },
            Utc::now(),
        );
        let events = agg.pop_domain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, DomainEvent::ManualCloseDetected { volume, .. } if *volume == 3)));
        assert!(agg.position("IO2501-C-4000.CFFEX").unwrap().is_manually_closed);
    }

    #[test]
    fn pending_order_removed_once_finished() {
        let mut agg = new_aggregate_with_position();
        agg.add_pending_order(Order::new(
            "ord-1",
            "IO2501-C-4000.CFFEX",
            Direction::Short,
            Offset::Open,
            4,
            Utc::now(),
        ));
        agg.update_from_order(
            OrderUpdate { vt_orderid: "ord-1".into(), status: OrderStatus::AllTraded, traded: 4 },
            Utc::now(),
        );
        assert!(agg.pending_order("ord-1").is_none());
    }

    #[test]
    fn new_trading_day_resets_counters() {
        let mut agg = new_aggregate_with_position();
        agg.record_open_usage("IO2501-C-4000.CFFEX", 1, 50, 2);
        let today = Utc::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();
        agg.on_new_trading_day(tomorrow);
        assert_eq!(agg.daily_open_volume("IO2501-C-4000.CFFEX"), 0);
        assert_eq!(agg.global_daily_open_volume(), 0);
    }
}
