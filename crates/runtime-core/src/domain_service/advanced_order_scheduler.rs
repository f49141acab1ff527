//! Splits a single trading intent into scheduled child slices (iceberg,
//! timed-split, TWAP, VWAP) and tracks their fill lifecycle.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::error::{Result, RuntimeError};
use crate::events::DomainEvent;
use crate::value_objects::{
    AdvancedOrder, AdvancedOrderRequest, AdvancedOrderStatus, AdvancedOrderType, ChildOrder, OrderInstruction,
    SliceEntry,
};

#[derive(Debug, Default)]
pub struct AdvancedOrderScheduler {
    orders: HashMap<String, AdvancedOrder>,
}

impl AdvancedOrderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits `instruction.volume` into batches of `batch_size`, with only
    /// one batch ever in flight at a time (see [`Self::pending_children`]).
    pub fn submit_iceberg(&mut self, instruction: OrderInstruction, batch_size: i64) -> Result<&AdvancedOrder> {
        if instruction.volume <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("total volume must be greater than 0".into()));
        }
        if batch_size <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("batch size must be greater than 0".into()));
        }

        let order_id = Uuid::new_v4().to_string();
        let mut child_orders = Vec::new();
        let mut remaining = instruction.volume;
        let mut idx = 0;
        while remaining > 0 {
            let vol = batch_size.min(remaining);
            child_orders.push(ChildOrder::new(format!("{order_id}_child_{idx}"), order_id.clone(), vol));
            remaining -= vol;
            idx += 1;
        }

        let request = AdvancedOrderRequest {
            order_type: AdvancedOrderType::Iceberg,
            instruction,
            batch_size: Some(batch_size),
            interval_seconds: None,
            per_order_volume: None,
            time_window_seconds: None,
            num_slices: None,
            volume_profile: None,
        };

        let order = AdvancedOrder {
            order_id: order_id.clone(),
            request,
            status: AdvancedOrderStatus::Executing,
            child_orders,
            slice_schedule: Vec::new(),
            filled_volume: 0,
        };
        self.orders.insert(order_id.clone(), order);
        Ok(self.orders.get(&order_id).unwrap())
    }

    pub fn submit_timed_split(
        &mut self,
        instruction: OrderInstruction,
        interval_seconds: i64,
        per_order_volume: i64,
        start_time: DateTime<Utc>,
    ) -> Result<&AdvancedOrder> {
        if instruction.volume <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("total volume must be greater than 0".into()));
        }
        if interval_seconds <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("interval must be greater than 0".into()));
        }
        if per_order_volume <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("per-order volume must be greater than 0".into()));
        }

        let order_id = Uuid::new_v4().to_string();
        let mut child_orders = Vec::new();
        let mut slice_schedule = Vec::new();
        let mut remaining = instruction.volume;
        let mut idx = 0;
        while remaining > 0 {
            let vol = per_order_volume.min(remaining);
            let scheduled = start_time + Duration::seconds(interval_seconds * idx as i64);
            child_orders.push(
                ChildOrder::new(format!("{order_id}_child_{idx}"), order_id.clone(), vol).with_schedule(scheduled),
            );
            slice_schedule.push(SliceEntry { scheduled_time: scheduled, volume: vol });
            remaining -= vol;
            idx += 1;
        }

        let request = AdvancedOrderRequest {
            order_type: AdvancedOrderType::TimedSplit,
            instruction,
            batch_size: None,
            interval_seconds: Some(interval_seconds),
            per_order_volume: Some(per_order_volume),
            time_window_seconds: None,
            num_slices: None,
            volume_profile: None,
        };

        let order = AdvancedOrder {
            order_id: order_id.clone(),
            request,
            status: AdvancedOrderStatus::Executing,
            child_orders,
            slice_schedule,
            filled_volume: 0,
        };
        self.orders.insert(order_id.clone(), order);
        Ok(self.orders.get(&order_id).unwrap())
    }

    /// Time-weighted average price split: `total_volume` divided evenly
    /// into `num_slices`, remainder distributed to the first slices.
    pub fn submit_twap(
        &mut self,
        instruction: OrderInstruction,
        time_window_seconds: i64,
        num_slices: usize,
        start_time: DateTime<Utc>,
    ) -> Result<&AdvancedOrder> {
        if instruction.volume <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("total volume must be greater than 0".into()));
        }
        if time_window_seconds <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("time window must be greater than 0".into()));
        }
        if num_slices == 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("slice count must be greater than 0".into()));
        }

        let order_id = Uuid::new_v4().to_string();
        let total_volume = instruction.volume;
        let base_vol = total_volume / num_slices as i64;
        let remainder = total_volume % num_slices as i64;
        let interval = time_window_seconds as f64 / num_slices as f64;

        let mut child_orders = Vec::new();
        let mut slice_schedule = Vec::new();
        for i in 0..num_slices {
            let vol = base_vol + if (i as i64) < remainder { 1 } else { 0 };
            let scheduled = start_time + Duration::seconds((interval * i as f64).round() as i64);
            child_orders.push(
                ChildOrder::new(format!("{order_id}_child_{i}"), order_id.clone(), vol).with_schedule(scheduled),
            );
            slice_schedule.push(SliceEntry { scheduled_time: scheduled, volume: vol });
        }

        let request = AdvancedOrderRequest {
            order_type: AdvancedOrderType::Twap,
            instruction,
            batch_size: None,
            interval_seconds: None,
            per_order_volume: None,
            time_window_seconds: Some(time_window_seconds),
            num_slices: Some(num_slices),
            volume_profile: None,
        };

        let order = AdvancedOrder {
            order_id: order_id.clone(),
            request,
            status: AdvancedOrderStatus::Executing,
            child_orders,
            slice_schedule,
            filled_volume: 0,
        };
        self.orders.insert(order_id.clone(), order);
        Ok(self.orders.get(&order_id).unwrap())
    }

    /// Volume-weighted average price split: allocates `total_volume`
    /// proportional to `volume_profile`, rounding with the largest-remainder
    /// method so the sum is exact.
    pub fn submit_vwap(
        &mut self,
        instruction: OrderInstruction,
        time_window_seconds: i64,
        volume_profile: &[f64],
        start_time: DateTime<Utc>,
    ) -> Result<&AdvancedOrder> {
        if instruction.volume <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("total volume must be greater than 0".into()));
        }
        if time_window_seconds <= 0 {
            return Err(RuntimeError::InvalidAdvancedOrder("time window must be greater than 0".into()));
        }
        if volume_profile.is_empty() {
            return Err(RuntimeError::InvalidAdvancedOrder("volume profile must not be empty".into()));
        }
        if volume_profile.iter().any(|&w| w <= 0.0) {
            return Err(RuntimeError::InvalidAdvancedOrder("volume profile weights must be positive".into()));
        }

        let order_id = Uuid::new_v4().to_string();
        let total_volume = instruction.volume;
        let num_slices = volume_profile.len();
        let total_weight: f64 = volume_profile.iter().sum();

        let raw_volumes: Vec<f64> = volume_profile.iter().map(|&w| total_volume as f64 * w / total_weight).collect();
        let mut floor_volumes: Vec<i64> = raw_volumes.iter().map(|&v| v as i64).collect();
        let allocated: i64 = floor_volumes.iter().sum();
        let remainder = total_volume - allocated;

        let mut fractional_parts: Vec<(f64, usize)> = raw_volumes
            .iter()
            .zip(floor_volumes.iter())
            .enumerate()
            .map(|(i, (raw, floor))| (raw - *floor as f64, i))
            .collect();
        fractional_parts.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());

        for j in 0..remainder as usize {
            let idx = fractional_parts[j].1;
            floor_volumes[idx] += 1;
        }

        let interval = time_window_seconds as f64 / num_slices as f64;
        let mut child_orders = Vec::new();
        let mut slice_schedule = Vec::new();
        for (i, &vol) in floor_volumes.iter().enumerate() {
            let scheduled = start_time + Duration::seconds((interval * i as f64).round() as i64);
            child_orders.push(
                ChildOrder::new(format!("{order_id}_child_{i}"), order_id.clone(), vol).with_schedule(scheduled),
            );
            slice_schedule.push(SliceEntry { scheduled_time: scheduled, volume: vol });
        }

        let request = AdvancedOrderRequest {
            order_type: AdvancedOrderType::Vwap,
            instruction,
            batch_size: None,
            interval_seconds: None,
            per_order_volume: None,
            time_window_seconds: Some(time_window_seconds),
            num_slices: Some(num_slices),
            volume_profile: Some(volume_profile.to_vec()),
        };

        let order = AdvancedOrder {
            order_id: order_id.clone(),
            request,
            status: AdvancedOrderStatus::Executing,
            child_orders,
            slice_schedule,
            filled_volume: 0,
        };
        self.orders.insert(order_id.clone(), order);
        Ok(self.orders.get(&order_id).unwrap())
    }

    /// Marks a child slice filled, completing the parent order (and
    /// emitting the matching completion event) once every child is filled.
    pub fn on_child_filled(&mut self, child_id: &str) -> Vec<DomainEvent> {
        for order in self.orders.values_mut() {
            let Some(child) = order.child_orders.iter_mut().find(|c| c.child_id == child_id && !c.is_filled) else {
                continue;
            };
            child.is_filled = true;
            order.filled_volume += child.volume;

            if order.child_orders.iter().all(|c| c.is_filled) {
                order.status = AdvancedOrderStatus::Completed;
                let vt_symbol = order.request.instruction.vt_symbol.clone();
                let total_volume = order.request.instruction.volume;

                let event = match order.request.order_type {
                    AdvancedOrderType::Iceberg => Some(DomainEvent::IcebergComplete {
                        order_id: order.order_id.clone(),
                        vt_symbol,
                        total_volume,
                        filled_volume: order.filled_volume,
                    }),
                    AdvancedOrderType::Twap => Some(DomainEvent::TwapComplete {
                        order_id: order.order_id.clone(),
                        vt_symbol,
                        total_volume,
                    }),
                    AdvancedOrderType::Vwap => Some(DomainEvent::VwapComplete {
                        order_id: order.order_id.clone(),
                        vt_symbol,
                        total_volume,
                    }),
                    AdvancedOrderType::TimedSplit => None,
                };
                return event.into_iter().collect();
            }
            return vec![];
        }
        vec![]
    }

    /// Children that should be submitted to the gateway right now.
    ///
    /// Iceberg orders release strictly sequentially: only the first
    /// not-yet-submitted child whose predecessors are all filled is
    /// returned. Timed-split/TWAP/VWAP children are returned independently
    /// once their scheduled time has arrived.
    pub fn pending_children(&self, current_time: DateTime<Utc>) -> Vec<&ChildOrder> {
        let mut pending = Vec::new();
        for order in self.orders.values() {
            if order.status != AdvancedOrderStatus::Executing {
                continue;
            }

            if order.request.order_type == AdvancedOrderType::Iceberg {
                for (idx, child) in order.child_orders.iter().enumerate() {
                    if !child.is_submitted && !child.is_filled {
                        let all_prev_filled = order.child_orders[..idx].iter().all(|c| c.is_filled);
                        if all_prev_filled {
                            pending.push(child);
                        }
                        break;
                    }
                }
            } else {
                for child in &order.child_orders {
                    if !child.is_submitted
                        && !child.is_filled
                        && child.scheduled_time.is_some_and(|t| current_time >= t)
                    {
                        pending.push(child);
                    }
                }
            }
        }
        pending
    }

    /// Cancels an advanced order, returning the child ids that still need
    /// a cancel sent to the gateway plus any cancellation events.
    pub fn cancel_order(&mut self, order_id: &str) -> (Vec<String>, Vec<DomainEvent>) {
        let Some(order) = self.orders.get_mut(order_id) else {
            return (vec![], vec![]);
        };
        if matches!(order.status, AdvancedOrderStatus::Completed | AdvancedOrderStatus::Cancelled) {
            return (vec![], vec![]);
        }

        order.status = AdvancedOrderStatus::Cancelled;
        let cancel_ids: Vec<String> = order
            .child_orders
            .iter()
            .filter(|c| c.is_submitted && !c.is_filled)
            .map(|c| c.child_id.clone())
            .collect();
        let remaining: i64 = order.child_orders.iter().filter(|c| !c.is_filled).map(|c| c.volume).sum();

        let mut events = Vec::new();
        if order.request.order_type == AdvancedOrderType::Iceberg {
            events.push(DomainEvent::IcebergCancelled {
                order_id: order.order_id.clone(),
                vt_symbol: order.request.instruction.vt_symbol.clone(),
                filled_volume: order.filled_volume,
                remaining_volume: remaining,
            });
        }

        (cancel_ids, events)
    }

    pub fn order(&self, order_id: &str) -> Option<&AdvancedOrder> {
        self.orders.get(order_id)
    }

    pub fn mark_submitted(&mut self, child_id: &str) {
        for order in self.orders.values_mut() {
            if let Some(child) = order.child_orders.iter_mut().find(|c| c.child_id == child_id) {
                child.is_submitted = true;
                return;
            }
        }
    }
}
