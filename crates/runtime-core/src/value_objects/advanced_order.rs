//! Value objects backing [`crate::domain_service::advanced_order_scheduler::AdvancedOrderScheduler`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::order_instruction::OrderInstruction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvancedOrderType {
    Iceberg,
    TimedSplit,
    Twap,
    Vwap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvancedOrderStatus {
    Executing,
    Completed,
    Cancelled,
}

/// A single child slice of an advanced order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildOrder {
    pub child_id: String,
    pub parent_id: String,
    pub volume: i64,
    pub scheduled_time: Option<DateTime<Utc>>,
    pub is_submitted: bool,
    pub is_filled: bool,
}

impl ChildOrder {
    pub fn new(child_id: impl Into<String>, parent_id: impl Into<String>, volume: i64) -> Self {
        Self {
            child_id: child_id.into(),
            parent_id: parent_id.into(),
            volume,
            scheduled_time: None,
            is_submitted: false,
            is_filled: false,
        }
    }

    pub fn with_schedule(mut self, scheduled_time: DateTime<Utc>) -> Self {
        self.scheduled_time = Some(scheduled_time);
        self
    }
}

/// Planned (time, volume) entry, kept alongside `child_orders` for
/// introspection/telemetry of the slice schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceEntry {
    pub scheduled_time: DateTime<Utc>,
    pub volume: i64,
}

/// The original parameters an advanced order was submitted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOrderRequest {
    pub order_type: AdvancedOrderType,
    pub instruction: OrderInstruction,
    pub batch_size: Option<i64>,
    pub interval_seconds: Option<i64>,
    pub per_order_volume: Option<i64>,
    pub time_window_seconds: Option<i64>,
    pub num_slices: Option<usize>,
    pub volume_profile: Option<Vec<f64>>,
}

impl AdvancedOrderRequest {
    fn bare(order_type: AdvancedOrderType, instruction: OrderInstruction) -> Self {
        Self {
            order_type,
            instruction,
            batch_size: None,
            interval_seconds: None,
            per_order_volume: None,
            time_window_seconds: None,
            num_slices: None,
            volume_profile: None,
        }
    }
}

/// A live advanced order and its generated child slices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedOrder {
    pub order_id: String,
    pub request: AdvancedOrderRequest,
    pub status: AdvancedOrderStatus,
    pub child_orders: Vec<ChildOrder>,
    pub slice_schedule: Vec<SliceEntry>,
    pub filled_volume: i64,
}

impl AdvancedOrder {
    pub fn new(order_id: String, order_type: AdvancedOrderType, instruction: OrderInstruction) -> Self {
        Self {
            order_id,
            request: AdvancedOrderRequest::bare(order_type, instruction),
            status: AdvancedOrderStatus::Executing,
            child_orders: Vec::new(),
            slice_schedule: Vec::new(),
            filled_volume: 0,
        }
    }
}
