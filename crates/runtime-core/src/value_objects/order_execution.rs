//! Configuration for [`crate::domain_service::smart_order_executor::SmartOrderExecutor`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderExecutionConfig {
    pub timeout_seconds: i64,
    pub max_retries: u32,
    pub slippage_ticks: i64,
    pub price_tick: f64,
}

impl Default for OrderExecutionConfig {
    fn default() -> Self {
        Self { timeout_seconds: 30, max_retries: 3, slippage_ticks: 1, price_tick: 1.0 }
    }
}
