//! In-memory OHLCV bar, the pipeline's unit of market data.
//!
//! This is the live/warm-up counterpart of `runtime_data::models::BarRecord` —
//! the history repository hands out `BarRecord`s, the pipeline converts each
//! one into a `Bar` before it ever reaches an instrument's ring buffer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub datetime: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    pub fn new(datetime: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: i64) -> Self {
        Self {
            datetime,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }
}
