//! Position entity: a strategy-owned holding, as distinct from whatever
//! the gateway reports for the account.
//!
//! A `Position` tracks the strategy's own view of what it opened and why
//! (via `signal`), so that later closing logic can ask "was this opened by
//! signal X" without re-deriving it from raw fills. The broker-reported
//! truth is reconciled against this by [`crate::aggregates::PositionAggregate`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Direction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub vt_symbol: String,
    pub underlying_vt_symbol: String,
    pub signal: String,
    pub volume: i64,
    pub target_volume: i64,
    pub side: Direction,
    pub open_price: f64,
    pub create_time: DateTime<Utc>,
    pub open_time: Option<DateTime<Utc>>,
    pub close_time: Option<DateTime<Utc>>,
    pub is_closed: bool,
    pub is_manually_closed: bool,
}

impl Position {
    pub fn new(
        vt_symbol: impl Into<String>,
        underlying_vt_symbol: impl Into<String>,
        signal: impl Into<String>,
        target_volume: i64,
        create_time: DateTime<Utc>,
    ) -> Self {
        Self {
            vt_symbol: vt_symbol.into(),
            underlying_vt_symbol: underlying_vt_symbol.into(),
            signal: signal.into(),
            volume: 0,
            target_volume,
            // A short-strangle style strategy's default posture is short premium.
            side: Direction::Short,
            open_price: 0.0,
            create_time,
            open_time: None,
            close_time: None,
            is_closed: false,
            is_manually_closed: false,
        }
    }

    pub fn with_side(mut self, side: Direction) -> Self {
        self.side = side;
        self
    }

    /// Records a fill, updating the weighted-average open price.
    pub fn add_fill(&mut self, filled_volume: i64, fill_price: f64, fill_time: DateTime<Utc>) {
        if self.volume == 0 {
            self.open_price = fill_price;
            self.open_time = Some(fill_time);
            self.volume += filled_volume;
            return;
        }

        let total_value = self.open_price * self.volume as f64 + fill_price * filled_volume as f64;
        self.volume += filled_volume;
        self.open_price = if self.volume > 0 {
            total_value / self.volume as f64
        } else {
            0.0
        };
    }

    /// Reduces the held volume (a closing fill), closing the position once
    /// volume reaches zero.
    pub fn reduce_volume(&mut self, closed_volume: i64, close_time: DateTime<Utc>) {
        self.volume = (self.volume - closed_volume).max(0);
        if self.volume == 0 {
            self.is_closed = true;
            self.close_time = Some(close_time);
        }
    }

    pub fn mark_as_manually_closed(&mut self, closed_volume: i64, close_time: DateTime<Utc>) {
        self.is_manually_closed = true;
        self.reduce_volume(closed_volume, close_time);
    }

    pub fn is_fully_filled(&self) -> bool {
        self.volume >= self.target_volume
    }

    pub fn pending_volume(&self) -> i64 {
        (self.target_volume - self.volume).max(0)
    }

    pub fn is_active(&self) -> bool {
        self.volume > 0 && !self.is_closed
    }

    /// Holding time in seconds, measured to `now` if still open.
    pub fn holding_time_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        let open_time = self.open_time?;
        let end_time = self.close_time.unwrap_or(now);
        Some((end_time - open_time).num_seconds())
    }

    pub fn is_for_open_signal(&self, signal_types: &[&str]) -> bool {
        signal_types.contains(&self.signal.as_str())
    }
}
