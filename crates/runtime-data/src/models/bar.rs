use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single minute OHLCV bar as it is persisted in the historical bar store.
///
/// This is the on-disk/warm-up counterpart of `runtime_core::value_objects::Bar` —
/// the pipeline never holds a `BarRecord` directly, it converts one into a `Bar`
/// on the way out of the history repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarRecord {
    pub id: Option<i64>,
    pub symbol: String,
    pub timestamp: i64, // minute open, milliseconds since Unix epoch
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl BarRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        symbol: String,
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            id: None,
            symbol,
            timestamp: timestamp.timestamp_millis(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn timestamp_as_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }

    pub fn midpoint(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_record_creation() {
        let ts = Utc::now();
        let bar = BarRecord::new("rb2601.SHFE".to_string(), ts, 3500.0, 3520.0, 3490.0, 3510.0, 1200);

        assert_eq!(bar.symbol, "rb2601.SHFE");
        assert_eq!(bar.open, 3500.0);
        assert_eq!(bar.high, 3520.0);
        assert_eq!(bar.low, 3490.0);
        assert_eq!(bar.close, 3510.0);
        assert_eq!(bar.volume, 1200);
    }

    #[test]
    fn test_bar_record_calculations() {
        let bar = BarRecord::new(
            "rb2601.SHFE".to_string(),
            Utc::now(),
            3500.0,
            3520.0,
            3480.0,
            3510.0,
            1000,
        );

        assert_eq!(bar.midpoint(), 3500.0);
        assert!((bar.range() - 40.0).abs() < 1e-9);
        assert!(bar.is_bullish());
    }
}
