use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A market tick as surfaced by `IMarketDataGateway::get_tick`.
///
/// Carries enough of the top-of-book to support the liquidity gates in
/// `OptionSelectorService::check_liquidity` (`volume`, `bid_size`) on top of
/// the plain bid/ask used for adaptive order pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub id: Option<i64>,
    pub symbol: String,
    pub timestamp: i64, // Milliseconds since Unix epoch
    pub bid: f64,
    pub ask: f64,
    pub bid_size: Option<i64>,
    pub ask_size: Option<i64>,
    pub volume: Option<i64>,
}

impl Tick {
    pub fn new(symbol: String, timestamp: DateTime<Utc>, bid: f64, ask: f64) -> Self {
        Self {
            id: None,
            symbol,
            timestamp: timestamp.timestamp_millis(),
            bid,
            ask,
            bid_size: None,
            ask_size: None,
            volume: None,
        }
    }

    pub fn new_with_millis(symbol: String, timestamp: i64, bid: f64, ask: f64) -> Self {
        Self {
            id: None,
            symbol,
            timestamp,
            bid,
            ask,
            bid_size: None,
            ask_size: None,
            volume: None,
        }
    }

    pub fn with_sizes(mut self, bid_size: i64, ask_size: i64) -> Self {
        self.bid_size = Some(bid_size);
        self.ask_size = Some(ask_size);
        self
    }

    pub fn with_volume(mut self, volume: i64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn timestamp_as_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.timestamp).unwrap_or_else(Utc::now)
    }

    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_creation() {
        let timestamp = Utc::now();
        let tick = Tick::new("IM2601.CFFEX".to_string(), timestamp, 6290.0, 6292.0);

        assert_eq!(tick.symbol, "IM2601.CFFEX");
        assert_eq!(tick.bid, 6290.0);
        assert_eq!(tick.ask, 6292.0);
        assert_eq!(tick.bid_size, None);
    }

    #[test]
    fn test_tick_with_sizes_and_volume() {
        let tick = Tick::new("IM2601.CFFEX".to_string(), Utc::now(), 6290.0, 6292.0)
            .with_sizes(40, 35)
            .with_volume(12000);

        assert_eq!(tick.bid_size, Some(40));
        assert_eq!(tick.ask_size, Some(35));
        assert_eq!(tick.volume, Some(12000));
        assert!((tick.spread() - 2.0).abs() < 1e-9);
    }
}
