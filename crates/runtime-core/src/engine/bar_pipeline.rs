//! Optional windowing aggregator sitting between the raw 1-minute bar
//! stream and [`super::pipeline::TradingPipeline::process_bars`].
//!
//! When no `BarPipeline` is installed, `on_bars` forwards its input map to
//! `process_bars` identity-equal (Property 1 of the test spec). When one is
//! installed, raw bars accumulate per symbol until their window closes, at
//! which point a single synthesized map is handed to `process_bars`.

use std::collections::HashMap;

use crate::value_objects::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarInterval {
    Minute,
    Hour,
    Daily,
}

impl BarInterval {
    /// How many raw 1-minute bars make up one unit of this interval.
    /// Daily uses a nominal trading-day length; this is a windowing
    /// convenience, not a trading-calendar computation (that lives in
    /// [`crate::domain_service::expiry_calendar`]).
    fn unit_minutes(self) -> u32 {
        match self {
            BarInterval::Minute => 1,
            BarInterval::Hour => 60,
            BarInterval::Daily => 1440,
        }
    }
}

#[derive(Debug, Clone)]
struct PartialBar {
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    datetime: chrono::DateTime<chrono::Utc>,
    count: u32,
}

impl PartialBar {
    fn start(bar: &Bar) -> Self {
        Self { open: bar.open, high: bar.high, low: bar.low, close: bar.close, volume: bar.volume, datetime: bar.datetime, count: 1 }
    }

    fn accumulate(&mut self, bar: &Bar) {
        self.high = self.high.max(bar.high);
        self.low = self.low.min(bar.low);
        self.close = bar.close;
        self.volume += bar.volume;
        self.datetime = bar.datetime;
        self.count += 1;
    }

    fn into_bar(self) -> Bar {
        Bar::new(self.datetime, self.open, self.high, self.low, self.close, self.volume)
    }
}

/// Aggregates a raw bar stream into synthesized (interval, window) bars.
#[derive(Debug, Clone)]
pub struct BarPipeline {
    window_bars: u32,
    partials: HashMap<String, PartialBar>,
}

impl BarPipeline {
    /// `window` units of `interval` make one synthesized bar, e.g.
    /// `(Minute, 5)` for 5-minute bars or `(Hour, 1)` for hourly bars.
    pub fn new(interval: BarInterval, window: u32) -> Self {
        Self { window_bars: interval.unit_minutes() * window.max(1), partials: HashMap::new() }
    }

    /// Feeds one batch of raw bars in. Returns the synthesized map for any
    /// symbol whose window just closed, or `None` if nothing closed yet.
    pub fn handle_bars(&mut self, bars: &HashMap<String, Bar>) -> Option<HashMap<String, Bar>> {
        let mut closed = HashMap::new();

        for (vt_symbol, bar) in bars {
            let partial = self.partials.entry(vt_symbol.clone()).or_insert_with(|| PartialBar::start(bar));
            if partial.count == 0 {
                *partial = PartialBar::start(bar);
            } else {
                partial.accumulate(bar);
            }

            if partial.count >= self.window_bars {
                let finished = self.partials.remove(vt_symbol).expect("just inserted");
                closed.insert(vt_symbol.clone(), finished.into_bar());
            }
        }

        if closed.is_empty() {
            None
        } else {
            Some(closed)
        }
    }

    pub fn reset(&mut self) {
        self.partials.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bar(close: f64) -> Bar {
        Bar::new(Utc::now(), close, close + 1.0, close - 1.0, close, 10)
    }

    fn map(bar: Bar) -> HashMap<String, Bar> {
        let mut m = HashMap::new();
        m.insert("rb2501.SHFE".to_string(), bar);
        m
    }

    #[test]
    fn window_of_one_closes_every_bar() {
        let mut pipeline = BarPipeline::new(BarInterval::Minute, 1);
        let closed = pipeline.handle_bars(&map(bar(100.0))).unwrap();
        assert_eq!(closed.len(), 1);
    }

    #[test]
    fn window_of_five_only_closes_on_the_fifth_bar() {
        let mut pipeline = BarPipeline::new(BarInterval::Minute, 5);
        for i in 0..4 {
            assert!(pipeline.handle_bars(&map(bar(100.0 + i as f64))).is_none());
        }
        let closed = pipeline.handle_bars(&map(bar(105.0))).unwrap();
        let synthesized = &closed["rb2501.SHFE"];
        assert_eq!(synthesized.close, 105.0);
        assert_eq!(synthesized.volume, 50);
    }

    #[test]
    fn high_low_track_the_extremes_across_the_window() {
        let mut pipeline = BarPipeline::new(BarInterval::Minute, 3);
        pipeline.handle_bars(&map(Bar::new(Utc::now(), 100.0, 102.0, 99.0, 100.0, 10)));
        pipeline.handle_bars(&map(Bar::new(Utc::now(), 100.0, 110.0, 95.0, 103.0, 10)));
        let closed = pipeline.handle_bars(&map(Bar::new(Utc::now(), 103.0, 105.0, 101.0, 104.0, 10))).unwrap();
        let synthesized = &closed["rb2501.SHFE"];
        assert_eq!(synthesized.high, 110.0);
        assert_eq!(synthesized.low, 95.0);
        assert_eq!(synthesized.open, 100.0);
    }
}
