//! Webhook delivery for domain events.
//!
//! Subscribes to the categories it cares about on the [`crate::events::EventBus`],
//! formats a short message per category, and posts it to a single outbound
//! webhook URL. Never blocks the pipeline on a slow or failing endpoint
//! beyond the blocking HTTP call itself: failures are logged and swallowed,
//! and a minimum inter-send interval keeps a noisy event category from
//! flooding the channel.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::events::DomainEvent;

/// Configuration for [`Notifier`].
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub webhook_url: String,
    /// Minimum time between two outbound sends, regardless of how many
    /// events queued up in between.
    pub min_interval: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self { webhook_url: String::new(), min_interval: Duration::from_secs(5) }
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    category: &'a str,
    message: String,
}

/// Rate-limited webhook sink. Holds a blocking [`reqwest::blocking::Client`]
/// since delivery happens on the same single-threaded pipeline worker that
/// owns the aggregates, per the one-outbound-channel resource model.
pub struct Notifier {
    config: NotifierConfig,
    client: reqwest::blocking::Client,
    last_sent: Option<Instant>,
}

impl Notifier {
    pub fn new(config: NotifierConfig) -> Self {
        Self { config, client: reqwest::blocking::Client::new(), last_sent: None }
    }

    /// Formats and sends `event`'s message if the rate limiter allows it
    /// right now. Returns whether a send was attempted (not whether it
    /// succeeded: delivery failures are logged and swallowed per §4.G).
    pub fn notify(&mut self, event: &DomainEvent) -> bool {
        if !self.can_send_now() {
            return false;
        }
        let message = format_message(event);
        self.send(event.category(), message);
        self.last_sent = Some(Instant::now());
        true
    }

    /// Sends a free-form alert outside the `DomainEvent` vocabulary, e.g.
    /// the open/close-signal alerts `_execute_open`/`_execute_close` raise
    /// directly rather than through the event queue.
    pub fn notify_raw(&mut self, category: &str, message: impl Into<String>) -> bool {
        if !self.can_send_now() {
            return false;
        }
        self.send(category, message.into());
        self.last_sent = Some(Instant::now());
        true
    }

    fn can_send_now(&self) -> bool {
        match self.last_sent {
            None => true,
            Some(last) => last.elapsed() >= self.config.min_interval,
        }
    }

    fn send(&self, category: &str, message: String) {
        if self.config.webhook_url.is_empty() {
            return;
        }
        let payload = WebhookPayload { category, message };
        let result = self.client.post(&self.config.webhook_url).json(&payload).send();
        if let Err(err) = result {
            tracing::warn!(category, error = %err, "webhook delivery failed");
        }
    }
}

/// Per-category message template. Mirrors the event's own fields so an
/// operator reading the alert channel doesn't need to cross-reference logs.
fn format_message(event: &DomainEvent) -> String {
    match event {
        DomainEvent::ManualCloseDetected { vt_symbol, volume, .. } => {
            format!("manual close detected on {vt_symbol}: {volume} lots closed outside the strategy")
        }
        DomainEvent::ManualOpenDetected { vt_symbol, volume, .. } => {
            format!("manual open detected on {vt_symbol}: {volume} extra lots reported by the exchange")
        }
        DomainEvent::RiskLimitExceeded { vt_symbol, limit_type, current_volume, limit_volume } => {
            format!("{limit_type:?} open-volume limit exceeded on {vt_symbol}: {current_volume}/{limit_volume}")
        }
        DomainEvent::GreeksRiskBreach { level, greek_name, current_value, limit_value } => {
            format!("{level:?} {greek_name:?} risk breach: {current_value:.2} vs limit {limit_value:.2}")
        }
        DomainEvent::HedgeExecuted { hedge_volume, hedge_direction, hedge_instrument, .. } => {
            format!("delta hedge executed: {hedge_direction:?} {hedge_volume} {hedge_instrument}")
        }
        DomainEvent::GammaScalpExecuted { rebalance_volume, rebalance_direction, hedge_instrument, .. } => {
            format!("gamma scalp executed: {rebalance_direction:?} {rebalance_volume} {hedge_instrument}")
        }
        DomainEvent::IcebergComplete { vt_symbol, total_volume, .. } => {
            format!("iceberg order complete on {vt_symbol}: {total_volume} lots filled")
        }
        DomainEvent::IcebergCancelled { vt_symbol, filled_volume, remaining_volume, .. } => {
            format!("iceberg order cancelled on {vt_symbol}: {filled_volume} filled, {remaining_volume} unfilled")
        }
        DomainEvent::TwapComplete { vt_symbol, total_volume, .. } => {
            format!("TWAP order complete on {vt_symbol}: {total_volume} lots filled")
        }
        DomainEvent::VwapComplete { vt_symbol, total_volume, .. } => {
            format!("VWAP order complete on {vt_symbol}: {total_volume} lots filled")
        }
        DomainEvent::RolloverExecuted { product_code, from_vt_symbol, to_vt_symbol, .. } => {
            format!("dominant contract rollover for {product_code}: {from_vt_symbol} -> {to_vt_symbol}")
        }
        DomainEvent::OrderTimeout { vt_orderid, vt_symbol, .. } => {
            format!("order {vt_orderid} on {vt_symbol} timed out unfilled")
        }
        DomainEvent::OrderRetryExhausted { vt_orderid, vt_symbol, retry_count, .. } => {
            format!("order {vt_orderid} on {vt_symbol} exhausted {retry_count} retries")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_event() -> DomainEvent {
        DomainEvent::OrderTimeout { vt_orderid: "o1".to_string(), vt_symbol: "rb2501.SHFE".to_string(), timestamp: Utc::now() }
    }

    #[test]
    fn formats_a_readable_message_per_category() {
        let msg = format_message(&sample_event());
        assert!(msg.contains("o1"));
        assert!(msg.contains("rb2501.SHFE"));
    }

    #[test]
    fn rate_limiter_blocks_a_second_send_within_the_window() {
        let mut notifier = Notifier::new(NotifierConfig { webhook_url: String::new(), min_interval: Duration::from_secs(60) });
        assert!(notifier.notify(&sample_event()));
        assert!(!notifier.notify(&sample_event()));
    }

    #[test]
    fn notify_raw_sends_under_a_custom_category() {
        let mut notifier = Notifier::new(NotifierConfig::default());
        assert!(notifier.notify_raw("open_signal", "opened rb2501.SHFE on long_bottom_divergence"));
    }

    #[test]
    fn empty_webhook_url_is_a_silent_no_op() {
        let mut notifier = Notifier::new(NotifierConfig::default());
        // Should not panic even though there is nowhere to send.
        assert!(notifier.notify(&sample_event()));
    }
}
