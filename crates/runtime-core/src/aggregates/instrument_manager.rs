//! InstrumentManager aggregate: read-only market-data container.
//!
//! Owns every [`TargetInstrument`] the strategy has ever seen a bar for,
//! plus the currently dominant contract per product (for rollover). It
//! never emits domain events — it is pure state, updated by the pipeline
//! on bar arrival and consulted by every domain service that needs price
//! history or indicator state.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::TargetInstrument;
use crate::value_objects::Bar;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstrumentManager {
    instruments: HashMap<String, TargetInstrument>,
    active_contracts: HashMap<String, String>,
}

impl InstrumentManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_active_contract(&mut self, product: impl Into<String>, vt_symbol: impl Into<String>) {
        self.active_contracts.insert(product.into(), vt_symbol.into());
    }

    pub fn active_contract(&self, product: &str) -> Option<&str> {
        self.active_contracts.get(product).map(|s| s.as_str())
    }

    pub fn all_active_contracts(&self) -> Vec<String> {
        self.active_contracts.values().cloned().collect()
    }

    pub fn instrument(&self, vt_symbol: &str) -> Option<&TargetInstrument> {
        self.instruments.get(vt_symbol)
    }

    pub fn instrument_mut(&mut self, vt_symbol: &str) -> Option<&mut TargetInstrument> {
        self.instruments.get_mut(vt_symbol)
    }

    pub fn get_or_create(&mut self, vt_symbol: &str) -> &mut TargetInstrument {
        self.instruments
            .entry(vt_symbol.to_string())
            .or_insert_with(|| TargetInstrument::new(vt_symbol))
    }

    /// Appends one bar to the named instrument, creating it first if this
    /// is the first bar ever seen for that symbol.
    pub fn update_bar(&mut self, vt_symbol: &str, bar: Bar) -> &mut TargetInstrument {
        let instrument = self.get_or_create(vt_symbol);
        instrument.append_bar(bar);
        instrument
    }

    pub fn bar_history(&self, vt_symbol: &str, n: usize) -> Vec<Bar> {
        self.instruments
            .get(vt_symbol)
            .map(|i| i.bar_history(n))
            .unwrap_or_default()
    }

    pub fn latest_price(&self, vt_symbol: &str) -> f64 {
        self.instruments.get(vt_symbol).map(|i| i.latest_close()).unwrap_or(0.0)
    }

    pub fn all_symbols(&self) -> Vec<String> {
        self.instruments.keys().cloned().collect()
    }

    pub fn has_instrument(&self, vt_symbol: &str) -> bool {
        self.instruments.contains_key(vt_symbol)
    }

    pub fn has_enough_data(&self, vt_symbol: &str) -> bool {
        self.instruments.get(vt_symbol).map(|i| i.has_enough_data()).unwrap_or(false)
    }

    pub fn clear(&mut self) {
        self.instruments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn bar(close: f64) -> Bar {
        Bar::new(Utc::now(), close, close + 1.0, close - 1.0, close, 10)
    }

    #[test]
    fn get_or_create_is_idempotent() {
        let mut mgr = InstrumentManager::new();
        mgr.get_or_create("rb2501.SHFE");
        mgr.get_or_create("rb2501.SHFE");
        assert_eq!(mgr.all_symbols().len(), 1);
    }

    #[test]
    fn update_bar_tracks_latest_price() {
        let mut mgr = InstrumentManager::new();
        mgr.update_bar("rb2501.SHFE", bar(3500.0));
        mgr.update_bar("rb2501.SHFE", bar(3520.0));
        assert!((mgr.latest_price("rb2501.SHFE") - 3520.0).abs() < 1e-9);
    }

    #[test]
    fn active_contract_tracking() {
        let mut mgr = InstrumentManager::new();
        mgr.set_active_contract("rb", "rb2501.SHFE");
        assert_eq!(mgr.active_contract("rb"), Some("rb2501.SHFE"));
        mgr.set_active_contract("rb", "rb2505.SHFE");
        assert_eq!(mgr.active_contract("rb"), Some("rb2505.SHFE"));
    }

    #[test]
    fn unknown_symbol_reports_zero_price_and_no_data() {
        let mgr = InstrumentManager::new();
        assert_eq!(mgr.latest_price("unknown"), 0.0);
        assert!(!mgr.has_enough_data("unknown"));
    }
}
