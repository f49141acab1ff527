//! Picks the dominant (front-month) contract for a product and decides
//! when to roll to the next month.

use chrono::NaiveDate;

use super::contract_factory::ContractFactory;
use super::expiry_calendar::ExpiryCalendar;
use crate::value_objects::{ParsedSymbol, SelectedContract};

/// Contracts within this many days of expiry trigger a rollover to the
/// next listed month, provided one exists.
pub const ROLLOVER_THRESHOLD_DAYS: i64 = 7;

#[derive(Debug, Clone, Default)]
pub struct FutureSelectionService {
    expiry_calendar: ExpiryCalendar,
    contract_factory: ContractFactory,
}

impl FutureSelectionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_calendar(expiry_calendar: ExpiryCalendar) -> Self {
        Self { expiry_calendar, contract_factory: ContractFactory::new() }
    }

    /// Selects the dominant contract among `contracts` (all live listings
    /// for one product) as of `today`. Contracts are sorted lexicographically
    /// and the front month is picked; if it is within
    /// [`ROLLOVER_THRESHOLD_DAYS`] of expiry and a later month is listed,
    /// the next one is selected instead. Returns `None` for an empty list.
    pub fn select_dominant_contract(&self, contracts: &[String], today: NaiveDate) -> Option<SelectedContract> {
        if contracts.is_empty() {
            return None;
        }

        let mut sorted: Vec<&String> = contracts.iter().collect();
        sorted.sort();

        let front = sorted[0];
        let front_days = self.days_to_expiry(front, today);

        if front_days <= ROLLOVER_THRESHOLD_DAYS && sorted.len() > 1 {
            let next = sorted[1];
            let next_days = self.days_to_expiry(next, today);
            return Some(SelectedContract { vt_symbol: next.clone(), days_to_expiry: next_days, rolled_over: true });
        }

        Some(SelectedContract { vt_symbol: front.clone(), days_to_expiry: front_days, rolled_over: false })
    }

    fn days_to_expiry(&self, vt_symbol: &str, today: NaiveDate) -> i64 {
        match self.contract_factory.create(vt_symbol) {
            ParsedSymbol::Future(future) => {
                let expiry = self.expiry_calendar.calculate(&future.product_code, future.year, future.month);
                (expiry - today).num_days()
            }
            ParsedSymbol::Option(_) => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_expiry_rolls_to_next_month() {
        let svc = FutureSelectionService::new();
        let contracts = vec!["rb2501.SHFE".to_string(), "rb2505.SHFE".to_string()];
        let selected = svc.select_dominant_contract(&contracts, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()).unwrap();
        assert_eq!(selected.vt_symbol, "rb2505.SHFE");
        assert!(selected.rolled_over);
    }

    #[test]
    fn far_from_expiry_keeps_front_month() {
        let svc = FutureSelectionService::new();
        let contracts = vec!["rb2501.SHFE".to_string(), "rb2505.SHFE".to_string()];
        let selected = svc.select_dominant_contract(&contracts, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()).unwrap();
        assert_eq!(selected.vt_symbol, "rb2501.SHFE");
        assert!(!selected.rolled_over);
    }

    #[test]
    fn empty_universe_returns_none() {
        let svc = FutureSelectionService::new();
        assert!(svc.select_dominant_contract(&[], NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()).is_none());
    }

    #[test]
    fn single_contract_near_expiry_cannot_roll() {
        let svc = FutureSelectionService::new();
        let contracts = vec!["rb2501.SHFE".to_string()];
        let selected = svc.select_dominant_contract(&contracts, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()).unwrap();
        assert_eq!(selected.vt_symbol, "rb2501.SHFE");
        assert!(!selected.rolled_over);
    }
}
