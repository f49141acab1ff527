//! Expiry-date calculation for futures/option contract months.
//!
//! Exchange-specific rules, keyed off the product code's exchange (see
//! [`crate::value_objects::product_exchange`]); manual overrides always
//! win, and an unrecognized product falls back to the 15th calendar day
//! of the contract month. Trading-day arithmetic here only excludes
//! weekends — there is no exchange holiday feed wired in, so a "trading
//! day" is any Mon-Fri date. This is a deliberate simplification, not a
//! guess at ambiguous source behavior (see DESIGN.md).

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::value_objects::{product_exchange, Exchange};

#[derive(Debug, Clone, Default)]
pub struct ExpiryCalendar {
    manual_overrides: HashMap<(String, i32, u32), NaiveDate>,
}

impl ExpiryCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, product_code: impl Into<String>, year: i32, month: u32, date: NaiveDate) -> Self {
        self.manual_overrides.insert((product_code.into(), year, month), date);
        self
    }

    pub fn set_override(&mut self, product_code: impl Into<String>, year: i32, month: u32, date: NaiveDate) {
        self.manual_overrides.insert((product_code.into(), year, month), date);
    }

    /// Computes the expiry date for `product_code`'s `(year, month)`
    /// contract. Never fails: an unrecognized product or a month with no
    /// resolvable trading day falls back to a calendar-day rule.
    pub fn calculate(&self, product_code: &str, year: i32, month: u32) -> NaiveDate {
        if let Some(&date) = self.manual_overrides.get(&(product_code.to_string(), year, month)) {
            return date;
        }

        match product_exchange(product_code) {
            Some(Exchange::Cffex) => third_friday(year, month).unwrap_or_else(|| fifteenth(year, month)),
            Some(Exchange::Dce) => {
                let (py, pm) = prev_month(year, month);
                nth_trading_day(py, pm, 12).unwrap_or_else(|| fifteenth(year, month))
            }
            Some(Exchange::Czce) => {
                let (py, pm) = prev_month(year, month);
                nth_trading_day(py, pm, 15).unwrap_or_else(|| fifteenth(year, month))
            }
            Some(Exchange::Shfe) | Some(Exchange::Ine) => {
                let (py, pm) = prev_month(year, month);
                nth_trading_day_from_end(py, pm, 5).unwrap_or_else(|| fifteenth(year, month))
            }
            _ => fifteenth(year, month),
        }
    }
}

fn fifteenth(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 15).expect("15 is valid in every month")
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn is_trading_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next_first = NaiveDate::from_ymd_opt(ny, nm, 1).expect("valid next month");
    (next_first - NaiveDate::from_ymd_opt(year, month, 1).expect("valid month")).num_days() as u32
}

/// The `n`th trading day of `(year, month)`, counting from day 1. Falls
/// back to the last trading day of the month if the month has fewer than
/// `n` trading days (preserves the reference implementation's "use the
/// last element as fallback" behavior — see DESIGN.md open question).
fn nth_trading_day(year: i32, month: u32, n: u32) -> Option<NaiveDate> {
    let total_days = days_in_month(year, month);
    let mut trading_days = Vec::new();
    for day in 1..=total_days {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if is_trading_day(date) {
            trading_days.push(date);
        }
    }
    if trading_days.is_empty() {
        return None;
    }
    let idx = (n as usize).saturating_sub(1).min(trading_days.len() - 1);
    Some(trading_days[idx])
}

/// The `n`th trading day counting from the end of `(year, month)`
/// (`n=1` is the last trading day).
fn nth_trading_day_from_end(year: i32, month: u32, n: u32) -> Option<NaiveDate> {
    let total_days = days_in_month(year, month);
    let mut trading_days = Vec::new();
    for day in 1..=total_days {
        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        if is_trading_day(date) {
            trading_days.push(date);
        }
    }
    if trading_days.is_empty() {
        return None;
    }
    let idx = trading_days.len().saturating_sub(n as usize);
    Some(trading_days[idx])
}

/// The third Friday of `(year, month)`, rolled forward a day at a time
/// while it lands on a non-trading day.
fn third_friday(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (7 + Weekday::Fri.num_days_from_monday() - first.weekday().num_days_from_monday()) % 7;
    let first_friday = first + Duration::days(offset as i64);
    let candidate = first_friday + Duration::days(14);

    let mut date = candidate;
    while !is_trading_day(date) {
        date += Duration::days(1);
    }
    Some(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cffex_expiry_is_third_friday() {
        let cal = ExpiryCalendar::new();
        let date = cal.calculate("IF", 2025, 1);
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 1, 17).unwrap());
        assert_eq!(date.weekday(), Weekday::Fri);
    }

    #[test]
    fn czce_expiry_falls_in_prior_month() {
        let cal = ExpiryCalendar::new();
        let date = cal.calculate("SA", 2025, 6);
        assert_eq!(date.year(), 2025);
        assert_eq!(date.month(), 5);
    }

    #[test]
    fn dce_expiry_falls_in_prior_month() {
        let cal = ExpiryCalendar::new();
        let date = cal.calculate("a", 2025, 6);
        assert_eq!(date.month(), 5);
    }

    #[test]
    fn shfe_expiry_is_near_prior_month_end() {
        let cal = ExpiryCalendar::new();
        let date = cal.calculate("rb", 2025, 6);
        assert_eq!(date.month(), 5);
    }

    #[test]
    fn unknown_product_falls_back_to_fifteenth() {
        let cal = ExpiryCalendar::new();
        let date = cal.calculate("ZZ", 2025, 3);
        assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }

    #[test]
    fn manual_override_takes_precedence() {
        let override_date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let cal = ExpiryCalendar::new().with_override("IF", 2025, 1, override_date);
        assert_eq!(cal.calculate("IF", 2025, 1), override_date);
    }
}
