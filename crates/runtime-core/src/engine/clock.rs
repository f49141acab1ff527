//! Time source abstraction: live trading reads the wall clock, backtests
//! and tests pin it to the latest bar's timestamp.

use chrono::{DateTime, Utc};

pub trait Clock: std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, for live and paper trading.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually. The backtest
/// driver sets it to each bar's timestamp before feeding the bar into the
/// pipeline; tests use it to exercise timeout/rollover logic deterministically.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_what_it_was_set_to() {
        let t = Utc::now();
        let mut clock = FixedClock::new(t);
        assert_eq!(clock.now(), t);
        let later = t + chrono::Duration::minutes(1);
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
