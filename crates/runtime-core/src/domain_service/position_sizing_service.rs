//! Fixed-1-lot position sizing and the daily/ contract open-volume gates
//! that decide whether `_execute_open` is even allowed to ask a gateway for
//! a fill.
//!
//! This is deliberately the simplest possible sizer: one lot per signal, no
//! volatility scaling, no account-equity weighting. The reject rules are
//! the interesting part — they are what keeps a divergence-happy strategy
//! from stacking unbounded risk into a single name or a single day.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSizingConfig {
    pub max_positions: usize,
    pub global_daily_limit: i64,
    pub per_contract_limit: i64,
}

impl Default for PositionSizingConfig {
    fn default() -> Self {
        Self { max_positions: 10, global_daily_limit: 50, per_contract_limit: 2 }
    }
}

/// Why `size_open` refused to produce a volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingRejection {
    MaxPositionsReached,
    SameSymbolAlreadyActive,
    GlobalDailyLimitReached,
    ContractDailyLimitReached,
    InvalidContractPrice,
}

#[derive(Debug, Clone, Default)]
pub struct PositionSizingService {
    config: PositionSizingConfig,
}

impl PositionSizingService {
    pub fn new(config: PositionSizingConfig) -> Self {
        Self { config }
    }

    /// Fixed 1-lot sizing, gated on the five reference reject conditions.
    /// `active_positions_count` and `same_symbol_active` describe the
    /// aggregate's current book; `today_open_count_global`/
    /// `today_open_count_contract` are the volumes already opened today
    /// before this signal, not counting the lot this call would add.
    pub fn size_open(
        &self,
        active_positions_count: usize,
        same_symbol_active: bool,
        today_open_count_global: i64,
        today_open_count_contract: i64,
        contract_price: f64,
    ) -> Result<i64, SizingRejection> {
        if active_positions_count >= self.config.max_positions {
            return Err(SizingRejection::MaxPositionsReached);
        }
        if same_symbol_active {
            return Err(SizingRejection::SameSymbolAlreadyActive);
        }
        if today_open_count_global + 1 > self.config.global_daily_limit {
            return Err(SizingRejection::GlobalDailyLimitReached);
        }
        if today_open_count_contract + 1 > self.config.per_contract_limit {
            return Err(SizingRejection::ContractDailyLimitReached);
        }
        if contract_price <= 0.0 {
            return Err(SizingRejection::InvalidContractPrice);
        }
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svc() -> PositionSizingService {
        PositionSizingService::new(PositionSizingConfig::default())
    }

    #[test]
    fn approves_a_single_lot_when_all_gates_pass() {
        assert_eq!(svc().size_open(0, false, 0, 0, 125.0), Ok(1));
    }

    #[test]
    fn rejects_when_max_positions_reached() {
        let config = PositionSizingConfig { max_positions: 2, ..Default::default() };
        let svc = PositionSizingService::new(config);
        assert_eq!(svc.size_open(2, false, 0, 0, 125.0), Err(SizingRejection::MaxPositionsReached));
    }

    #[test]
    fn rejects_when_same_symbol_already_active() {
        assert_eq!(svc().size_open(0, true, 0, 0, 125.0), Err(SizingRejection::SameSymbolAlreadyActive));
    }

    #[test]
    fn rejects_at_the_global_daily_limit() {
        assert_eq!(svc().size_open(0, false, 50, 0, 125.0), Err(SizingRejection::GlobalDailyLimitReached));
    }

    #[test]
    fn rejects_at_the_per_contract_limit() {
        assert_eq!(svc().size_open(0, false, 0, 2, 125.0), Err(SizingRejection::ContractDailyLimitReached));
    }

    #[test]
    fn rejects_non_positive_contract_price() {
        assert_eq!(svc().size_open(0, false, 0, 0, 0.0), Err(SizingRejection::InvalidContractPrice));
    }
}
