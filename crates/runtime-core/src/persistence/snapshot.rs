//! The schema-versioned state snapshot persisted to disk between runs.
//!
//! A `StateSnapshot` is the unit the runtime writes on its periodic
//! auto-save cadence and on clean shutdown, and the unit warm-up replay
//! restores from before any bar is reprocessed. Round-trip equality
//! (`from_snapshot(to_snapshot(x)) == x`) is required of every aggregate it
//! wraps — see the `snapshot_round_trip` tests on [`crate::aggregates`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregates::{InstrumentManager, PositionAggregate};

/// The current on-disk schema version. Bump this and register a migration
/// step in [`super::migration::MigrationChain`] whenever a field is added,
/// renamed, or removed from [`StateSnapshot`] or anything it contains.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub target_aggregate: InstrumentManager,
    pub position_aggregate: PositionAggregate,
}

impl StateSnapshot {
    pub fn new(target_aggregate: InstrumentManager, position_aggregate: PositionAggregate, saved_at: DateTime<Utc>) -> Self {
        Self { version: CURRENT_SCHEMA_VERSION, saved_at, target_aggregate, position_aggregate }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let mut targets = InstrumentManager::new();
        targets.set_active_contract("rb", "rb2501.SHFE");
        let positions = PositionAggregate::new();

        let snapshot = StateSnapshot::new(targets, positions, Utc::now());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: StateSnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(snapshot, back);
    }
}
