//! Schema migration chain for [`super::snapshot::StateSnapshot`].
//!
//! Migrations operate on the snapshot's untyped JSON representation so that
//! a step can add, rename or drop a field without `StateSnapshot` itself
//! needing to keep every historical shape around as a distinct Rust type.
//! Steps are registered by the *source* version they apply to (`from`);
//! `migrate` walks `from..to` one step at a time, so applying `N -> M`
//! directly is defined to equal applying `N -> N+1 -> ... -> M`.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{Result, RuntimeError};

pub type MigrationFn = fn(Value) -> Result<Value>;

#[derive(Default)]
pub struct MigrationChain {
    steps: BTreeMap<u32, MigrationFn>,
}

impl MigrationChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the step that upgrades data at schema version `from` to
    /// `from + 1`. A second registration for the same `from` is rejected
    /// rather than silently replacing the first.
    pub fn register(&mut self, from: u32, step: MigrationFn) -> Result<()> {
        if self.steps.contains_key(&from) {
            return Err(RuntimeError::Migration {
                from,
                to: from + 1,
                reason: format!("migration step for version {from} is already registered"),
            });
        }
        self.steps.insert(from, step);
        Ok(())
    }

    /// Applies every registered step from `data`'s declared version up to
    /// `to`, in order. A gap in the chain (no step registered for some
    /// intermediate version) is an error rather than a silent skip.
    pub fn migrate(&self, mut data: Value, from: u32, to: u32) -> Result<Value> {
        if from == to {
            return Ok(data);
        }
        if from > to {
            return Err(RuntimeError::Migration {
                from,
                to,
                reason: "cannot migrate backwards".to_string(),
            });
        }

        let mut version = from;
        while version < to {
            let Some(step) = self.steps.get(&version) else {
                return Err(RuntimeError::Migration {
                    from,
                    to,
                    reason: format!("no migration registered for version {version}"),
                });
            };
            data = step(data)?;
            version += 1;
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add_saved_at(mut data: Value) -> Result<Value> {
        data["saved_at"] = json!("1970-01-01T00:00:00Z");
        Ok(data)
    }

    fn rename_positions(mut data: Value) -> Result<Value> {
        if let Some(obj) = data.as_object_mut() {
            if let Some(v) = obj.remove("positions") {
                obj.insert("position_aggregate".to_string(), v);
            }
        }
        Ok(data)
    }

    #[test]
    fn same_version_is_identity() {
        let chain = MigrationChain::new();
        let data = json!({"a": 1});
        assert_eq!(chain.migrate(data.clone(), 3, 3).unwrap(), data);
    }

    #[test]
    fn multi_step_chain_applies_in_order() {
        let mut chain = MigrationChain::new();
        chain.register(1, add_saved_at).unwrap();
        chain.register(2, rename_positions).unwrap();

        let data = json!({"positions": {"a": 1}});
        let migrated = chain.migrate(data, 1, 3).unwrap();

        assert_eq!(migrated["saved_at"], json!("1970-01-01T00:00:00Z"));
        assert_eq!(migrated["position_aggregate"], json!({"a": 1}));
        assert!(migrated.get("positions").is_none());
    }

    #[test]
    fn direct_jump_equals_stepwise_application() {
        let mut chain = MigrationChain::new();
        chain.register(1, add_saved_at).unwrap();
        chain.register(2, rename_positions).unwrap();

        let data = json!({"positions": {"a": 1}});
        let direct = chain.migrate(data.clone(), 1, 3).unwrap();

        let step_a = chain.migrate(data, 1, 2).unwrap();
        let stepwise = chain.migrate(step_a, 2, 3).unwrap();

        assert_eq!(direct, stepwise);
    }

    #[test]
    fn gap_in_chain_is_an_error() {
        let mut chain = MigrationChain::new();
        chain.register(1, add_saved_at).unwrap();
        // no step registered for version 2
        let data = json!({});
        assert!(chain.migrate(data, 1, 3).is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut chain = MigrationChain::new();
        chain.register(1, add_saved_at).unwrap();
        assert!(chain.register(1, rename_positions).is_err());
    }
}
