//! State snapshots, schema migration, and failure-tolerant auto-save.
//!
//! Three pieces compose into the runtime's persistence story: a
//! [`StateSnapshot`] (the schema-versioned on-disk shape of the two
//! aggregates), a [`StateRepository`] (atomic temp-file-then-rename
//! save/load), and an [`AutoSaveService`] (the periodic-save policy the
//! pipeline drives each cycle). [`MigrationChain`] upgrades an older
//! snapshot's JSON before it is deserialized into the current
//! [`StateSnapshot`] shape.

pub mod autosave;
pub mod migration;
pub mod repository;
pub mod snapshot;

pub use autosave::AutoSaveService;
pub use migration::MigrationChain;
pub use repository::StateRepository;
pub use snapshot::{StateSnapshot, CURRENT_SCHEMA_VERSION};
