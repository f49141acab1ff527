pub mod database;
pub mod history_repository;
pub mod import;
pub mod models;

pub use database::{Database, DatabaseError, Result};
pub use history_repository::replay_bars_from_database;
pub use import::{CsvImporter, ImportError, ImportSummary};
pub use models::{BarRecord, Tick};
