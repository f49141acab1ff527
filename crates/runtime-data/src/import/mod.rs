pub mod csv_import;
pub mod validator;

pub use csv_import::{CsvImporter, ImportError, ImportSummary};
pub use validator::{validate_bar_data, ValidationError};
