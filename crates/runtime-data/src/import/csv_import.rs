use anyhow::{Context, Result};
use csv::Reader;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::validator::{validate_bar_data, ValidationError};
use crate::database::Database;
use crate::models::BarRecord;

const BATCH_SIZE: usize = 1000;
const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024; // 100MB

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("File too large: {0} bytes (max: {MAX_FILE_SIZE} bytes)")]
    FileTooLarge(u64),

    #[error("Line {line}: {error}")]
    ParseError { line: usize, error: String },

    #[error("Line {line}: validation failed: {error}")]
    ValidationError { line: usize, error: ValidationError },

    #[error("Database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub file_path: PathBuf,
    pub total_rows: usize,
    pub rows_imported: usize,
    pub rows_skipped: usize,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl ImportSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.rows_imported as f64 / self.total_rows as f64) * 100.0
        }
    }
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    symbol: String,
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: i64,
}

/// Loads historical bars from CSV into the bar store, for warm-up replay and
/// the backtest driver's `load_bars`.
pub struct CsvImporter {
    database: Database,
}

impl CsvImporter {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    pub fn import_file(&mut self, path: &Path) -> Result<ImportSummary> {
        let start_time = Instant::now();

        let metadata = std::fs::metadata(path)?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(ImportError::FileTooLarge(metadata.len()).into());
        }

        info!("Starting bar CSV import from: {}", path.display());

        let file =
            File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;

        let mut reader = Reader::from_reader(file);
        let mut batch = Vec::with_capacity(BATCH_SIZE);
        let mut total_rows = 0;
        let mut rows_imported = 0;
        let mut rows_skipped = 0;
        let mut errors = Vec::new();

        for (line_num, result) in reader.deserialize::<CsvRow>().enumerate() {
            total_rows += 1;
            let line = line_num + 2; // header + 1-based indexing

            match result {
                Ok(row) => {
                    if let Err(e) = validate_bar_data(
                        Some(&row.symbol),
                        Some(&row.timestamp),
                        row.open,
                        row.high,
                        row.low,
                        row.close,
                        row.volume,
                    ) {
                        warn!("Line {}: Validation failed: {}", line, e);
                        errors.push(format!("Line {}: {}", line, e));
                        rows_skipped += 1;
                        continue;
                    }

                    let timestamp = match parse_timestamp(&row.timestamp) {
                        Ok(ts) => ts,
                        Err(e) => {
                            warn!("Line {}: Invalid timestamp '{}': {}", line, row.timestamp, e);
                            errors.push(format!("Line {}: Invalid timestamp: {}", line, e));
                            rows_skipped += 1;
                            continue;
                        }
                    };

                    let bar = BarRecord {
                        id: None,
                        symbol: row.symbol,
                        timestamp,
                        open: row.open,
                        high: row.high,
                        low: row.low,
                        close: row.close,
                        volume: row.volume,
                    };

                    batch.push(bar);

                    if batch.len() >= BATCH_SIZE {
                        match self.database.insert_bars(&batch) {
                            Ok(_) => {
                                rows_imported += batch.len();
                                debug!("Imported batch of {} bars", batch.len());
                            }
                            Err(e) => {
                                error!("Failed to insert batch: {}", e);
                                errors.push(format!("Batch insert failed at line {}: {}", line, e));
                                rows_skipped += batch.len();
                            }
                        }
                        batch.clear();
                    }
                }
                Err(e) => {
                    warn!("Line {}: Failed to parse CSV row: {}", line, e);
                    errors.push(format!("Line {}: Parse error: {}", line, e));
                    rows_skipped += 1;
                }
            }

            if total_rows % 10000 == 0 {
                info!("Processed {} rows...", total_rows);
            }
        }

        if !batch.is_empty() {
            match self.database.insert_bars(&batch) {
                Ok(_) => {
                    rows_imported += batch.len();
                    debug!("Imported final batch of {} bars", batch.len());
                }
                Err(e) => {
                    error!("Failed to insert final batch: {}", e);
                    errors.push(format!("Final batch insert failed: {}", e));
                    rows_skipped += batch.len();
                }
            }
        }

        let duration = start_time.elapsed();

        let summary = ImportSummary {
            file_path: path.to_path_buf(),
            total_rows,
            rows_imported,
            rows_skipped,
            errors: errors.into_iter().take(100).collect(),
            duration,
        };

        info!(
            "Import completed: {} rows imported, {} skipped ({}% success rate) in {:?}",
            summary.rows_imported,
            summary.rows_skipped,
            summary.success_rate(),
            summary.duration
        );

        Ok(summary)
    }
}

fn parse_timestamp(timestamp_str: &str) -> Result<i64> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(timestamp_str) {
        return Ok(dt.timestamp_millis());
    }

    if let Ok(ts) = timestamp_str.parse::<i64>() {
        if ts > 946_684_800 && ts < 4_102_444_800 {
            return Ok(ts * 1000);
        }
        if ts > 946_684_800_000 && ts < 4_102_444_800_000 {
            return Ok(ts);
        }
    }

    anyhow::bail!("Unsupported timestamp format: {}", timestamp_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_db() -> Database {
        Database::new_memory().expect("Failed to create test database")
    }

    fn create_csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file
    }

    #[test]
    fn test_parse_timestamp_iso8601() {
        let ts = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(ts, 1704067200000);
    }

    #[test]
    fn test_parse_timestamp_unix_seconds() {
        let ts = parse_timestamp("1704067200").unwrap();
        assert_eq!(ts, 1704067200000);
    }

    #[test]
    fn test_import_valid_csv() {
        let csv_content = r#"symbol,timestamp,open,high,low,close,volume
IM2601.CFFEX,2024-01-01T00:00:00Z,6290.0,6295.0,6285.0,6292.0,500
IM2601.CFFEX,2024-01-01T00:01:00Z,6292.0,6298.0,6290.0,6296.0,600
IM2601.CFFEX,2024-01-01T00:02:00Z,6296.0,6300.0,6291.0,6293.0,550"#;

        let csv_file = create_csv_file(csv_content);
        let db = create_test_db();
        let mut importer = CsvImporter::new(db);

        let summary = importer.import_file(csv_file.path()).unwrap();

        assert_eq!(summary.total_rows, 3);
        assert_eq!(summary.rows_imported, 3);
        assert_eq!(summary.rows_skipped, 0);
        assert_eq!(summary.success_rate(), 100.0);
    }

    #[test]
    fn test_import_with_invalid_rows() {
        let csv_content = r#"symbol,timestamp,open,high,low,close,volume
IM2601.CFFEX,2024-01-01T00:00:00Z,6290.0,6295.0,6285.0,6292.0,500
IM2601.CFFEX,invalid-timestamp,6292.0,6298.0,6290.0,6296.0,600
IM2601.CFFEX,2024-01-01T00:02:00Z,-6296.0,6300.0,6291.0,6293.0,550
IM2601.CFFEX,2024-01-01T00:03:00Z,6293.0,6299.0,6290.0,6297.0,400"#;

        let csv_file = create_csv_file(csv_content);
        let db = create_test_db();
        let mut importer = CsvImporter::new(db);

        let summary = importer.import_file(csv_file.path()).unwrap();

        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.rows_imported, 2);
        assert_eq!(summary.rows_skipped, 2);
        assert_eq!(summary.errors.len(), 2);
        assert_eq!(summary.success_rate(), 50.0);
    }

    #[test]
    fn test_import_empty_file() {
        let csv_content = "symbol,timestamp,open,high,low,close,volume\n";

        let csv_file = create_csv_file(csv_content);
        let db = create_test_db();
        let mut importer = CsvImporter::new(db);

        let summary = importer.import_file(csv_file.path()).unwrap();

        assert_eq!(summary.total_rows, 0);
        assert_eq!(summary.rows_imported, 0);
        assert_eq!(summary.rows_skipped, 0);
    }
}
