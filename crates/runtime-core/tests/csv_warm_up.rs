//! Exercises the full warm-up path the standalone worker and backtest driver
//! both use: CSV import into the bar store, replay back out in timestamp
//! order, and feeding that replay into a pipeline's warm-up phase.

use std::collections::HashMap;
use std::io::Write;

use chrono::{Duration as ChronoDuration, Utc};
use runtime_core::domain_service::{OptionSelectorConfig, PositionSizingConfig};
use runtime_core::engine::{PipelineConfig, SystemClock, TradingPipeline};
use runtime_core::gateway::backtest::BacktestGateway;
use runtime_core::value_objects::{Bar, OrderExecutionConfig};
use runtime_data::{replay_bars_from_database, CsvImporter, Database};

#[test]
fn imported_csv_bars_replay_into_a_warmed_up_pipeline() {
    let mut csv_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(csv_file, "symbol,timestamp,open,high,low,close,volume").unwrap();

    let base = Utc::now() - ChronoDuration::days(1);
    for i in 0..40 {
        let ts = base + ChronoDuration::minutes(i);
        writeln!(
            csv_file,
            "rb2601.SHFE,{},{},{},{},{},{}",
            ts.to_rfc3339(),
            4000.0 + i as f64,
            4001.0 + i as f64,
            3999.0 + i as f64,
            4000.0 + i as f64,
            10
        )
        .unwrap();
    }
    csv_file.flush().unwrap();

    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("bars.sqlite");

    let importer_db = Database::new_file(&db_path).unwrap();
    let mut importer = CsvImporter::new(importer_db);
    let summary = importer.import_file(csv_file.path()).unwrap();
    assert_eq!(summary.rows_imported, 40);
    assert_eq!(summary.rows_skipped, 0);
    drop(importer);

    let replay_db = Database::new_file(&db_path).unwrap();

    let mut gateway = BacktestGateway::new(1_000_000.0);
    gateway.register_contract("rb2601.SHFE", 10.0, 1.0);
    let mut pipeline = TradingPipeline::new(
        gateway,
        Box::new(SystemClock),
        OptionSelectorConfig::default(),
        PositionSizingConfig::default(),
        OrderExecutionConfig::default(),
        PipelineConfig::default(),
    );
    pipeline.on_init();

    let mut replayed = 0usize;
    pipeline.run_warm_up(|pipeline| {
        let result = replay_bars_from_database(&replay_db, &["rb2601.SHFE".to_string()], 3650, |vt_symbol, bar_record| {
            let bar = Bar::new(
                bar_record.timestamp_as_datetime(),
                bar_record.open,
                bar_record.high,
                bar_record.low,
                bar_record.close,
                bar_record.volume,
            );
            let mut bars = HashMap::new();
            bars.insert(vt_symbol.to_string(), bar);
            pipeline.on_bars(bars);
        });
        replayed = result.unwrap();
    });

    assert_eq!(replayed, 40);
    assert!(pipeline.instrument_manager().has_enough_data("rb2601.SHFE"));
}
