//! The strategy worker: owns one `TradingPipeline` for the lifetime of one
//! process run. `src/bin/backtest.rs` drives the same pipeline type against
//! stored bars; here it is warmed up from the historical store and then left
//! running against whatever gateway the caller wires in, exactly as the
//! core's own doc comments describe the live/backtest split — only the time
//! source and the gateway implementation differ.
//!
//! No concrete exchange adapter ships in this crate (the gateway is an
//! opaque capability set the core only ever sees through its four demand
//! traits). `run` is generic over any gateway satisfying them; the
//! `strangled` binary itself supplies `BacktestGateway` pre-loaded from
//! `config.strategy.contracts`, which is the paper-trading substitute a
//! deployment without a live venue connection falls back to. Swapping in a
//! real venue adapter only touches the gateway construction in `main.rs`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use runtime_core::engine::{BarPipeline, SystemClock, TradingPipeline};
use runtime_core::gateway::backtest::BacktestGateway;
use runtime_core::gateway::{AccountGateway, MarketDataGateway, QuoteGateway, TradeExecutionGateway};
use runtime_core::notifier::{Notifier, NotifierConfig};
use runtime_core::persistence::{AutoSaveService, StateRepository};
use runtime_core::value_objects::{Bar, OrderExecutionConfig};
use runtime_data::{replay_bars_from_database, Database};
use tracing::{info, warn};

use crate::config::Config;

/// How often the idle loop wakes up to check the `running` flag, sweep order
/// timeouts and evaluate the autosave interval.
const TICK_INTERVAL: Duration = Duration::from_millis(500);

pub fn build_paper_gateway(config: &Config) -> BacktestGateway {
    let mut gateway = BacktestGateway::new(0.0);
    for seed in &config.strategy.contracts {
        gateway.register_contract(seed.vt_symbol.clone(), seed.size, seed.pricetick);
    }
    gateway
}

/// Runs one worker lifetime: warm-up replay, then the live/idle loop until
/// `running` is cleared by the signal handler. Returns once `on_stop` has
/// forced a final snapshot.
pub fn run(config: &Config, running: Arc<AtomicBool>) -> Result<()> {
    let option_selector_config = config.option_selector_config();
    let sizing_config = config.position_sizing_config();
    let execution_config: OrderExecutionConfig = config.execution;

    let gateway = build_paper_gateway(config);
    let pipeline_config = runtime_core::engine::PipelineConfig::default();

    let mut pipeline = TradingPipeline::new(
        gateway,
        Box::new(SystemClock),
        option_selector_config,
        sizing_config,
        execution_config,
        pipeline_config,
    );

    if config.strategy.bar_window > 1 || !matches!(config.strategy.bar_interval, crate::config::BarIntervalConfig::Minute) {
        pipeline = pipeline.with_bar_pipeline(BarPipeline::new(config.strategy.bar_interval.into(), config.strategy.bar_window));
    }

    for product in &config.strategy.products {
        pipeline.track_product(product.clone());
    }

    if !config.notifier.webhook_url.is_empty() {
        let notifier = Notifier::new(NotifierConfig {
            webhook_url: config.notifier.webhook_url.clone(),
            min_interval: Duration::from_secs(config.notifier.min_interval_secs),
        });
        pipeline = pipeline.with_notifier(notifier);
    }

    let repository = StateRepository::new();
    if let Some(snapshot) = repository
        .load::<runtime_core::persistence::StateSnapshot>(&config.persistence.snapshot_path)
        .context("loading persisted snapshot")?
    {
        info!(path = %config.persistence.snapshot_path.display(), "restoring state snapshot");
        pipeline.restore_state_snapshot(snapshot);
    }

    pipeline.on_init();
    warm_up(&mut pipeline, config)?;
    pipeline.on_start();

    let mut autosave = AutoSaveService::new(config.persistence.snapshot_path.clone(), Duration::from_secs(config.persistence.autosave_interval_secs));

    info!("strategy worker is live, awaiting shutdown signal");
    while running.load(Ordering::SeqCst) {
        pipeline.sweep_timeouts();
        autosave.tick(Instant::now(), || pipeline.state_snapshot(Utc::now()));
        std::thread::sleep(TICK_INTERVAL);
    }

    info!("shutdown signal observed, saving final snapshot");
    pipeline.on_stop();
    autosave.force_save(&pipeline.state_snapshot(Utc::now()));
    Ok(())
}

/// Replays `database.warm_up_days` of stored bars into the pipeline while
/// forcing warm-up semantics, mirroring the backtest driver's own load path
/// (§4.H: "live mode fails fast with an error; backtest delegates to the
/// engine's own `load_bars`" — a paper-trading worker without any stored
/// history behaves the same way, since it has nothing to warm up from).
fn warm_up<G>(pipeline: &mut TradingPipeline<G>, config: &Config) -> Result<()>
where
    G: MarketDataGateway + AccountGateway + TradeExecutionGateway + QuoteGateway,
{
    if !config.database.path.exists() {
        warn!(path = %config.database.path.display(), "no historical bar store found, starting with an empty warm-up");
        return Ok(());
    }

    let db = Database::new_file(&config.database.path).context("opening historical bar store")?;
    let vt_symbols: Vec<String> = config.strategy.contracts.iter().map(|c| c.vt_symbol.clone()).collect();
    if vt_symbols.is_empty() {
        return Ok(());
    }

    let mut replayed = 0usize;
    pipeline.run_warm_up(|pipeline| {
        let result = replay_bars_from_database(&db, &vt_symbols, config.database.warm_up_days, |vt_symbol, bar_record| {
            let bar = Bar::new(
                chrono::DateTime::from_timestamp_millis(bar_record.timestamp).unwrap_or_else(Utc::now),
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
        replayed = result.unwrap_or(0);
    });

    if replayed == 0 {
        anyhow::bail!("warm-up replay produced no bars: refusing to start without warmed-up indicator history");
    }
    info!(bars = replayed, "warm-up replay complete");
    Ok(())
}
