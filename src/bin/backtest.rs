//! Deterministic backtest driver: imports historical bars from CSV, replays
//! them through the same `TradingPipeline` the live worker runs, and prints
//! a summary table of what the strategy did.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, ContentArrangement, Table};
use runtime_core::domain_service::{ContractFactory, OptionSelectorConfig, PositionSizingConfig};
use runtime_core::engine::{SystemClock, TradingPipeline};
use runtime_core::gateway::backtest::BacktestGateway;
use runtime_core::value_objects::{Bar, OrderExecutionConfig, ParsedSymbol};
use runtime_data::{replay_bars_from_database, CsvImporter, Database};

#[derive(Parser)]
#[command(name = "strangle-backtest")]
#[command(about = "Replay historical bars through the strategy pipeline", long_about = None)]
struct Cli {
    /// Path to the historical bar store. Created if it does not exist.
    #[arg(long, default_value = "data/backtest.sqlite")]
    db: PathBuf,

    /// Use an in-memory bar store instead of a file (implies a fresh --import
    /// on every run).
    #[arg(long)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import historical bars from a CSV file into the bar store.
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Replay stored bars for the given contracts through the pipeline.
    Run {
        /// `vt_symbol:size:pricetick` entries, comma separated.
        #[arg(long)]
        contracts: String,

        /// How many days of history (counted back from now) to replay.
        #[arg(long, default_value_t = 3650)]
        days: i64,

        /// Starting cash balance for the paper account.
        #[arg(long, default_value_t = 1_000_000.0)]
        balance: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Import { file } => handle_import(&cli, file),
        Commands::Run { contracts, days, balance } => handle_run(&cli, contracts, *days, *balance),
    }
}

fn open_database(cli: &Cli) -> Result<Database> {
    if cli.memory {
        Database::new_memory().context("creating in-memory bar store")
    } else {
        Database::new_file(&cli.db).context("opening bar store file")
    }
}

fn handle_import(cli: &Cli, file: &std::path::Path) -> Result<()> {
    println!("Importing bars from: {}", file.display());
    let database = open_database(cli)?;
    let mut importer = CsvImporter::new(database);
    let summary = importer.import_file(file).context("importing CSV bar file")?;

    println!("\nImport summary:");
    println!("  total rows:    {}", summary.total_rows);
    println!("  imported:      {}", summary.rows_imported);
    println!("  skipped:       {}", summary.rows_skipped);
    println!("  success rate:  {:.1}%", summary.success_rate());
    println!("  duration:      {:?}", summary.duration);

    if !summary.errors.is_empty() {
        println!("\nFirst errors:");
        for err in summary.errors.iter().take(10) {
            println!("  - {err}");
        }
    }
    Ok(())
}

fn handle_run(cli: &Cli, contracts_raw: &str, days: i64, balance: f64) -> Result<()> {
    let contracts = parse_contracts(contracts_raw)?;
    if contracts.is_empty() {
        anyhow::bail!("no contracts given; pass --contracts vt_symbol:size:pricetick[,...]");
    }

    let database = open_database(cli)?;
    let mut gateway = BacktestGateway::new(balance);
    for (vt_symbol, size, pricetick) in &contracts {
        gateway.register_contract(vt_symbol.clone(), *size, *pricetick);
    }

    let mut pipeline = TradingPipeline::new(
        gateway,
        Box::new(SystemClock),
        OptionSelectorConfig::default(),
        PositionSizingConfig::default(),
        OrderExecutionConfig::default(),
        runtime_core::engine::PipelineConfig::default(),
    );
    let contract_factory = ContractFactory::new();
    for (vt_symbol, ..) in &contracts {
        if let ParsedSymbol::Future(future) = contract_factory.create(vt_symbol) {
            pipeline.track_product(future.product_code);
        }
    }

    pipeline.on_init();

    let vt_symbols: Vec<String> = contracts.iter().map(|(s, ..)| s.clone()).collect();
    let mut replayed = 0usize;
    pipeline.run_warm_up(|pipeline| {
        let result = replay_bars_from_database(&database, &vt_symbols, days, |vt_symbol, bar_record| {
            let bar = Bar::new(
                bar_record.timestamp_as_datetime(),
                bar_record.open,
                bar_record.high,
                bar_record.low,
                bar_record.close,
                bar_record.volume,
            );
            let mut bars = std::collections::HashMap::new();
            bars.insert(vt_symbol.to_string(), bar);
            pipeline.gateway_mut().on_bar_close(vt_symbol, bar_record.close);
            pipeline.on_bars(bars);
        });
        replayed = result.unwrap_or(0);
    });

    if replayed == 0 {
        anyhow::bail!("no bars replayed; import data first with `strangle-backtest import --file ...`");
    }

    pipeline.on_start();
    pipeline.on_stop();

    print_summary(&pipeline, replayed);
    Ok(())
}

fn print_summary<G>(pipeline: &TradingPipeline<G>, bars_replayed: usize)
where
    G: runtime_core::gateway::MarketDataGateway
        + runtime_core::gateway::AccountGateway
        + runtime_core::gateway::TradeExecutionGateway
        + runtime_core::gateway::QuoteGateway,
{
    let snapshot = pipeline.monitoring_snapshot();
    println!("\nBars replayed: {bars_replayed}");
    println!("Tracked symbols: {}", snapshot.tracked_symbols);

    let positions = pipeline.position_aggregate().all_positions();
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Symbol", "Side", "Volume", "Open Price", "Closed"]);

    for position in &positions {
        table.add_row(vec![
            Cell::new(&position.vt_symbol),
            Cell::new(format!("{:?}", position.side)),
            Cell::new(position.volume),
            Cell::new(format!("{:.4}", position.open_price)),
            Cell::new(position.is_closed),
        ]);
    }

    println!("\n{table}");
    println!(
        "\n{} position(s), {} active",
        positions.len(),
        pipeline.position_aggregate().active_positions().len()
    );
}

fn parse_contracts(raw: &str) -> Result<Vec<(String, f64, f64)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|entry| {
            let mut parts = entry.splitn(3, ':');
            let vt_symbol = parts.next().unwrap_or_default().to_string();
            let size: f64 = parts
                .next()
                .context("contract entry missing size")?
                .parse()
                .with_context(|| format!("invalid size in contract entry {entry}"))?;
            let pricetick: f64 = parts
                .next()
                .context("contract entry missing pricetick")?
                .parse()
                .with_context(|| format!("invalid pricetick in contract entry {entry}"))?;
            Ok((vt_symbol, size, pricetick))
        })
        .collect()
}
