mod config;
mod supervisor;
mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{error, info};

use config::Config;

/// `strangled` - the options/futures strategy runtime.
///
/// `standalone` runs the strategy worker directly in this process, the way a
/// developer drives it locally. `daemon` re-execs itself in standalone mode
/// as a supervised child and restarts it with backoff on unexpected exit,
/// the way a production deployment runs it.
#[derive(Parser)]
#[command(name = "strangled")]
#[command(about = "Options/futures strategy runtime", long_about = None)]
struct Cli {
    /// Run mode.
    #[arg(long, value_enum, default_value = "standalone")]
    mode: Mode,

    /// Environment-file override, forwarded to `Config::load` via `STRANGLE_ENV`
    /// when set (e.g. "production" loads `.env.production`).
    #[arg(long)]
    env: Option<String>,

    /// Overrides `logging.level` from the environment.
    #[arg(long)]
    log_level: Option<String>,

    /// Overrides `logging.dir` from the environment.
    #[arg(long)]
    log_dir: Option<String>,

    /// Run against the paper-trading gateway explicitly (currently the only
    /// gateway this crate ships, so this is accepted for CLI parity but does
    /// not change behavior).
    #[arg(long)]
    paper: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Standalone,
    Daemon,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(env) = &cli.env {
        std::env::set_var("STRANGLE_ENV", env);
    }
    if let Some(level) = &cli.log_level {
        std::env::set_var("LOG_LEVEL", level);
    }
    if let Some(dir) = &cli.log_dir {
        std::env::set_var("LOG_DIR", dir);
    }

    let config = Config::load().context("loading configuration")?;
    tracing_subscriber::fmt().with_env_filter(config.logging.level.clone()).init();

    if !cli.paper {
        info!("no live venue adapter is wired in; running against the paper-trading gateway regardless of --paper");
    }

    match cli.mode {
        Mode::Standalone => run_standalone(&config),
        Mode::Daemon => {
            let args: Vec<String> = std::env::args().skip(1).filter(|a| a != "--mode" && a != "daemon").collect();
            let mut respawn_args = vec!["--mode".to_string(), "standalone".to_string()];
            respawn_args.extend(args);
            supervisor::run(&config, &respawn_args)
        }
    }
}

fn run_standalone(config: &Config) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGTERM, terminate.clone()).context("registering SIGTERM handler")?;
    signal_hook::flag::register(SIGINT, terminate.clone()).context("registering SIGINT handler")?;

    // `signal_hook::flag::register` sets `terminate` to true on receipt; `running`
    // wants the opposite polarity, so a background thread bridges the two.
    let watched_running = running.clone();
    std::thread::spawn(move || loop {
        if terminate.load(Ordering::SeqCst) {
            watched_running.store(false, Ordering::SeqCst);
            return;
        }
        std::thread::sleep(std::time::Duration::from_millis(100));
    });

    info!("strategy worker starting in standalone mode");
    if let Err(err) = worker::run(config, running) {
        error!(error = %err, "strategy worker exited with an error");
        return Err(err);
    }
    Ok(())
}
