//! The daemon-mode parent process: re-execs this binary in standalone mode as
//! a child, restarts it with exponential backoff when it exits non-zero, and
//! retires the restart counter after a stretch of continuous uptime.
//!
//! This is the Rust counterpart of a watchdog that spawns a worker subprocess
//! and watches its exit code — the worker itself does not know it is being
//! supervised. `SupervisorConfig::restart_delay` (in `config`) is the pure
//! backoff calculator this loop consults; everything here is the process
//! plumbing around it.

use std::process::{Child, Command};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use tracing::{info, warn};

use crate::config::Config;

pub fn run(config: &Config, args: &[String]) -> Result<()> {
    let shutdown_requested = Arc::new(AtomicBool::new(false));
    let reload_requested = Arc::new(AtomicBool::new(false));

    let mut signals = Signals::new([SIGTERM, SIGINT, SIGHUP]).context("registering supervisor signal handlers")?;
    {
        let shutdown_requested = shutdown_requested.clone();
        let reload_requested = reload_requested.clone();
        std::thread::spawn(move || {
            for signal in signals.forever() {
                match signal {
                    SIGHUP => {
                        info!("SIGHUP received, scheduling child restart to reload configuration");
                        reload_requested.store(true, Ordering::SeqCst);
                    }
                    _ => {
                        info!(signal, "shutdown signal received");
                        shutdown_requested.store(true, Ordering::SeqCst);
                    }
                }
            }
        });
    }

    let exe = std::env::current_exe().context("resolving own executable path for respawn")?;
    let mut restart_count: u32 = 0;
    let mut last_start: Option<Instant> = None;
    let mut child: Option<Child> = None;

    loop {
        if shutdown_requested.load(Ordering::SeqCst) {
            break;
        }

        if child.is_none() {
            if restart_count >= config.supervisor.max_restarts {
                warn!(restart_count, "max restarts reached, supervisor exiting");
                break;
            }

            let delay = config.supervisor.restart_delay(restart_count);
            if !delay.is_zero() {
                info!(delay_secs = delay.as_secs(), "waiting before restart");
                sleep_while_watching(delay, &shutdown_requested);
                if shutdown_requested.load(Ordering::SeqCst) {
                    break;
                }
            }

            restart_count += 1;
            last_start = Some(Instant::now());
            info!(attempt = restart_count, "spawning child worker");
            child = Some(
                Command::new(&exe)
                    .args(args)
                    .spawn()
                    .context("spawning standalone worker subprocess")?,
            );
        }

        let c = child.as_mut().expect("child just assigned above");

        if reload_requested.swap(false, Ordering::SeqCst) {
            info!("stopping child to apply SIGHUP reload");
            terminate_child(c, Duration::from_secs(config.supervisor.shutdown_grace_secs));
            child = None;
            // SIGHUP restarts in place: does not count against the restart budget.
            restart_count = restart_count.saturating_sub(1);
            continue;
        }

        match c.try_wait().context("polling child worker status")? {
            Some(status) => {
                if status.success() {
                    info!("child worker exited cleanly");
                } else {
                    warn!(code = ?status.code(), "child worker exited with an error");
                }
                child = None;
            }
            None => {
                if let Some(started) = last_start {
                    if started.elapsed() >= Duration::from_secs(config.supervisor.reset_after_secs) && restart_count > 0 {
                        info!("child worker has run long enough to reset the restart counter");
                        restart_count = 0;
                    }
                }
                std::thread::sleep(Duration::from_millis(500));
            }
        }
    }

    if let Some(mut c) = child.take() {
        terminate_child(&mut c, Duration::from_secs(config.supervisor.shutdown_grace_secs));
    }
    info!("supervisor shut down");
    Ok(())
}

fn sleep_while_watching(total: Duration, shutdown_requested: &Arc<AtomicBool>) {
    let step = Duration::from_millis(500);
    let mut remaining = total;
    while !remaining.is_zero() {
        if shutdown_requested.load(Ordering::SeqCst) {
            return;
        }
        let chunk = remaining.min(step);
        std::thread::sleep(chunk);
        remaining -= chunk;
    }
}

/// Waits out the shutdown grace for the child to exit on its own (it has its
/// own SIGTERM handler flipping its `running` flag and saving a final
/// snapshot), then escalates to `kill` if it overruns the grace period.
fn terminate_child(child: &mut Child, grace: Duration) {
    let pid = child.id();
    let deadline = Instant::now() + grace;
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) => {
                if Instant::now() >= deadline {
                    warn!(pid, "child worker did not exit within the shutdown grace, killing it");
                    let _ = child.kill();
                    let _ = child.wait();
                    return;
                }
                std::thread::sleep(Duration::from_millis(200));
            }
            Err(_) => return,
        }
    }
}
