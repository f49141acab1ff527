//! Periodic, failure-tolerant snapshot saving driven off a monotonic clock.
//!
//! The pipeline worker calls [`AutoSaveService::tick`] once per event cycle;
//! it is a no-op until `interval` has elapsed since the last successful (or
//! attempted) save, at which point it evaluates the caller-supplied
//! snapshot thunk and writes it through [`super::repository::StateRepository`].
//! A save failure is logged and otherwise swallowed — the stale
//! `last_save_at` is left in place so the next tick retries.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::error;

use super::repository::StateRepository;

pub struct AutoSaveService {
    repository: StateRepository,
    path: PathBuf,
    interval: Duration,
    last_save_at: Option<Instant>,
}

impl AutoSaveService {
    pub fn new(path: PathBuf, interval: Duration) -> Self {
        Self { repository: StateRepository::new(), path, interval, last_save_at: None }
    }

    fn due(&self, now: Instant) -> bool {
        match self.last_save_at {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        }
    }

    /// Called once per event cycle with the current monotonic instant. Saves
    /// at most once per `interval`; returns whether a save was attempted.
    pub fn tick<T, F>(&mut self, now: Instant, snapshot: F) -> bool
    where
        T: Serialize,
        F: FnOnce() -> T,
    {
        if !self.due(now) {
            return false;
        }
        self.save_now(now, snapshot());
        true
    }

    /// Unconditionally saves, bypassing the interval check. Intended for
    /// clean shutdown (`on_stop`), where a final snapshot is mandatory
    /// regardless of how recently the last one ran.
    pub fn force_save<T: Serialize>(&mut self, data: &T) {
        self.save_now(Instant::now(), data);
    }

    fn save_now<T: Serialize>(&mut self, now: Instant, data: T) {
        self.last_save_at = Some(now);
        if let Err(err) = self.repository.save(&self.path, &data) {
            error!(error = %err, path = %self.path.display(), "auto-save snapshot failed");
        }
    }
}
