//! Atomic snapshot storage: write to `<path>.tmp`, then rename over `path`.
//!
//! The rename is the only step that can be observed concurrently by a
//! reader, and a same-filesystem rename is atomic, so a crash mid-write
//! never leaves a torn snapshot on disk — the previous file is left
//! untouched until the new one is fully flushed.

use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{Result, RuntimeError};

#[derive(Debug, Clone, Copy, Default)]
pub struct StateRepository;

impl StateRepository {
    pub fn new() -> Self {
        Self
    }

    /// Serializes `data` as JSON and atomically replaces the file at `path`,
    /// creating any missing parent directories first.
    pub fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = path.with_extension(tmp_extension(path));
        let payload = serde_json::to_vec_pretty(data)?;
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Deserializes the file at `path`, or returns `Ok(None)` if it does
    /// not exist. Any other I/O or deserialization failure is propagated.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(RuntimeError::Io(err)),
        };
        let data = serde_json::from_slice(&bytes)?;
        Ok(Some(data))
    }
}

fn tmp_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{ext}.tmp"),
        None => "tmp".to_string(),
    }
}
