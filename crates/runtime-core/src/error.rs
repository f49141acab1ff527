//! Crate-wide error type for the strategy runtime.

use thiserror::Error;

/// Errors produced by the domain layer, persistence layer and event pipeline.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("invalid order instruction: {0}")]
    InvalidInstruction(String),

    #[error("invalid advanced order request: {0}")]
    InvalidAdvancedOrder(String),

    #[error("unknown order id: {0}")]
    UnknownOrder(String),

    #[error("contract resolution failed for {vt_symbol}: {reason}")]
    ContractResolution { vt_symbol: String, reason: String },

    #[error("greeks calculation failed: {0}")]
    GreeksCalculation(String),

    #[error("volatility surface error: {0}")]
    VolSurface(String),

    #[error("snapshot corrupted: {0}")]
    SnapshotCorrupted(String),

    #[error("schema migration failed: from version {from} to {to}: {reason}")]
    Migration { from: u32, to: u32, reason: String },

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("notifier delivery failed: {0}")]
    Notifier(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
