use thiserror::Error;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid timestamp format: {0}")]
    InvalidTimestamp(String),

    #[error("Non-positive price in OHLC: open={open}, high={high}, low={low}, close={close}")]
    NonPositivePrice {
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },

    #[error("Inconsistent OHLC: high ({high}) < max(open, close) or low ({low}) > min(open, close)")]
    InconsistentOhlc { high: f64, low: f64 },

    #[error("Negative volume: {0}")]
    NegativeVolume(i64),
}

pub fn validate_bar_data(
    symbol: Option<&str>,
    timestamp: Option<&str>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
) -> Result<(), ValidationError> {
    if symbol.is_none() || symbol == Some("") {
        return Err(ValidationError::MissingField("symbol".to_string()));
    }

    if timestamp.is_none() || timestamp == Some("") {
        return Err(ValidationError::MissingField("timestamp".to_string()));
    }

    if open <= 0.0 || high <= 0.0 || low <= 0.0 || close <= 0.0 {
        return Err(ValidationError::NonPositivePrice {
            open,
            high,
            low,
            close,
        });
    }

    let top = open.max(close);
    let bottom = open.min(close);
    if high < top || low > bottom {
        return Err(ValidationError::InconsistentOhlc { high, low });
    }

    if volume < 0 {
        return Err(ValidationError::NegativeVolume(volume));
    }

    Ok(())
}
