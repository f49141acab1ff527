//! Stateless indicator math: EMA, MACD and DeMark TD Sequential, each
//! operating on a bar slice rather than the pandas DataFrames the original
//! calculation services ran over.

pub mod ema_calc;
pub mod macd_calc;
pub mod td_calc;

pub use ema_calc::EmaCalculator;
pub use macd_calc::{MacdCalculator, MacdPeak};
pub use td_calc::TdCalculator;
