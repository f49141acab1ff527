//! The event pipeline: the cooperative scheduler that fans bar, tick,
//! order, trade and position events into the domain layer (§4.A).

pub mod bar_pipeline;
pub mod clock;
pub mod pipeline;

pub use bar_pipeline::{BarInterval, BarPipeline};
pub use clock::{Clock, FixedClock, SystemClock};
pub use pipeline::{MonitoringSnapshot, PipelineConfig, TradingPipeline};
