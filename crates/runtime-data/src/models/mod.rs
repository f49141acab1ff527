mod bar;
mod tick;

pub use bar::BarRecord;
pub use tick::Tick;
