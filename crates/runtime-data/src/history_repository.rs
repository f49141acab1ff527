use crate::database::{Database, Result};
use crate::models::BarRecord;
use chrono::{Duration, Utc};

/// Streams historical bars for the requested symbols, one bar at a time, oldest first.
///
/// This backs the live runtime's warm-up replay (`HistoryDataRepository.replay_bars_from_database`
/// in the language-neutral design): the pipeline's `on_bars` hook is invoked once per bar with a
/// single-symbol map, exactly as it would be invoked for a live tick-driven bar.
pub fn replay_bars_from_database<F>(
    db: &Database,
    vt_symbols: &[String],
    days: i64,
    mut callback: F,
) -> Result<usize>
where
    F: FnMut(&str, &BarRecord),
{
    let end = Utc::now();
    let start = end - Duration::days(days);

    let bars = db.query_bars_for_symbols(vt_symbols, start, end)?;
    let count = bars.len();

    for bar in &bars {
        callback(&bar.symbol, bar);
    }

    Ok(count)
}
