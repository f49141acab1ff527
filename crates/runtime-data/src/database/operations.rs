use super::connection::Database;
use super::error::{DatabaseError, Result};
use crate::models::BarRecord;
use chrono::{DateTime, Utc};
use rusqlite::params;

impl Database {
    pub fn insert_bar(&self, bar: &BarRecord) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO bars (symbol, timestamp, open, high, low, close, volume)
                   VALUES (?, ?, ?, ?, ?, ?, ?)";

        self.connection()
            .execute(
                sql,
                params![
                    bar.symbol,
                    bar.timestamp,
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(|e| DatabaseError::InsertError(e.to_string()))?;

        Ok(())
    }

    pub fn insert_bars(&self, bars: &[BarRecord]) -> Result<()> {
        let sql = "INSERT OR REPLACE INTO bars (symbol, timestamp, open, high, low, close, volume)
                   VALUES (?, ?, ?, ?, ?, ?, ?)";

        let mut stmt = self
            .connection()
            .prepare(sql)
            .map_err(|e| DatabaseError::InsertError(e.to_string()))?;

        for bar in bars {
            stmt.execute(params![
                bar.symbol,
                bar.timestamp,
                bar.open,
                bar.high,
                bar.low,
                bar.close,
                bar.volume
            ])
            .map_err(|e| DatabaseError::InsertError(e.to_string()))?;
        }

        Ok(())
    }

    pub fn query_bars(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BarRecord>> {
        let sql = "SELECT symbol, timestamp, open, high, low, close, volume
                   FROM bars
                   WHERE symbol = ? AND timestamp >= ? AND timestamp <= ?
                   ORDER BY timestamp";

        let mut stmt = self
            .connection()
            .prepare(sql)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let rows = stmt
            .query_map(
                params![symbol, start.timestamp_millis(), end.timestamp_millis()],
                |row| {
                    Ok(BarRecord {
                        id: None,
                        symbol: row.get(0)?,
                        timestamp: row.get(1)?,
                        open: row.get(2)?,
                        high: row.get(3)?,
                        low: row.get(4)?,
                        close: row.get(5)?,
                        volume: row.get(6)?,
                    })
                },
            )
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let mut result = Vec::new();
        for row in rows {
            result.push(row.map_err(|e| DatabaseError::QueryError(e.to_string()))?);
        }

        Ok(result)
    }

    pub fn query_bars_for_symbols(
        &self,
        symbols: &[String],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<BarRecord>> {
        let mut out = Vec::new();
        for symbol in symbols {
            out.extend(self.query_bars(symbol, start, end)?);
        }
        out.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.symbol.cmp(&b.symbol)));
        Ok(out)
    }

    pub fn count_bars(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM bars", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(count as usize)
    }

    pub fn delete_bars_by_symbol(&self, symbol: &str) -> Result<usize> {
        let count = self
            .connection()
            .execute("DELETE FROM bars WHERE symbol = ?", params![symbol])
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(count)
    }

    /// Upsert the latest monitor snapshot for a (variant, instance_id) pair.
    pub fn upsert_monitor_snapshot(
        &self,
        variant: &str,
        instance_id: &str,
        payload_json: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let sql = "INSERT INTO monitor_snapshots (variant, instance_id, payload, updated_at)
                   VALUES (?, ?, ?, ?)
                   ON CONFLICT(variant, instance_id)
                   DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at";

        self.connection()
            .execute(
                sql,
                params![variant, instance_id, payload_json, updated_at.timestamp_millis()],
            )
            .map_err(|e| DatabaseError::InsertError(e.to_string()))?;

        Ok(())
    }

    /// Append a monitor event, ignoring the insert if `event_key` was already recorded.
    /// This is what makes monitor writes safe to retry from the caller's side.
    pub fn append_monitor_event(
        &self,
        event_key: &str,
        variant: &str,
        category: &str,
        payload_json: &str,
        created_at: DateTime<Utc>,
    ) -> Result<bool> {
        let sql = "INSERT OR IGNORE INTO monitor_events (event_key, variant, category, payload, created_at)
                   VALUES (?, ?, ?, ?, ?)";

        let changed = self
            .connection()
            .execute(
                sql,
                params![
                    event_key,
                    variant,
                    category,
                    payload_json,
                    created_at.timestamp_millis()
                ],
            )
            .map_err(|e| DatabaseError::InsertError(e.to_string()))?;

        Ok(changed > 0)
    }

    pub fn count_monitor_events(&self) -> Result<usize> {
        let count: i64 = self
            .connection()
            .query_row("SELECT COUNT(*) FROM monitor_events", [], |row| row.get(0))
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(count as usize)
    }
}
