use super::error::Result;
use rusqlite::Connection;

const BAR_TABLE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS bars (
    symbol TEXT NOT NULL,
    timestamp INTEGER NOT NULL,
    open REAL NOT NULL,
    high REAL NOT NULL,
    low REAL NOT NULL,
    close REAL NOT NULL,
    volume INTEGER NOT NULL,
    PRIMARY KEY (symbol, timestamp)
)"#;

const BAR_INDEX_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_bars_timestamp ON bars(timestamp)
"#;

const MONITOR_SNAPSHOT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS monitor_snapshots (
    variant TEXT NOT NULL,
    instance_id TEXT NOT NULL,
    payload TEXT NOT NULL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (variant, instance_id)
)"#;

const MONITOR_EVENT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS monitor_events (
    event_key TEXT PRIMARY KEY,
    variant TEXT NOT NULL,
    category TEXT NOT NULL,
    payload TEXT NOT NULL,
    created_at INTEGER NOT NULL
)"#;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute(BAR_TABLE_SCHEMA, [])?;
    conn.execute(BAR_INDEX_SCHEMA, [])?;
    conn.execute(MONITOR_SNAPSHOT_SCHEMA, [])?;
    conn.execute(MONITOR_EVENT_SCHEMA, [])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initialization() -> Result<()> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;

        let table_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='bars'",
            [],
            |row| row.get(0),
        )?;

        assert!(table_exists);
        Ok(())
    }
}
