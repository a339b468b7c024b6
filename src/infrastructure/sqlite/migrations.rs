use crate::domain::error::DomainError;
use rusqlite::Connection;

pub fn run_migrations(conn: &Connection) -> Result<(), DomainError> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;

        CREATE TABLE IF NOT EXISTS decision_traces (
            trace_id TEXT PRIMARY KEY,
            request_timestamp TEXT NOT NULL,
            steps INTEGER NOT NULL,
            total_duration_ms REAL NOT NULL,
            trace TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_traces_timestamp
            ON decision_traces(request_timestamp);
        ",
    )
    .map_err(|e| DomainError::Database(format!("Migration failed: {e}")))
}
