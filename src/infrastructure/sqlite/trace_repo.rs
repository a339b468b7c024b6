//! SQLite-backed audit store for decision traces.
//!
//! The full trace is stored as one JSON document per row; the columns
//! queried for listings (timestamp, step count, duration) are denormalized
//! alongside it.

use crate::domain::entities::decision_trace::DecisionTrace;
use crate::domain::error::DomainError;
use crate::domain::ports::trace_repository::{TraceRepository, TraceSummary};
use chrono::DateTime;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteTraceRepo {
    conn: Mutex<Connection>,
}

impl SqliteTraceRepo {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl TraceRepository for SqliteTraceRepo {
    fn save(&self, trace: &DecisionTrace) -> Result<(), DomainError> {
        let body = serde_json::to_string(trace)
            .map_err(|e| DomainError::Database(format!("Failed to serialize trace: {e}")))?;
        let conn = self.conn.lock();
        conn.execute(
            "INSERT OR REPLACE INTO decision_traces (trace_id, request_timestamp, steps, total_duration_ms, trace)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                trace.trace_id,
                trace.request_timestamp.to_rfc3339(),
                trace.steps.len(),
                trace.total_duration_ms,
                body,
            ],
        )
        .map_err(|e| DomainError::Database(format!("Failed to save trace: {e}")))?;
        Ok(())
    }

    fn get(&self, trace_id: &str) -> Result<Option<DecisionTrace>, DomainError> {
        let conn = self.conn.lock();
        let body: Option<String> = conn
            .query_row(
                "SELECT trace FROM decision_traces WHERE trace_id = ?1",
                params![trace_id],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| DomainError::Database(format!("Failed to load trace: {e}")))?;
        match body {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| DomainError::Database(format!("Stored trace is corrupt: {e}"))),
            None => Ok(None),
        }
    }

    fn list(&self, limit: usize) -> Result<Vec<TraceSummary>, DomainError> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(
                "SELECT trace_id, request_timestamp, steps, total_duration_ms
                 FROM decision_traces
                 ORDER BY request_timestamp DESC
                 LIMIT ?1",
            )
            .map_err(|e| DomainError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit], |row| {
                let timestamp: String = row.get(1)?;
                Ok((
                    row.get::<_, String>(0)?,
                    timestamp,
                    row.get::<_, usize>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            })
            .map_err(|e| DomainError::Database(format!("Failed to list traces: {e}")))?;

        let mut summaries = Vec::new();
        for row in rows {
            let (trace_id, timestamp, steps, total_duration_ms) =
                row.map_err(|e| DomainError::Database(e.to_string()))?;
            summaries.push(TraceSummary {
                trace_id,
                request_timestamp: DateTime::parse_from_rfc3339(&timestamp)
                    .map(|dt| dt.with_timezone(&chrono::Utc))
                    .unwrap_or_else(|_| chrono::Utc::now()),
                steps,
                total_duration_ms,
            });
        }
        Ok(summaries)
    }
}
