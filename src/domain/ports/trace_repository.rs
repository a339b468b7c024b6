use crate::domain::entities::decision_trace::DecisionTrace;
use crate::domain::error::DomainError;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Listing row for stored traces.
#[derive(Debug, Clone, Serialize)]
pub struct TraceSummary {
    pub trace_id: String,
    pub request_timestamp: DateTime<Utc>,
    pub steps: usize,
    pub total_duration_ms: f64,
}

/// Persistence port for finalized decision traces (audit replay).
pub trait TraceRepository: Send + Sync {
    fn save(&self, trace: &DecisionTrace) -> Result<(), DomainError>;
    fn get(&self, trace_id: &str) -> Result<Option<DecisionTrace>, DomainError>;
    fn list(&self, limit: usize) -> Result<Vec<TraceSummary>, DomainError>;
}
