//! Audit record of one pipeline run.
//!
//! A trace is built up step by step while a recommendation is computed and
//! finalized exactly once at pipeline exit; after that it is immutable.
//! Everything inside is plain serializable data so traces can be persisted
//! and replayed for audit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Success,
    Error,
    Skipped,
}

/// One recorded pipeline step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: f64,
    pub inputs: serde_json::Value,
    pub outputs: serde_json::Value,
    pub status: StepStatus,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStatus {
    FullAgreement,
    PartialAgreement,
    Divergent,
}

/// How much the loaded demand models concur on one prediction.
///
/// Deviation is measured against the mean prediction: the largest absolute
/// deviation from the mean, expressed as a percentage of the mean.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAgreement {
    pub models_compared: usize,
    pub predictions: BTreeMap<String, f64>,
    pub max_deviation_percent: f64,
    pub status: AgreementStatus,
}

impl ModelAgreement {
    pub fn from_predictions(predictions: BTreeMap<String, f64>) -> Self {
        let n = predictions.len();
        let mean = if n == 0 {
            0.0
        } else {
            predictions.values().sum::<f64>() / n as f64
        };
        let max_deviation_percent = if mean.abs() < f64::EPSILON {
            0.0
        } else {
            predictions
                .values()
                .map(|p| (p - mean).abs() / mean * 100.0)
                .fold(0.0, f64::max)
        };
        let status = if max_deviation_percent <= 5.0 {
            AgreementStatus::FullAgreement
        } else if max_deviation_percent <= 10.0 {
            AgreementStatus::PartialAgreement
        } else {
            AgreementStatus::Divergent
        };
        Self {
            models_compared: n,
            predictions,
            max_deviation_percent,
            status,
        }
    }
}

/// Finalized audit trace for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTrace {
    pub trace_id: String,
    pub request_timestamp: DateTime<Utc>,
    pub steps: Vec<TraceStep>,
    pub model_agreement: Option<ModelAgreement>,
    pub final_result: serde_json::Value,
    /// Wall-clock duration of the whole pipeline, measured independently
    /// of the per-step durations.
    pub total_duration_ms: f64,
}
