//! Step-by-step recording of one pipeline run.
//!
//! The tracer is constructed at pipeline entry, fed one record per
//! canonical step, and finalized exactly once at exit. It never swallows
//! failures: an error step is recorded and the error still propagates.

use crate::domain::entities::decision_trace::{
    DecisionTrace, ModelAgreement, StepStatus, TraceStep,
};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Canonical pipeline step names.
pub const STEP_INPUT_VALIDATION: &str = "input_validation";
pub const STEP_SEGMENT_CLASSIFICATION: &str = "segment_classification";
pub const STEP_EXTERNAL_FACTORS: &str = "external_factors";
pub const STEP_DEMAND_PREDICTION: &str = "demand_prediction";
pub const STEP_PRICE_OPTIMIZATION: &str = "price_optimization";
pub const STEP_RULES_APPLICATION: &str = "rules_application";
pub const STEP_EXPLANATION_GENERATION: &str = "explanation_generation";

/// Convert any serializable value into a plain JSON tree, falling back
/// to its `Debug` rendering when serialization fails. Trace payloads must
/// never abort the pipeline.
pub fn safe_serialize<T: Serialize + std::fmt::Debug>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|_| serde_json::Value::String(format!("{value:?}")))
}

pub struct DecisionTracer {
    trace_id: String,
    request_timestamp: chrono::DateTime<Utc>,
    started: Instant,
    steps: Vec<TraceStep>,
    model_agreement: Option<ModelAgreement>,
}

impl Default for DecisionTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl DecisionTracer {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            request_timestamp: Utc::now(),
            started: Instant::now(),
            steps: Vec::new(),
            model_agreement: None,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn record(
        &mut self,
        name: &str,
        inputs: serde_json::Value,
        outputs: serde_json::Value,
        duration_ms: f64,
        status: StepStatus,
        error_message: Option<String>,
    ) {
        self.steps.push(TraceStep {
            name: name.to_string(),
            timestamp: Utc::now(),
            duration_ms,
            inputs,
            outputs,
            status,
            error_message,
        });
    }

    pub fn set_model_agreement(&mut self, predictions: BTreeMap<String, f64>) {
        self.model_agreement = Some(ModelAgreement::from_predictions(predictions));
    }

    pub fn model_agreement(&self) -> Option<&ModelAgreement> {
        self.model_agreement.as_ref()
    }

    /// Consume the tracer into an immutable trace. Total duration is
    /// measured here, independently of the per-step durations.
    pub fn finalize(self, final_result: serde_json::Value) -> DecisionTrace {
        DecisionTrace {
            trace_id: self.trace_id,
            request_timestamp: self.request_timestamp,
            steps: self.steps,
            model_agreement: self.model_agreement,
            final_result,
            total_duration_ms: self.started.elapsed().as_secs_f64() * 1000.0,
        }
    }
}
