//! End-to-end recommendation pipeline.
//!
//! Wires the stages together with explicit dependency injection: every
//! collaborator is constructed once at startup and passed in, no global
//! state. The pipeline records all seven canonical steps in a decision
//! tracer, persists the finalized trace, and returns the recommendation
//! together with its trace id.

use crate::application::optimizer::{PriceOptimizer, PricePoint};
use crate::application::registry::{ModelRegistry, PredictOptions};
use crate::application::rules::{AppliedRule, RulesEngine};
use crate::application::segmentation::SegmentClassifier;
use crate::application::sensitivity::{SensitivityAnalyzer, SensitivityResult};
use crate::application::tracer::{
    safe_serialize, DecisionTracer, STEP_DEMAND_PREDICTION, STEP_EXPLANATION_GENERATION,
    STEP_EXTERNAL_FACTORS, STEP_INPUT_VALIDATION, STEP_PRICE_OPTIMIZATION,
    STEP_RULES_APPLICATION, STEP_SEGMENT_CLASSIFICATION,
};
use crate::domain::entities::decision_trace::{DecisionTrace, ModelAgreement, StepStatus};
use crate::domain::entities::market_context::MarketContext;
use crate::domain::entities::segment::SegmentResult;
use crate::domain::error::DomainError;
use crate::domain::ports::external_factors::{ExternalFactorProvider, ExternalFactors};
use crate::domain::ports::trace_repository::TraceRepository;
use crate::domain::values::confidence::confidence_score;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// The externally visible recommendation.
#[derive(Debug, Clone, Serialize)]
pub struct PricingResult {
    pub recommended_price: f64,
    pub price_before_rules: f64,
    /// `exp(-centroid_distance / 2.0)`: how close this context sits to
    /// the territory the models were trained on.
    pub confidence_score: f64,
    pub expected_demand: f64,
    pub expected_profit: f64,
    pub baseline_price: f64,
    pub profit_uplift_percent: f64,
    pub segment: SegmentResult,
    pub model_used: String,
    pub model_agreement: Option<ModelAgreement>,
    pub rules_applied: Vec<AppliedRule>,
    pub price_demand_curve: Vec<PricePoint>,
    pub explanation: Vec<String>,
    pub trace_id: String,
    pub total_duration_ms: f64,
}

pub struct PricingPipeline {
    classifier: Arc<SegmentClassifier>,
    registry: Arc<ModelRegistry>,
    optimizer: Arc<PriceOptimizer>,
    rules: Arc<RulesEngine>,
    factors: Arc<dyn ExternalFactorProvider>,
    analyzer: SensitivityAnalyzer,
    traces: Arc<dyn TraceRepository>,
}

impl PricingPipeline {
    pub fn new(
        classifier: Arc<SegmentClassifier>,
        registry: Arc<ModelRegistry>,
        optimizer: Arc<PriceOptimizer>,
        rules: Arc<RulesEngine>,
        factors: Arc<dyn ExternalFactorProvider>,
        traces: Arc<dyn TraceRepository>,
    ) -> Self {
        let analyzer = SensitivityAnalyzer::new(optimizer.clone());
        Self {
            classifier,
            registry,
            optimizer,
            rules,
            factors,
            analyzer,
            traces,
        }
    }

    /// Full decision pipeline: validate → classify → external factors →
    /// predict → optimize → rules → explain. Every step is traced; a step
    /// failure is recorded, the partial trace persisted, and the error
    /// propagated.
    pub async fn recommend(
        &self,
        ctx: &MarketContext,
    ) -> Result<(PricingResult, DecisionTrace), DomainError> {
        let mut tracer = DecisionTracer::new();

        // 1. Input validation
        let started = Instant::now();
        match ctx.validate() {
            Ok(()) => tracer.record(
                STEP_INPUT_VALIDATION,
                safe_serialize(ctx),
                serde_json::json!({ "valid": true }),
                elapsed_ms(started),
                StepStatus::Success,
                None,
            ),
            Err(e) => {
                return Err(self.abort(
                    tracer,
                    STEP_INPUT_VALIDATION,
                    safe_serialize(ctx),
                    elapsed_ms(started),
                    e,
                ))
            }
        }

        // 2. Segment classification
        let started = Instant::now();
        let segment = match self.classifier.classify(ctx) {
            Ok(s) => {
                tracer.record(
                    STEP_SEGMENT_CLASSIFICATION,
                    serde_json::json!({ "features": ["supply_demand_ratio", "time_of_booking", "location", "vehicle_type"] }),
                    safe_serialize(&s),
                    elapsed_ms(started),
                    StepStatus::Success,
                    None,
                );
                s
            }
            Err(e) => {
                return Err(self.abort(
                    tracer,
                    STEP_SEGMENT_CLASSIFICATION,
                    serde_json::Value::Null,
                    elapsed_ms(started),
                    e,
                ))
            }
        };

        // 3. External factors (optional context: failure degrades to the
        // neutral multiplier, recorded as an error step, and the pipeline
        // continues)
        let started = Instant::now();
        let factors = match self.factors.demand_adjustment(ctx).await {
            Ok(f) => {
                tracer.record(
                    STEP_EXTERNAL_FACTORS,
                    serde_json::Value::Null,
                    safe_serialize(&f),
                    elapsed_ms(started),
                    StepStatus::Success,
                    None,
                );
                f
            }
            Err(e) => {
                tracing::warn!(error = %e, "external factor provider failed, using neutral multiplier");
                tracer.record(
                    STEP_EXTERNAL_FACTORS,
                    serde_json::Value::Null,
                    safe_serialize(&ExternalFactors::neutral()),
                    elapsed_ms(started),
                    StepStatus::Error,
                    Some(e.to_string()),
                );
                ExternalFactors::neutral()
            }
        };
        let opts = PredictOptions {
            elasticity_modifier: 1.0,
            external_adjustment: factors.demand_multiplier,
        };

        // 4. Demand prediction across all models, at the reference price
        let started = Instant::now();
        let reference_price = ctx.historical_cost_of_ride;
        let predictions = match self.registry.predict_all(ctx, reference_price, opts) {
            Ok(p) => p,
            Err(e) => {
                return Err(self.abort(
                    tracer,
                    STEP_DEMAND_PREDICTION,
                    serde_json::json!({ "price": reference_price }),
                    elapsed_ms(started),
                    e,
                ))
            }
        };
        tracer.set_model_agreement(predictions.clone());
        tracer.record(
            STEP_DEMAND_PREDICTION,
            serde_json::json!({ "price": reference_price, "external_adjustment": factors.demand_multiplier }),
            safe_serialize(&predictions),
            elapsed_ms(started),
            StepStatus::Success,
            None,
        );

        // 5. Price optimization
        let started = Instant::now();
        let optimized = match self
            .optimizer
            .optimize_with(ctx, &segment.segment_name, opts, true)
        {
            Ok(o) => {
                tracer.record(
                    STEP_PRICE_OPTIMIZATION,
                    serde_json::json!({ "segment": segment.segment_name, "use_cache": true }),
                    safe_serialize(&o),
                    elapsed_ms(started),
                    StepStatus::Success,
                    None,
                );
                o
            }
            Err(e) => {
                return Err(self.abort(
                    tracer,
                    STEP_PRICE_OPTIMIZATION,
                    serde_json::json!({ "segment": segment.segment_name }),
                    elapsed_ms(started),
                    e,
                ))
            }
        };

        // 6. Rules application
        let started = Instant::now();
        let ruled = self.rules.apply(ctx, optimized.optimal_price);
        tracer.record(
            STEP_RULES_APPLICATION,
            serde_json::json!({ "price": optimized.optimal_price }),
            safe_serialize(&ruled),
            elapsed_ms(started),
            StepStatus::Success,
            None,
        );

        // 7. Explanation generation
        let started = Instant::now();
        let agreement = tracer.model_agreement().cloned();
        let explanation = build_explanation(&segment, &optimized, &ruled.applied_rules, &factors, agreement.as_ref());
        tracer.record(
            STEP_EXPLANATION_GENERATION,
            serde_json::Value::Null,
            safe_serialize(&explanation),
            elapsed_ms(started),
            StepStatus::Success,
            None,
        );

        let result = PricingResult {
            recommended_price: ruled.final_price,
            price_before_rules: optimized.optimal_price,
            confidence_score: confidence_score(segment.centroid_distance),
            expected_demand: optimized.expected_demand,
            expected_profit: optimized.expected_profit,
            baseline_price: optimized.baseline_price,
            profit_uplift_percent: optimized.profit_uplift_percent,
            segment,
            model_used: self.registry.primary_model().to_string(),
            model_agreement: agreement,
            rules_applied: ruled.applied_rules,
            price_demand_curve: optimized.price_demand_curve,
            explanation,
            trace_id: tracer.trace_id().to_string(),
            total_duration_ms: 0.0,
        };

        let trace = tracer.finalize(safe_serialize(&result));
        let result = PricingResult {
            total_duration_ms: trace.total_duration_ms,
            ..result
        };
        self.persist(&trace);
        Ok((result, trace))
    }

    /// Classify, then stress-test the recommendation across the fixed
    /// 17-scenario space.
    pub fn sensitivity(&self, ctx: &MarketContext) -> Result<SensitivityResult, DomainError> {
        ctx.validate()?;
        let segment = self.classifier.classify(ctx)?;
        self.analyzer.analyze(ctx, &segment.segment_name)
    }

    /// Record a failed step, persist the partial trace, and hand the
    /// error back for propagation.
    fn abort(
        &self,
        mut tracer: DecisionTracer,
        step: &str,
        inputs: serde_json::Value,
        duration_ms: f64,
        error: DomainError,
    ) -> DomainError {
        tracer.record(
            step,
            inputs,
            serde_json::Value::Null,
            duration_ms,
            StepStatus::Error,
            Some(error.to_string()),
        );
        let trace = tracer.finalize(serde_json::Value::Null);
        self.persist(&trace);
        error
    }

    /// Audit persistence is best effort: a failed write is logged, never
    /// turned into a failed recommendation.
    fn persist(&self, trace: &DecisionTrace) {
        if let Err(e) = self.traces.save(trace) {
            tracing::warn!(trace_id = %trace.trace_id, error = %e, "failed to persist decision trace");
        }
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}

fn build_explanation(
    segment: &SegmentResult,
    optimized: &crate::application::optimizer::OptimizationResult,
    applied: &[AppliedRule],
    factors: &ExternalFactors,
    agreement: Option<&ModelAgreement>,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "Context classified into segment '{}' ({} confidence, centroid distance {:.2}).",
        segment.segment_name, segment.confidence, segment.centroid_distance
    ));
    if let Some(a) = agreement {
        lines.push(format!(
            "{} demand models compared, max deviation {:.1}% from the mean ({:?}).",
            a.models_compared, a.max_deviation_percent, a.status
        ));
    }
    if (factors.demand_multiplier - 1.0).abs() > 1e-9 {
        lines.push(format!(
            "External factors adjusted demand by x{:.2} ({}).",
            factors.demand_multiplier,
            factors.sources.join(", ")
        ));
    }
    lines.push(format!(
        "Grid search selected {:.2} with expected demand {:.2} and expected profit {:.2} ({:.0}% uplift over the cost-priced baseline).",
        optimized.optimal_price,
        optimized.expected_demand,
        optimized.expected_profit,
        optimized.profit_uplift_percent
    ));
    for rule in applied {
        lines.push(format!(
            "Rule '{}' moved the price from {:.2} to {:.2} ({:+.1}%).",
            rule.name, rule.price_before, rule.price_after, rule.impact_percent
        ));
    }
    lines
}
