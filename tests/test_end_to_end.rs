mod common;

use common::{busy_evening_context, setup};
use farecraft::application::tracer::{
    STEP_DEMAND_PREDICTION, STEP_EXPLANATION_GENERATION, STEP_EXTERNAL_FACTORS,
    STEP_INPUT_VALIDATION, STEP_PRICE_OPTIMIZATION, STEP_RULES_APPLICATION,
    STEP_SEGMENT_CLASSIFICATION,
};
use farecraft::domain::entities::decision_trace::StepStatus;
use farecraft::domain::error::DomainError;

#[tokio::test]
async fn full_pipeline_produces_a_recommendation() {
    let engine = setup();
    let ctx = busy_evening_context();

    let (result, _) = engine.recommend(&ctx).await.unwrap();

    // Final price sits inside the rule guardrails: general floor at
    // cost*1.1 minus the 10% Gold discount, surge cap at cost*3.0.
    let cost = ctx.historical_cost_of_ride;
    assert!(result.recommended_price >= cost * 1.1 * 0.9 - 1e-9);
    assert!(result.recommended_price <= cost * 3.0 + 1e-9);
    assert!(result.expected_demand >= 0.0 && result.expected_demand <= 1.0);
    assert!(result.expected_profit >= 0.0);
    assert!((0.0..=1.0).contains(&result.confidence_score));
    assert_eq!(result.model_used, "gradient_boost");
    assert_eq!(result.segment.segment_name, "Urban_Peak_Premium");
    assert!(!result.explanation.is_empty());
    assert!(!result.trace_id.is_empty());
}

#[tokio::test]
async fn trace_records_all_seven_steps_in_order() {
    let engine = setup();

    let (result, trace) = engine.recommend(&busy_evening_context()).await.unwrap();

    let names: Vec<&str> = trace.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            STEP_INPUT_VALIDATION,
            STEP_SEGMENT_CLASSIFICATION,
            STEP_EXTERNAL_FACTORS,
            STEP_DEMAND_PREDICTION,
            STEP_PRICE_OPTIMIZATION,
            STEP_RULES_APPLICATION,
            STEP_EXPLANATION_GENERATION,
        ]
    );
    assert!(trace.steps.iter().all(|s| s.status == StepStatus::Success));
    assert_eq!(trace.trace_id, result.trace_id);
    assert!(trace.total_duration_ms > 0.0);
}

#[tokio::test]
async fn trace_is_persisted_and_replayable() {
    let engine = setup();

    let (result, _) = engine.recommend(&busy_evening_context()).await.unwrap();

    let stored = engine.trace_get(&result.trace_id).unwrap().unwrap();
    assert_eq!(stored.steps.len(), 7);
    assert_eq!(
        stored.final_result["recommended_price"],
        serde_json::json!(result.recommended_price)
    );

    let listed = engine.trace_list(10).unwrap();
    assert!(listed.iter().any(|t| t.trace_id == result.trace_id));
}

#[tokio::test]
async fn agreement_covers_both_models() {
    let engine = setup();

    let (result, trace) = engine.recommend(&busy_evening_context()).await.unwrap();

    let agreement = result.model_agreement.unwrap();
    assert_eq!(agreement.models_compared, 2);
    assert!(agreement.predictions.contains_key("gradient_boost"));
    assert!(agreement.predictions.contains_key("linear"));
    assert_eq!(
        trace.model_agreement.unwrap().models_compared,
        agreement.models_compared
    );
}

#[tokio::test]
async fn invalid_input_aborts_but_still_leaves_a_trace() {
    let engine = setup();
    let mut ctx = busy_evening_context();
    ctx.expected_ride_duration = -5.0;

    let err = engine.recommend(&ctx).await;
    assert!(matches!(err, Err(DomainError::InvalidInput(_))));

    // The failed run is still audited: one error step, persisted.
    let listed = engine.trace_list(10).unwrap();
    assert_eq!(listed.len(), 1);
    let stored = engine.trace_get(&listed[0].trace_id).unwrap().unwrap();
    assert_eq!(stored.steps.len(), 1);
    assert_eq!(stored.steps[0].name, STEP_INPUT_VALIDATION);
    assert_eq!(stored.steps[0].status, StepStatus::Error);
}

#[tokio::test]
async fn repeated_recommendations_agree() {
    let engine = setup();
    let ctx = busy_evening_context();

    let (first, _) = engine.recommend(&ctx).await.unwrap();
    let (second, _) = engine.recommend(&ctx).await.unwrap();
    assert_eq!(first.recommended_price, second.recommended_price);
    assert_eq!(first.price_before_rules, second.price_before_rules);
    // Each run gets its own trace even when the optimizer cache hits.
    assert_ne!(first.trace_id, second.trace_id);
}
