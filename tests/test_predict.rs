mod common;

use common::{busy_evening_context, setup};
use farecraft::domain::error::DomainError;

#[test]
fn both_builtin_models_predict() {
    let engine = setup();
    let ctx = busy_evening_context();

    let predictions = engine.predict_all(&ctx, ctx.historical_cost_of_ride).unwrap();
    assert_eq!(predictions.len(), 2);
    assert!(predictions.contains_key("gradient_boost"));
    assert!(predictions.contains_key("linear"));
    assert!(predictions.values().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn demand_is_monotonically_damped_by_price() {
    let engine = setup();
    let ctx = busy_evening_context();
    let cost = ctx.historical_cost_of_ride;

    let at_cost = engine.predict_all(&ctx, cost).unwrap();
    let above = engine.predict_all(&ctx, cost * 2.0).unwrap();
    for (name, demand) in &at_cost {
        assert!(
            above[name] < *demand,
            "model {name} did not dampen demand above cost"
        );
    }
}

#[test]
fn gradient_boost_exposes_normalized_importances() {
    let engine = setup();
    let contributions = engine.explain_model("gradient_boost").unwrap().unwrap();
    let total: f64 = contributions.iter().map(|c| c.weight).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(contributions.iter().all(|c| c.weight >= 0.0));
}

#[test]
fn linear_model_exposes_signed_coefficients() {
    let engine = setup();
    let contributions = engine.explain_model("linear").unwrap().unwrap();
    assert!(contributions.iter().any(|c| c.weight < 0.0));
    assert!(contributions
        .iter()
        .any(|c| c.feature == "price_to_cost_ratio"));
}

#[test]
fn unknown_model_is_unavailable() {
    let engine = setup();
    assert!(matches!(
        engine.explain_model("nonexistent"),
        Err(DomainError::ModelUnavailable(_))
    ));
}

#[test]
fn model_names_are_sorted_and_complete() {
    let engine = setup();
    assert_eq!(
        engine.model_names().unwrap(),
        vec!["gradient_boost", "linear"]
    );
}
