mod common;

use common::{busy_evening_context, quiet_afternoon_context, setup};
use farecraft::domain::error::DomainError;
use farecraft::domain::values::confidence::ConfidenceLevel;

#[test]
fn classification_is_deterministic() {
    let engine = setup();
    let ctx = busy_evening_context();

    let first = engine.classify(&ctx).unwrap();
    let second = engine.classify(&ctx).unwrap();
    assert_eq!(first.cluster_id, second.cluster_id);
    assert_eq!(first.segment_name, second.segment_name);
    assert_eq!(first.centroid_distance, second.centroid_distance);
}

#[test]
fn busy_evening_lands_in_urban_peak_premium() {
    let engine = setup();
    let result = engine.classify(&busy_evening_context()).unwrap();
    assert_eq!(result.segment_name, "Urban_Peak_Premium");
    assert!(result.centroid_distance >= 0.0);
}

#[test]
fn different_markets_land_in_different_segments() {
    let engine = setup();
    let busy = engine.classify(&busy_evening_context()).unwrap();
    let quiet = engine.classify(&quiet_afternoon_context()).unwrap();
    assert_ne!(busy.cluster_id, quiet.cluster_id);
}

#[test]
fn confidence_tracks_centroid_distance() {
    let engine = setup();
    let result = engine.classify(&busy_evening_context()).unwrap();
    let expected = if result.centroid_distance < 1.0 {
        ConfidenceLevel::High
    } else if result.centroid_distance < 2.0 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    };
    assert_eq!(result.confidence, expected);
}

#[test]
fn invalid_context_is_rejected_before_classification() {
    let engine = setup();
    let mut ctx = busy_evening_context();
    ctx.average_ratings = 7.5;
    assert!(matches!(
        engine.classify(&ctx),
        Err(DomainError::InvalidInput(_))
    ));
}
