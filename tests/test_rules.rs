mod common;

use common::{busy_evening_context, quiet_afternoon_context, setup};

// Built-in rule set: floor cost*1.1, premium floor cost*1.2,
// cap cost*3.0, loyalty discount (Silver 5%, Gold 10%, Platinum 15%).

#[test]
fn gold_discount_applies_last() {
    let engine = setup();
    let ctx = busy_evening_context(); // Gold, Premium, cost 35

    let result = engine.apply_rules(&ctx, 80.0).unwrap();
    assert_eq!(result.original_price, 80.0);
    // No floor or cap fires at 80; only the 10% Gold discount.
    assert!((result.final_price - 72.0).abs() < 1e-9);
    assert_eq!(result.applied_rules.len(), 1);
    assert_eq!(result.applied_rules[0].rule_id, "loyalty_discount");
}

#[test]
fn floors_fire_in_priority_order() {
    let engine = setup();
    let ctx = busy_evening_context();

    // 30 is below both floors: cost*1.1 = 38.5, then premium cost*1.2 = 42,
    // then the Gold discount takes 10% off.
    let result = engine.apply_rules(&ctx, 30.0).unwrap();
    let ids: Vec<&str> = result
        .applied_rules
        .iter()
        .map(|r| r.rule_id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec!["minimum_profit_floor", "premium_vehicle_floor", "loyalty_discount"]
    );
    assert!((result.final_price - 42.0 * 0.9).abs() < 1e-9);
}

#[test]
fn surge_cap_limits_extreme_prices() {
    let engine = setup();
    let mut ctx = busy_evening_context();
    ctx.customer_loyalty_status = "bronze".parse().unwrap();

    let result = engine.apply_rules(&ctx, 500.0).unwrap();
    // Cap is cost*3.0 = 105; Bronze gets no discount.
    assert!((result.final_price - 105.0).abs() < 1e-9);
    assert_eq!(result.applied_rules.len(), 1);
    assert_eq!(result.applied_rules[0].rule_id, "surge_price_cap");
}

#[test]
fn bronze_economy_in_band_is_untouched() {
    let engine = setup();
    let ctx = quiet_afternoon_context(); // Bronze, Economy, cost 22

    let result = engine.apply_rules(&ctx, 40.0).unwrap();
    assert_eq!(result.final_price, 40.0);
    assert!(result.applied_rules.is_empty());
}

#[test]
fn premium_floor_skips_economy_rides() {
    let engine = setup();
    let ctx = quiet_afternoon_context();

    // Below the general floor (24.2) but the premium floor must not fire.
    let result = engine.apply_rules(&ctx, 23.0).unwrap();
    assert!((result.final_price - 22.0 * 1.1).abs() < 1e-9);
    assert!(result
        .applied_rules
        .iter()
        .all(|r| r.rule_id != "premium_vehicle_floor"));
}

#[test]
fn rule_impact_is_reported_per_rule() {
    let engine = setup();
    let ctx = busy_evening_context();

    let result = engine.apply_rules(&ctx, 80.0).unwrap();
    let discount = &result.applied_rules[0];
    assert_eq!(discount.price_before, 80.0);
    assert!((discount.price_after - 72.0).abs() < 1e-9);
    assert!((discount.impact_percent + 10.0).abs() < 1e-9);
}
