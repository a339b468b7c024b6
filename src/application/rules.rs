//! Business-rule post-processing of the optimized price.
//!
//! Rules are compiled from ordered configuration and evaluated in
//! ascending priority. The ordering is an invariant, not a convenience:
//! floors run before caps before discounts, otherwise a discount could
//! drop the price back below a floor that already fired.
//!
//! Expressions are restricted to two forms, `cost * <n>` or a bare
//! non-negative literal, so rule files can never smuggle in arbitrary
//! evaluation. Anything else fails at engine construction.

use crate::domain::entities::market_context::MarketContext;
use crate::domain::error::DomainError;
use crate::domain::ports::rule_source::{MatchOperator, RuleAction, RuleCondition, RuleDefinition};
use serde::Serialize;
use std::collections::BTreeMap;
use std::str::FromStr;

/// Context attributes a rule condition may reference. Field names in the
/// configuration resolve through this table when the engine is built, so
/// a typo is caught (and warned about) once, not on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextField {
    LocationCategory,
    CustomerLoyaltyStatus,
    TimeOfBooking,
    VehicleType,
}

impl ContextField {
    fn get(&self, ctx: &MarketContext) -> String {
        match self {
            ContextField::LocationCategory => ctx.location_category.to_string(),
            ContextField::CustomerLoyaltyStatus => ctx.customer_loyalty_status.to_string(),
            ContextField::TimeOfBooking => ctx.time_of_booking.to_string(),
            ContextField::VehicleType => ctx.vehicle_type.to_string(),
        }
    }
}

impl FromStr for ContextField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location_category" => Ok(ContextField::LocationCategory),
            "customer_loyalty_status" => Ok(ContextField::CustomerLoyaltyStatus),
            "time_of_booking" => Ok(ContextField::TimeOfBooking),
            "vehicle_type" => Ok(ContextField::VehicleType),
            _ => Err(format!("Unknown rule condition field: {s}")),
        }
    }
}

/// The two allowed expression forms for floor/cap bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
enum PriceExpr {
    CostMultiple(f64),
    Literal(f64),
}

impl PriceExpr {
    fn parse(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();
        if let Some(rest) = s.strip_prefix("cost") {
            let rest = rest.trim_start();
            let factor = rest
                .strip_prefix('*')
                .map(str::trim)
                .and_then(|f| f.parse::<f64>().ok())
                .filter(|f| *f > 0.0 && f.is_finite())
                .ok_or_else(|| DomainError::InvalidExpression(s.to_string()))?;
            return Ok(PriceExpr::CostMultiple(factor));
        }
        s.parse::<f64>()
            .ok()
            .filter(|v| *v >= 0.0 && v.is_finite())
            .map(PriceExpr::Literal)
            .ok_or_else(|| DomainError::InvalidExpression(s.to_string()))
    }

    fn eval(&self, cost: f64) -> f64 {
        match self {
            PriceExpr::CostMultiple(factor) => cost * factor,
            PriceExpr::Literal(value) => *value,
        }
    }
}

enum CompiledCondition {
    Always,
    Field {
        field: ContextField,
        operator: MatchOperator,
        values: Vec<String>,
    },
    /// Configuration referenced an unknown field; warned at load time,
    /// never matches at apply time.
    Invalid,
}

impl CompiledCondition {
    fn matches(&self, ctx: &MarketContext) -> bool {
        match self {
            CompiledCondition::Always => true,
            CompiledCondition::Invalid => false,
            CompiledCondition::Field {
                field,
                operator,
                values,
            } => {
                let actual = field.get(ctx);
                let contained = values.iter().any(|v| v.eq_ignore_ascii_case(&actual));
                match operator {
                    MatchOperator::Equals | MatchOperator::In => contained,
                    MatchOperator::NotEquals | MatchOperator::NotIn => !contained,
                }
            }
        }
    }
}

enum CompiledAction {
    Floor(PriceExpr),
    Cap(PriceExpr),
    Discount(BTreeMap<String, f64>),
}

struct CompiledRule {
    id: String,
    name: String,
    priority: i32,
    condition: CompiledCondition,
    action: CompiledAction,
}

/// One rule application that actually changed the price.
#[derive(Debug, Clone, Serialize)]
pub struct AppliedRule {
    pub rule_id: String,
    pub name: String,
    pub price_before: f64,
    pub price_after: f64,
    pub impact: f64,
    pub impact_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RulesResult {
    pub original_price: f64,
    pub final_price: f64,
    pub applied_rules: Vec<AppliedRule>,
}

pub struct RulesEngine {
    rules: Vec<CompiledRule>,
}

impl RulesEngine {
    /// Compile and validate rule definitions. Malformed expressions are
    /// fatal here (configuration validation time); unknown condition
    /// fields are logged and disabled, never raised.
    pub fn new(definitions: Vec<RuleDefinition>) -> Result<Self, DomainError> {
        let mut rules = Vec::with_capacity(definitions.len());
        for def in definitions {
            let condition = match def.condition {
                RuleCondition::Always => CompiledCondition::Always,
                RuleCondition::FieldMatch {
                    field,
                    operator,
                    values,
                } => match field.parse::<ContextField>() {
                    Ok(field) => CompiledCondition::Field {
                        field,
                        operator,
                        values,
                    },
                    Err(msg) => {
                        tracing::warn!(rule = %def.id, "{msg}; rule disabled");
                        CompiledCondition::Invalid
                    }
                },
            };
            let action = match def.action {
                RuleAction::Floor { expr } => CompiledAction::Floor(PriceExpr::parse(&expr)?),
                RuleAction::Cap { expr } => CompiledAction::Cap(PriceExpr::parse(&expr)?),
                RuleAction::Discount { rates } => CompiledAction::Discount(rates),
            };
            rules.push(CompiledRule {
                id: def.id,
                name: def.name,
                priority: def.priority,
                condition,
                action,
            });
        }
        // Stable sort keeps configuration order for equal priorities.
        rules.sort_by_key(|r| r.priority);
        Ok(Self { rules })
    }

    /// Run every matching rule in priority order, each consuming the
    /// previous rule's output price. Only applications that change the
    /// price are recorded.
    pub fn apply(&self, ctx: &MarketContext, optimal_price: f64) -> RulesResult {
        let cost = ctx.historical_cost_of_ride;
        let mut price = optimal_price;
        let mut applied = Vec::new();

        for rule in &self.rules {
            if !rule.condition.matches(ctx) {
                continue;
            }
            let before = price;
            let after = match &rule.action {
                CompiledAction::Floor(expr) => before.max(expr.eval(cost)),
                CompiledAction::Cap(expr) => before.min(expr.eval(cost)),
                CompiledAction::Discount(rates) => {
                    let tier = ctx.customer_loyalty_status.to_string();
                    let rate = rates
                        .iter()
                        .find(|(k, _)| k.eq_ignore_ascii_case(&tier))
                        .map(|(_, r)| *r)
                        .unwrap_or(0.0);
                    before * (1.0 - rate)
                }
            };
            if (after - before).abs() > 1e-9 {
                applied.push(AppliedRule {
                    rule_id: rule.id.clone(),
                    name: rule.name.clone(),
                    price_before: before,
                    price_after: after,
                    impact: after - before,
                    impact_percent: if before.abs() > f64::EPSILON {
                        (after - before) / before * 100.0
                    } else {
                        0.0
                    },
                });
                price = after;
            }
        }

        RulesResult {
            original_price: optimal_price,
            final_price: price,
            applied_rules: applied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::values::booking_time::BookingTime;
    use crate::domain::values::location::LocationCategory;
    use crate::domain::values::loyalty::LoyaltyTier;
    use crate::domain::values::vehicle::VehicleType;

    fn ctx(tier: LoyaltyTier) -> MarketContext {
        MarketContext {
            number_of_riders: 50,
            number_of_drivers: 25,
            location_category: LocationCategory::Urban,
            customer_loyalty_status: tier,
            number_of_past_rides: 12,
            average_ratings: 4.3,
            time_of_booking: BookingTime::Evening,
            vehicle_type: VehicleType::Premium,
            expected_ride_duration: 30.0,
            historical_cost_of_ride: 20.0,
        }
    }

    fn floor(id: &str, priority: i32, expr: &str) -> RuleDefinition {
        RuleDefinition {
            id: id.into(),
            name: id.into(),
            priority,
            condition: RuleCondition::Always,
            action: RuleAction::Floor { expr: expr.into() },
        }
    }

    fn cap(id: &str, priority: i32, expr: &str) -> RuleDefinition {
        RuleDefinition {
            id: id.into(),
            name: id.into(),
            priority,
            condition: RuleCondition::Always,
            action: RuleAction::Cap { expr: expr.into() },
        }
    }

    fn discount(id: &str, priority: i32, rates: &[(&str, f64)]) -> RuleDefinition {
        RuleDefinition {
            id: id.into(),
            name: id.into(),
            priority,
            condition: RuleCondition::Always,
            action: RuleAction::Discount {
                rates: rates.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            },
        }
    }

    #[test]
    fn test_expression_forms() {
        assert_eq!(PriceExpr::parse("cost * 1.5").unwrap(), PriceExpr::CostMultiple(1.5));
        assert_eq!(PriceExpr::parse("cost*2").unwrap(), PriceExpr::CostMultiple(2.0));
        assert_eq!(PriceExpr::parse("42.5").unwrap(), PriceExpr::Literal(42.5));
        assert!(PriceExpr::parse("cost + 5").is_err());
        assert!(PriceExpr::parse("price * 2").is_err());
        assert!(PriceExpr::parse("cost * -1").is_err());
        assert!(PriceExpr::parse("-3").is_err());
    }

    #[test]
    fn test_invalid_expression_fails_at_construction() {
        let err = RulesEngine::new(vec![floor("bad", 1, "cost ** 2")]);
        assert!(matches!(err, Err(DomainError::InvalidExpression(_))));
    }

    #[test]
    fn test_floor_cap_discount_ordering() {
        // Deliberately declared out of order; priorities must win.
        let engine = RulesEngine::new(vec![
            discount("loyalty", 30, &[("Gold", 0.10)]),
            cap("cap", 20, "cost * 2.0"),
            floor("floor", 10, "cost * 1.5"),
        ])
        .unwrap();

        // cost 20: floor → 30, cap (40) no-op, 10% discount → 27
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 25.0);
        assert!((result.final_price - 27.0).abs() < 1e-9);
        assert_eq!(result.applied_rules.len(), 2);
        assert_eq!(result.applied_rules[0].rule_id, "floor");
        assert_eq!(result.applied_rules[1].rule_id, "loyalty");

        // cost 20, price 55: floor no-op, cap → 40, discount → 36
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 55.0);
        assert!((result.final_price - 36.0).abs() < 1e-9);
        assert_eq!(result.applied_rules[0].rule_id, "cap");
    }

    #[test]
    fn test_unknown_tier_gets_no_discount() {
        let engine = RulesEngine::new(vec![discount("loyalty", 1, &[("Gold", 0.10)])]).unwrap();
        let result = engine.apply(&ctx(LoyaltyTier::Bronze), 50.0);
        assert_eq!(result.final_price, 50.0);
        assert!(result.applied_rules.is_empty());
    }

    #[test]
    fn test_unknown_field_disables_rule() {
        let engine = RulesEngine::new(vec![RuleDefinition {
            id: "typo".into(),
            name: "typo".into(),
            priority: 1,
            condition: RuleCondition::FieldMatch {
                field: "vehicle_typ".into(),
                operator: MatchOperator::Equals,
                values: vec!["Premium".into()],
            },
            action: RuleAction::Floor {
                expr: "cost * 5".into(),
            },
        }])
        .unwrap();
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 30.0);
        assert_eq!(result.final_price, 30.0);
    }

    #[test]
    fn test_field_match_operators() {
        let premium_floor = RuleDefinition {
            id: "premium".into(),
            name: "premium".into(),
            priority: 1,
            condition: RuleCondition::FieldMatch {
                field: "vehicle_type".into(),
                operator: MatchOperator::Equals,
                values: vec!["Premium".into()],
            },
            action: RuleAction::Floor {
                expr: "cost * 2.0".into(),
            },
        };
        let engine = RulesEngine::new(vec![premium_floor]).unwrap();
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 25.0);
        assert!((result.final_price - 40.0).abs() < 1e-9);

        let engine = RulesEngine::new(vec![RuleDefinition {
            id: "not_urban".into(),
            name: "not_urban".into(),
            priority: 1,
            condition: RuleCondition::FieldMatch {
                field: "location_category".into(),
                operator: MatchOperator::NotIn,
                values: vec!["Urban".into(), "Suburban".into()],
            },
            action: RuleAction::Floor {
                expr: "cost * 2.0".into(),
            },
        }])
        .unwrap();
        // Urban context: not_in fails, floor skipped.
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 25.0);
        assert_eq!(result.final_price, 25.0);
    }

    #[test]
    fn test_noop_rules_not_recorded() {
        let engine = RulesEngine::new(vec![floor("floor", 1, "cost * 1.0")]).unwrap();
        let result = engine.apply(&ctx(LoyaltyTier::Gold), 50.0);
        assert!(result.applied_rules.is_empty());
        assert_eq!(result.original_price, 50.0);
        assert_eq!(result.final_price, 50.0);
    }
}
