//! Rule configuration sources.
//!
//! Rules load either from a JSON file (operator-managed) or from the
//! built-in defaults compiled into the binary.

use crate::domain::error::DomainError;
use crate::domain::ports::rule_source::{
    MatchOperator, RuleAction, RuleCondition, RuleDefinition, RuleSource,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

pub struct JsonRuleSource {
    path: PathBuf,
}

impl JsonRuleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl RuleSource for JsonRuleSource {
    fn load_rules(&self) -> Result<Vec<RuleDefinition>, DomainError> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            DomainError::InvalidInput(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            DomainError::InvalidInput(format!("cannot parse {}: {}", self.path.display(), e))
        })
    }
}

/// Fixed, in-memory rule set. `Default` yields the built-in rules.
pub struct StaticRuleSource {
    rules: Vec<RuleDefinition>,
}

impl StaticRuleSource {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self { rules }
    }
}

impl Default for StaticRuleSource {
    fn default() -> Self {
        Self::new(default_rules())
    }
}

impl RuleSource for StaticRuleSource {
    fn load_rules(&self) -> Result<Vec<RuleDefinition>, DomainError> {
        Ok(self.rules.clone())
    }
}

/// Default pricing guardrails: minimum-profit floor, premium vehicle
/// floor, surge cap, loyalty discounts. Priority ordering places floors
/// before the cap before the discount.
pub fn default_rules() -> Vec<RuleDefinition> {
    vec![
        RuleDefinition {
            id: "minimum_profit_floor".to_string(),
            name: "Minimum profitable price".to_string(),
            priority: 10,
            condition: RuleCondition::Always,
            action: RuleAction::Floor {
                expr: "cost * 1.1".to_string(),
            },
        },
        RuleDefinition {
            id: "premium_vehicle_floor".to_string(),
            name: "Premium vehicle floor".to_string(),
            priority: 20,
            condition: RuleCondition::FieldMatch {
                field: "vehicle_type".to_string(),
                operator: MatchOperator::Equals,
                values: vec!["Premium".to_string()],
            },
            action: RuleAction::Floor {
                expr: "cost * 1.2".to_string(),
            },
        },
        RuleDefinition {
            id: "surge_price_cap".to_string(),
            name: "Surge price cap".to_string(),
            priority: 30,
            condition: RuleCondition::Always,
            action: RuleAction::Cap {
                expr: "cost * 3.0".to_string(),
            },
        },
        RuleDefinition {
            id: "loyalty_discount".to_string(),
            name: "Loyalty tier discount".to_string(),
            priority: 40,
            condition: RuleCondition::Always,
            action: RuleAction::Discount {
                rates: BTreeMap::from([
                    ("Silver".to_string(), 0.05),
                    ("Gold".to_string(), 0.10),
                    ("Platinum".to_string(), 0.15),
                ]),
            },
        },
    ]
}
