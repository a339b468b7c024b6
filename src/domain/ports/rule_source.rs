//! Rule configuration port.
//!
//! Pricing rules arrive as ordered definitions (id, name, priority,
//! condition, action) from a configuration source. The rules engine
//! compiles and validates them; this port only defines the wire shape.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchOperator {
    Equals,
    NotEquals,
    In,
    NotIn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleCondition {
    /// Unconditional.
    Always,
    /// Compare a named context attribute against one or more values.
    FieldMatch {
        field: String,
        operator: MatchOperator,
        values: Vec<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Raise price to at least the expression value.
    Floor { expr: String },
    /// Lower price to at most the expression value.
    Cap { expr: String },
    /// Multiply price by `1 - rate`, rate looked up by loyalty tier.
    /// A tier missing from the table gets rate 0 (no discount).
    Discount { rates: BTreeMap<String, f64> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub id: String,
    pub name: String,
    /// Rules are evaluated in ascending priority: floors before caps
    /// before discounts.
    pub priority: i32,
    pub condition: RuleCondition,
    pub action: RuleAction,
}

pub trait RuleSource: Send + Sync {
    fn load_rules(&self) -> Result<Vec<RuleDefinition>, DomainError>;
}
