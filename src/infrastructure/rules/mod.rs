pub mod json_source;

pub use json_source::{default_rules, JsonRuleSource, StaticRuleSource};
