pub mod demand_model;
pub mod external_factors;
pub mod model_store;
pub mod rule_source;
pub mod trace_repository;
