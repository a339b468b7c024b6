pub mod decision_trace;
pub mod market_context;
pub mod segment;
