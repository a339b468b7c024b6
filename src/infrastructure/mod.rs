pub mod factors;
pub mod models;
pub mod rules;
pub mod sqlite;
pub mod store;
