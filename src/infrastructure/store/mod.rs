pub mod builtin;
pub mod json_store;
