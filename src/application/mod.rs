pub mod optimizer;
pub mod pipeline;
pub mod registry;
pub mod rules;
pub mod segmentation;
pub mod sensitivity;
pub mod tracer;
