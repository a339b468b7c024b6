pub mod migrations;
pub mod trace_repo;

pub use migrations::run_migrations;
pub use trace_repo::SqliteTraceRepo;
