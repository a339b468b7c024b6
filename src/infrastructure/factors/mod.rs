pub mod http;
pub mod noop;

pub use http::HttpFactorProvider;
pub use noop::NoopFactorProvider;
