pub mod cache;
pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;

pub use config::{AppConfig, CacheBackendKind};
pub use observability::{apply_logging_level, init_tracing, init_tracing_with_level};
pub use server::{AppState, KeystileServer, ServerBuilder, build_app, router};
