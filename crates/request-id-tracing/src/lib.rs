//! Logging and OTLP tracing setup for services built on the request-id layer.
//!
//! The layer wraps each request in an `http_request` span carrying
//! `request_id`, so the fmt output installed here stamps every log line
//! with it.

pub mod config;
pub mod otlp;

pub use config::{OtlpProtocol, TracingConfig};
pub use otlp::{init_tracing, TracingGuard};
