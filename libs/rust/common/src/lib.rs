//! Shared cross-cutting concerns for the vaultenv workspace.
//!
//! This crate provides centralized implementations for:
//! - Retryability classification for fallible operations
//! - Retry policies with exponential backoff
//! - HTTP client configuration and building
//! - Tracing subscriber initialisation
//! - Human-friendly duration parsing for CLI flags

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod duration;
pub mod error;
pub mod http;
pub mod retry;
pub mod tracing_config;

pub use duration::{parse_duration, DurationParseError};
pub use error::Retryable;
pub use http::{build_http_client, HttpConfig};
pub use retry::{RetryConfig, RetryPolicy};
pub use tracing_config::{init_tracing, TracingConfig};
