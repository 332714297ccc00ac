//! # Gateway Telemetry
//!
//! Structured logging for the Apex gateway:
//! - Pretty or JSON log output with `RUST_LOG` filtering
//! - Span macros for inbound requests and upstream calls

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod logging;
pub mod spans;

pub use logging::{init_logging, LoggingConfig, LoggingError};
