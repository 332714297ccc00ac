//! Integration tests for the Apex gateway
//!
//! Runs the real server on a local port against wiremock providers:
//! - Protocol scenarios across OpenAI, Azure and Anthropic backends
//! - Streaming transcoding over a live connection
//! - Composite model names, credential rotation and table reloads
//! - Response registry follow-ups

pub mod fixtures;
pub mod helpers;
pub mod mock_providers;

pub use fixtures::*;
pub use helpers::*;
pub use mock_providers::*;

#[cfg(test)]
mod responses_tests;
#[cfg(test)]
mod routing_tests;
#[cfg(test)]
mod scenario_tests;
#[cfg(test)]
mod streaming_tests;
