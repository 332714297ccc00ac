//! # Gateway Routing
//!
//! Turns a requested model name into one concrete provider:
//! - [`ProviderRegistry`] resolves direct and composite `model#provider` names
//! - [`ProviderSelector`] draws one provider and one credential at random

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod registry;
pub mod selector;

pub use registry::ProviderRegistry;
pub use selector::{FixedRandom, ProviderSelector, RandomSource, ThreadRandom};
