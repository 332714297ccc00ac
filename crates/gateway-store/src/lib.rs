//! # Gateway Store
//!
//! Transient key-value storage and the response registry built on it. The
//! registry maps a provider-issued response id to the provider descriptor
//! that produced it, so follow-up calls reach the same backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod kv;
pub mod registry;

pub use kv::{KvStore, MemoryKvStore, StoreError, StoreResult};
pub use registry::{ResponseRegistry, ResponseRegistryEntry, RESPONSE_TTL};
