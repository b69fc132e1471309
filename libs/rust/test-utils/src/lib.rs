//! Shared test utilities for vaultenv.
//!
//! This crate provides:
//! - An in-memory [`SecretStore`](vaultenv_vault::SecretStore) fake
//! - Proptest generators for secret trees
//! - Test fixtures with sample data

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod mocks;

pub use generators::*;
pub use mocks::{InMemoryStore, ListingOrder, StoreCall};
