//! Shared types, adapter traits, and core utilities for metafield.
//!
//! Everything the storage adapters and the service crates agree on lives
//! here, so adapter crates can compile without pulling in the HTTP layer.

pub mod abac;
pub mod auth;
pub mod entity_adapter;
pub mod error;
pub mod meta_store;
pub mod prelude;
pub mod types;
pub mod value;

// vim: ts=4
