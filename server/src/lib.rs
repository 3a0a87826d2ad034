//! HTTP surface of metafield.
//!
//! Wires the meta resource service into an axum router, with bearer-token
//! authentication and request tracing.

pub mod core;
pub mod meta;
pub mod prelude;
pub mod routes;

pub use crate::core::app::{App, AppBuilder, AppBuilderOpts, AppState, VERSION};
pub use crate::core::route_auth::generate_access_token;

pub use metafield_core::{config, dto, entity, notify, perm, registry, rule, schema, service};
pub use metafield_types::{abac, auth, entity_adapter, error, meta_store, types, value};

// vim: ts=4
