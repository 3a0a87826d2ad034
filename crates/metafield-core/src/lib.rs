//! Core of the metafield service.
//!
//! Holds the meta key registry, the authorization rules and permission
//! engine, the per-entity-type adapters, the schema builder and the
//! resource service that ties them to a [`MetaStore`](metafield_types::meta_store::MetaStore).

pub mod config;
pub mod dto;
pub mod entity;
pub mod notify;
pub mod perm;
pub mod prelude;
pub mod registry;
pub mod rule;
pub mod schema;
pub mod service;

// vim: ts=4
