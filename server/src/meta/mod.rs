//! Meta resource endpoints

pub mod handler;
pub mod schema;

// vim: ts=4
