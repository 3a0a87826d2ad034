//! Custom extractors for request identity and context

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::{Deserialize, Deserializer};

use crate::prelude::*;

// Auth //
//******//
/// Caller identity, inserted into the request extensions by `optional_auth`
#[derive(Debug, Clone)]
pub struct Auth(pub AuthCtx);

// OptionalAuth //
//***************//
/// Optional auth extractor that doesn't fail if auth is missing
#[derive(Debug, Clone)]
pub struct OptionalAuth(pub Option<AuthCtx>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth = parts.extensions.get::<Auth>().cloned().map(|a| a.0);
		Ok(OptionalAuth(auth))
	}
}

// Query parameters //
//******************//
/// `?context=view|edit`, defaults to view
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ContextQuery {
	#[serde(default)]
	pub context: ViewMode,
}

impl OptionalAuth {
	pub fn context(self, query: ContextQuery) -> RequestContext {
		RequestContext::new(self.0, query.context)
	}
}

/// Query flag: `""`, `0`, `false`, `no` and `off` (any case) are false,
/// every other value is true
pub fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = String::deserialize(deserializer)?;
	Ok(!matches!(raw.trim().to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off"))
}


// vim: ts=4
