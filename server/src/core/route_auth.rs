//! Bearer token authentication middleware

const TOKEN_EXPIRE: u64 = 8; /* hours */

use axum::{
	body::Body,
	extract::State,
	http::{Request, header, response::Response},
	middleware::Next,
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time;

use crate::core::extract::Auth;
use crate::prelude::*;

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthToken<S> {
	pub sub: u64,
	pub exp: u64,
	/// Comma separated roles
	pub r: Option<S>,
}

pub fn generate_access_token(secret: &str, user_id: UserId, roles: &[&str]) -> MfResult<Box<str>> {
	let expire = time::SystemTime::now()
		.duration_since(time::UNIX_EPOCH)
		.map_err(|_| Error::Internal("system clock before epoch".to_string()))?
		.as_secs() + 3600 * TOKEN_EXPIRE;

	let roles = roles.join(",");
	let token = encode(
		&Header::new(Algorithm::HS256),
		&AuthToken::<&str> {
			sub: user_id.0,
			exp: expire,
			r: if roles.is_empty() { None } else { Some(roles.as_str()) },
		},
		&EncodingKey::from_secret(secret.as_bytes()),
	)
	.map_err(|err| Error::Internal(format!("cannot sign token: {}", err)))?;

	Ok(token.into())
}

fn validate_token(secret: &str, token: &str) -> MfResult<AuthCtx> {
	let decoding_key = DecodingKey::from_secret(secret.as_bytes());

	let token_data = decode::<AuthToken<Box<str>>>(token, &decoding_key, &Validation::new(Algorithm::HS256))
		.map_err(|err| {
			debug!("Token rejected: {}", err);
			Error::Unauthorized
		})?;

	let roles = token_data.claims.r.unwrap_or_default();
	Ok(AuthCtx {
		user_id: UserId(token_data.claims.sub),
		roles: roles.split(',').map(str::trim).filter(|r| !r.is_empty()).map(Box::from).collect(),
	})
}

/// Attach the caller identity when a bearer token is present.
///
/// Requests without a token proceed anonymously; an invalid token is rejected.
pub async fn optional_auth(
	State(app): State<App>,
	mut req: Request<Body>,
	next: Next,
) -> MfResult<Response<Body>> {
	if let Some(auth_header) = req.headers().get(header::AUTHORIZATION) {
		let token = auth_header
			.to_str()
			.ok()
			.and_then(|h| h.strip_prefix("Bearer "))
			.ok_or(Error::Unauthorized)?;
		let auth = validate_token(&app.opts.jwt_secret, token.trim())?;
		debug!(user = %auth.user_id, "Authenticated request");
		req.extensions_mut().insert(Auth(auth));
	}

	Ok(next.run(req).await)
}


// vim: ts=4
