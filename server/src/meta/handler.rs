//! Meta resource handlers
//!
//! Each parent collection is mounted with an `Extension<EntityType>` so the
//! same handlers serve posts, users, comments and terms.

use axum::{
	Extension, Json,
	extract::{Path, Query, State},
	http::{StatusCode, header},
	response::IntoResponse,
};
use serde::Deserialize;
use serde_json::Map;

use metafield_core::dto::{DeleteResponse, MetaResponse};
use metafield_core::schema::Operation;
use metafield_core::service::{CreateMeta, UpdateMeta};

use crate::core::extract::{ContextQuery, OptionalAuth, lenient_bool};
use crate::prelude::*;

type Body = Map<String, MetaValue>;

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
	#[serde(default, deserialize_with = "lenient_bool")]
	pub force: bool,
}

/// Key of a request body; present but not a string is an error
fn body_key(body: &Body) -> MfResult<Option<&str>> {
	match body.get("key") {
		None | Some(MetaValue::Null) => Ok(None),
		Some(MetaValue::String(key)) => Ok(Some(key)),
		Some(_) => Err(Error::InvalidInput(ErrorCode::InvalidKey)),
	}
}

/// Validate the body against the argument rules of its key, if registered
fn validate_body(app: &App, entity_type: EntityType, body: &mut Body, operation: Operation) -> MfResult<()> {
	let args = match body_key(body)? {
		Some(key) => app.service.schema().endpoint_args(entity_type, key.trim(), operation),
		None => None,
	};
	if let Some(args) = args {
		args.validate(body)?;
	}
	Ok(())
}

/// GET /api/{collection}/{parent_id}/meta
#[axum::debug_handler]
pub async fn list_meta(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path(parent_id): Path<u64>,
	Query(query): Query<ContextQuery>,
) -> MfResult<(StatusCode, Json<ApiResponse<Vec<MetaResponse>>>)> {
	debug!(entity_type = %entity_type, parent = parent_id, context = ?query.context, "GET meta list");

	let ctx = auth.context(query);
	let items = app.service.list(entity_type, EntityId(parent_id), &ctx).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(items))))
}

/// GET /api/{collection}/{parent_id}/meta/{entry_id}
#[axum::debug_handler]
pub async fn get_meta(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path((parent_id, entry_id)): Path<(u64, u64)>,
	Query(query): Query<ContextQuery>,
) -> MfResult<(StatusCode, Json<ApiResponse<MetaResponse>>)> {
	let ctx = auth.context(query);
	let item = app.service.get_entry(entity_type, EntityId(parent_id), EntryId(entry_id), &ctx).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(item))))
}

/// GET /api/{collection}/{parent_id}/meta-key/{key}
#[axum::debug_handler]
pub async fn get_meta_by_key(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path((parent_id, key)): Path<(u64, String)>,
	Query(query): Query<ContextQuery>,
) -> MfResult<(StatusCode, Json<ApiResponse<MetaResponse>>)> {
	let ctx = auth.context(query);
	let item = app.service.get(entity_type, EntityId(parent_id), &key, &ctx).await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(item))))
}

/// POST /api/{collection}/{parent_id}/meta
#[axum::debug_handler]
pub async fn post_meta(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path(parent_id): Path<u64>,
	Json(mut body): Json<Body>,
) -> MfResult<impl IntoResponse> {
	validate_body(&app, entity_type, &mut body, Operation::Create)?;

	let req = CreateMeta {
		key: body_key(&body)?.unwrap_or_default().to_string(),
		value: body.remove("value").unwrap_or(MetaValue::Null),
	};
	info!(entity_type = %entity_type, parent = parent_id, key = %req.key, "POST meta");

	let ctx = RequestContext::new(auth.0, ViewMode::Edit);
	let item = app.service.create(entity_type, EntityId(parent_id), req, &ctx).await?;
	let location = item.links.self_.clone();

	Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(ApiResponse::new(item))))
}

/// PUT|PATCH /api/{collection}/{parent_id}/meta/{entry_id}
#[axum::debug_handler]
pub async fn patch_meta(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path((parent_id, entry_id)): Path<(u64, u64)>,
	Json(mut body): Json<Body>,
) -> MfResult<(StatusCode, Json<ApiResponse<MetaResponse>>)> {
	validate_body(&app, entity_type, &mut body, Operation::Edit)?;

	let req = UpdateMeta {
		key: body_key(&body)?.map(str::to_string),
		value: body.remove("value").filter(|v| !v.is_null()),
	};
	info!(entity_type = %entity_type, parent = parent_id, entry = entry_id, "PATCH meta");

	let ctx = RequestContext::new(auth.0, ViewMode::Edit);
	let item = app
		.service
		.update(entity_type, EntityId(parent_id), EntryId(entry_id), req, &ctx)
		.await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(item))))
}

/// DELETE /api/{collection}/{parent_id}/meta/{entry_id}?force=true
#[axum::debug_handler]
pub async fn delete_meta(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	auth: OptionalAuth,
	Path((parent_id, entry_id)): Path<(u64, u64)>,
	Query(query): Query<DeleteQuery>,
) -> MfResult<(StatusCode, Json<ApiResponse<DeleteResponse>>)> {
	info!(entity_type = %entity_type, parent = parent_id, entry = entry_id, force = query.force, "DELETE meta");

	let ctx = RequestContext::new(auth.0, ViewMode::Edit);
	let res = app
		.service
		.delete(entity_type, EntityId(parent_id), EntryId(entry_id), query.force, &ctx)
		.await?;

	Ok((StatusCode::OK, Json(ApiResponse::new(res))))
}

// vim: ts=4
