//! Schema endpoint

use axum::{
	Extension, Json,
	extract::{Query, State},
	http::StatusCode,
};

use metafield_core::schema::SchemaDocument;

use crate::core::extract::ContextQuery;
use crate::prelude::*;

/// GET /api/schema/{collection}
#[axum::debug_handler]
pub async fn get_schema(
	State(app): State<App>,
	Extension(entity_type): Extension<EntityType>,
	Query(query): Query<ContextQuery>,
) -> MfResult<(StatusCode, Json<SchemaDocument>)> {
	let doc = app.service.schema().build_schema_for(entity_type, query.context);
	Ok((StatusCode::OK, Json(doc)))
}

// vim: ts=4
