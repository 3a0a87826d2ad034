use axum::{
	Extension, Router, middleware,
	routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::route_auth::optional_auth;
use crate::meta;
use crate::prelude::*;

/// Meta routes of one parent collection
fn init_meta(entity_type: EntityType) -> Router<App> {
	Router::new()
		.route("/{parent_id}/meta", get(meta::handler::list_meta).post(meta::handler::post_meta))
		.route(
			"/{parent_id}/meta/{entry_id}",
			get(meta::handler::get_meta)
				.put(meta::handler::patch_meta)
				.patch(meta::handler::patch_meta)
				.delete(meta::handler::delete_meta),
		)
		.route("/{parent_id}/meta-key/{key}", get(meta::handler::get_meta_by_key))
		.layer(Extension(entity_type))
}

fn init_schema(entity_type: EntityType) -> Router<App> {
	Router::new()
		.route(&format!("/api/schema/{}", entity_type.collection()), get(meta::schema::get_schema))
		.layer(Extension(entity_type))
}

pub fn init(app: App) -> Router {
	let mut router = Router::new().route("/api/version", get(async || crate::VERSION));
	for entity_type in EntityType::ALL {
		router = router
			.nest(&format!("/api/{}", entity_type.collection()), init_meta(entity_type))
			.merge(init_schema(entity_type));
	}

	router
		.layer(middleware::from_fn_with_state(app.clone(), optional_auth))
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(app)
}

// vim: ts=4
