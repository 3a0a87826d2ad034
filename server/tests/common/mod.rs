//! Shared helpers for HTTP tests
//!
//! Builds an app on a temporary SQLite store with a handful of registered
//! keys and two posts owned by `OWNER`.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use metafield::entity_adapter::ParentEntity;
use metafield::prelude::*;
use metafield::registry::MetaKeyDefinition;
use metafield::types::ValueType;
use metafield::rule::DenyAll;
use metafield::{AppBuilder, generate_access_token};
use metafield_meta_store_sqlite::MetaStoreSqlite;

pub const SECRET: &str = "test-secret";
pub const BASE_URL: &str = "http://localhost:8080";
pub const OWNER: u64 = 7;
pub const STRANGER: u64 = 8;
pub const POST: u64 = 5;
pub const DRAFT: u64 = 9;

pub struct TestApp {
	pub app: App,
	pub router: Router,
	pub store: Arc<MetaStoreSqlite>,
	_temp: TempDir,
}

fn post(id: u64, owner: u64, status: &str) -> ParentEntity {
	ParentEntity {
		entity_type: EntityType::Post,
		entity_id: EntityId(id),
		owner: Some(UserId(owner)),
		status: status.into(),
	}
}

pub async fn test_app() -> TestApp {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let store = Arc::new(MetaStoreSqlite::new(temp.path()).await.expect("Failed to create store"));
	store.upsert_entity(&post(POST, OWNER, "publish")).await.unwrap();
	store.upsert_entity(&post(DRAFT, OWNER, "draft")).await.unwrap();

	let mut builder = AppBuilder::new();
	builder
		.meta_store(store.clone())
		.entity_directory(store.clone())
		.jwt_secret(SECRET)
		.base_url(BASE_URL);

	let registry = builder.registry_mut();
	for def in [
		MetaKeyDefinition::builder("color").show_in_rest(true).description("Accent color"),
		MetaKeyDefinition::builder("rating").value_type(ValueType::Number).show_in_rest(true),
		MetaKeyDefinition::builder("tags").single(false).show_in_rest(true),
		MetaKeyDefinition::builder("internal_note"),
		MetaKeyDefinition::builder("_featured").show_in_rest(true),
		MetaKeyDefinition::builder("locked").show_in_rest(true).authorization_rule(Arc::new(DenyAll)),
	] {
		registry.register(EntityType::Post, def.build().unwrap()).unwrap();
	}

	let app = builder.build().expect("Failed to build app");
	let router = metafield::routes::init(app.clone());

	TestApp { app, router, store, _temp: temp }
}

pub fn token(user: u64) -> String {
	generate_access_token(SECRET, UserId(user), &[]).unwrap().to_string()
}

impl TestApp {
	/// Send a request and return its status and JSON body
	pub async fn call(
		&self,
		method: Method,
		uri: &str,
		user: Option<u64>,
		body: Option<Value>,
	) -> (StatusCode, Value) {
		let mut req = Request::builder().method(method).uri(uri);
		if let Some(user) = user {
			req = req.header(header::AUTHORIZATION, format!("Bearer {}", token(user)));
		}
		let req = match body {
			Some(body) => req
				.header(header::CONTENT_TYPE, "application/json")
				.body(Body::from(body.to_string()))
				.unwrap(),
			None => req.body(Body::empty()).unwrap(),
		};

		let res = self.router.clone().oneshot(req).await.unwrap();
		let status = res.status();
		let bytes = res.into_body().collect().await.unwrap().to_bytes();
		let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
		(status, json)
	}
}

// vim: ts=4
