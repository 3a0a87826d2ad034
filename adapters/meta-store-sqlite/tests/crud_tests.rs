//! Meta store CRUD operation tests
//!
//! Tests add, read, update and delete of meta entries and parent entities

use metafield::entity_adapter::{EntityDirectory, ParentEntity};
use metafield::meta_store::MetaStore;
use metafield::prelude::*;
use metafield_meta_store_sqlite::{DB_FILE, MetaStoreSqlite};
use serde_json::json;
use sqlx::sqlite;
use tempfile::TempDir;

async fn create_test_store() -> (MetaStoreSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");

	let store = MetaStoreSqlite::new(temp_dir.path()).await.expect("Failed to create store");

	(store, temp_dir)
}

fn post(id: u64, owner: u64, status: &str) -> ParentEntity {
	ParentEntity {
		entity_type: EntityType::Post,
		entity_id: EntityId(id),
		owner: Some(UserId(owner)),
		status: status.into(),
	}
}

#[tokio::test]
async fn test_add_and_read() {
	let (store, _temp) = create_test_store().await;

	let id = store.add(EntityType::Post, EntityId(1), "color", &json!("red")).await.unwrap();
	let entry = store.get_by_entry_id(EntityType::Post, id).await.unwrap().expect("entry exists");

	assert_eq!(entry.entry_id, id);
	assert_eq!(entry.entity_id, EntityId(1));
	assert_eq!(entry.key.as_ref(), "color");
	assert_eq!(entry.value, json!("red"));
}

#[tokio::test]
async fn test_values_keep_their_type() {
	let (store, _temp) = create_test_store().await;

	for value in [json!(4.5), json!(true), json!("12"), json!({ "a": [1, 2] })] {
		let id = store.add(EntityType::User, EntityId(2), "v", &value).await.unwrap();
		let entry = store.get_by_entry_id(EntityType::User, id).await.unwrap().unwrap();
		assert_eq!(entry.value, value);
	}
}

#[tokio::test]
async fn test_get_is_scoped_and_ordered() {
	let (store, _temp) = create_test_store().await;

	let a = store.add(EntityType::Post, EntityId(1), "tags", &json!("a")).await.unwrap();
	let b = store.add(EntityType::Post, EntityId(1), "tags", &json!("b")).await.unwrap();
	store.add(EntityType::Post, EntityId(2), "tags", &json!("c")).await.unwrap();
	store.add(EntityType::Term, EntityId(1), "tags", &json!("d")).await.unwrap();
	store.add(EntityType::Post, EntityId(1), "color", &json!("red")).await.unwrap();

	let entries = store.get(EntityType::Post, EntityId(1), "tags").await.unwrap();
	let ids: Vec<EntryId> = entries.iter().map(|e| e.entry_id).collect();
	assert_eq!(ids, [a, b]);

	assert!(store.get(EntityType::Comment, EntityId(1), "tags").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_numbers_survive_list_and_update() {
	let (store, _temp) = create_test_store().await;

	let id = store.add(EntityType::Post, EntityId(1), "rating", &json!(4)).await.unwrap();
	store.add(EntityType::Post, EntityId(1), "rating", &json!(2.5)).await.unwrap();

	let values: Vec<MetaValue> =
		store.get(EntityType::Post, EntityId(1), "rating").await.unwrap().into_iter().map(|e| e.value).collect();
	assert_eq!(values, [json!(4), json!(2.5)]);

	assert!(store.update_by_entry_id(EntityType::Post, id, "rating", &json!(5)).await.unwrap());
	let entry = store.get_by_entry_id(EntityType::Post, id).await.unwrap().unwrap();
	assert_eq!(entry.value, json!(5));
}

#[tokio::test]
async fn test_reads_numbers_from_json_typed_column() {
	let temp_dir = TempDir::new().unwrap();
	{
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(temp_dir.path().join(DB_FILE))
			.create_if_missing(true);
		let pool = sqlite::SqlitePoolOptions::new().connect_with(opts).await.unwrap();
		sqlx::query(
			"CREATE TABLE meta (
			entry_id integer PRIMARY KEY AUTOINCREMENT,
			entity_type text NOT NULL,
			entity_id integer NOT NULL,
			key text NOT NULL,
			value json
		)",
		)
		.execute(&pool)
		.await
		.unwrap();
		sqlx::query("INSERT INTO meta (entity_type, entity_id, key, value) VALUES ('post', 1, 'rating', '4')")
			.execute(&pool)
			.await
			.unwrap();
		pool.close().await;
	}

	let store = MetaStoreSqlite::new(temp_dir.path()).await.unwrap();
	let entries = store.get(EntityType::Post, EntityId(1), "rating").await.unwrap();
	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].value, json!(4));
}

#[tokio::test]
async fn test_entry_id_is_scoped_by_entity_type() {
	let (store, _temp) = create_test_store().await;

	let id = store.add(EntityType::Post, EntityId(1), "color", &json!("red")).await.unwrap();
	assert!(store.get_by_entry_id(EntityType::User, id).await.unwrap().is_none());
	assert!(!store.delete_by_entry_id(EntityType::User, id).await.unwrap());
}

#[tokio::test]
async fn test_update() {
	let (store, _temp) = create_test_store().await;

	let id = store.add(EntityType::Post, EntityId(1), "color", &json!("red")).await.unwrap();
	assert!(store.update_by_entry_id(EntityType::Post, id, "shade", &json!("blue")).await.unwrap());

	let entry = store.get_by_entry_id(EntityType::Post, id).await.unwrap().unwrap();
	assert_eq!(entry.key.as_ref(), "shade");
	assert_eq!(entry.value, json!("blue"));

	assert!(!store.update_by_entry_id(EntityType::Post, EntryId(999), "x", &json!("y")).await.unwrap());
}

#[tokio::test]
async fn test_delete() {
	let (store, _temp) = create_test_store().await;

	let id = store.add(EntityType::Comment, EntityId(3), "flag", &json!("spam")).await.unwrap();
	assert!(store.delete_by_entry_id(EntityType::Comment, id).await.unwrap());
	assert!(store.get_by_entry_id(EntityType::Comment, id).await.unwrap().is_none());
	assert!(!store.delete_by_entry_id(EntityType::Comment, id).await.unwrap());
}

#[tokio::test]
async fn test_entity_directory() {
	let (store, _temp) = create_test_store().await;

	assert!(store.get_parent_entity(EntityType::Post, EntityId(5)).await.unwrap().is_none());

	store.upsert_entity(&post(5, 7, "draft")).await.unwrap();
	store.upsert_entity(&post(5, 7, "publish")).await.unwrap();
	let entity = store.get_parent_entity(EntityType::Post, EntityId(5)).await.unwrap().unwrap();
	assert_eq!(entity, post(5, 7, "publish"));

	let term = ParentEntity {
		entity_type: EntityType::Term,
		entity_id: EntityId(5),
		owner: None,
		status: "".into(),
	};
	store.upsert_entity(&term).await.unwrap();
	assert_eq!(store.get_parent_entity(EntityType::Term, EntityId(5)).await.unwrap(), Some(term));
}

#[tokio::test]
async fn test_delete_entity_removes_meta() {
	let (store, _temp) = create_test_store().await;

	store.upsert_entity(&post(5, 7, "publish")).await.unwrap();
	let id = store.add(EntityType::Post, EntityId(5), "color", &json!("red")).await.unwrap();

	assert!(store.delete_entity(EntityType::Post, EntityId(5)).await.unwrap());
	assert!(store.get_by_entry_id(EntityType::Post, id).await.unwrap().is_none());
	assert!(store.get_parent_entity(EntityType::Post, EntityId(5)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_reopen_keeps_data() {
	let temp_dir = TempDir::new().unwrap();
	let id = {
		let store = MetaStoreSqlite::new(temp_dir.path()).await.unwrap();
		store.add(EntityType::Post, EntityId(1), "color", &json!("red")).await.unwrap()
	};

	let store = MetaStoreSqlite::new(temp_dir.path()).await.unwrap();
	assert!(store.get_by_entry_id(EntityType::Post, id).await.unwrap().is_some());
}

// vim: ts=4
