//! SQLite implementation of the metafield [`MetaStore`] and [`EntityDirectory`].
//!
//! Parent entities are owned by the host application; it keeps the
//! `entities` table current through [`MetaStoreSqlite::upsert_entity`].

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use metafield::entity_adapter::{EntityDirectory, ParentEntity};
use metafield::meta_store::{MetaEntry, MetaStore};
use metafield::prelude::*;

mod entity;
mod meta;
mod schema;
mod utils;

pub const DB_FILE: &str = "meta.db";

#[derive(Debug)]
pub struct MetaStoreSqlite {
	db: SqlitePool,
}

impl MetaStoreSqlite {
	/// Open (or create) the database in `dir`
	pub async fn new(dir: impl AsRef<Path>) -> MfResult<Self> {
		let dir = dir.as_ref();
		tokio::fs::create_dir_all(dir).await?;

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(dir.join(DB_FILE))
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		schema::init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		info!(path = %dir.display(), "Meta store opened");
		Ok(Self { db })
	}

	/// Insert or replace a parent entity record
	pub async fn upsert_entity(&self, entity: &ParentEntity) -> MfResult<()> {
		entity::upsert(&self.db, entity).await
	}

	/// Delete a parent entity and all of its meta
	pub async fn delete_entity(&self, entity_type: EntityType, entity_id: EntityId) -> MfResult<bool> {
		entity::delete(&self.db, entity_type, entity_id).await
	}
}

#[async_trait]
impl MetaStore for MetaStoreSqlite {
	async fn get(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		key: &str,
	) -> MfResult<Vec<MetaEntry>> {
		meta::list_by_key(&self.db, entity_type, entity_id, key).await
	}

	async fn get_by_entry_id(
		&self,
		entity_type: EntityType,
		entry_id: EntryId,
	) -> MfResult<Option<MetaEntry>> {
		meta::read(&self.db, entity_type, entry_id).await
	}

	async fn add(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		key: &str,
		value: &MetaValue,
	) -> MfResult<EntryId> {
		meta::create(&self.db, entity_type, entity_id, key, value).await
	}

	async fn update_by_entry_id(
		&self,
		entity_type: EntityType,
		entry_id: EntryId,
		key: &str,
		value: &MetaValue,
	) -> MfResult<bool> {
		meta::update(&self.db, entity_type, entry_id, key, value).await
	}

	async fn delete_by_entry_id(
		&self,
		entity_type: EntityType,
		entry_id: EntryId,
	) -> MfResult<bool> {
		meta::delete(&self.db, entity_type, entry_id).await
	}
}

#[async_trait]
impl EntityDirectory for MetaStoreSqlite {
	async fn get_parent_entity(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
	) -> MfResult<Option<ParentEntity>> {
		entity::read(&self.db, entity_type, entity_id).await
	}
}

// vim: ts=4
