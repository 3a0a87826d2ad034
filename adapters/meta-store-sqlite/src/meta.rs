//! Meta entry storage
//!
//! Values are kept as JSON text in a text column so numbers and booleans
//! survive a round trip.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use metafield::meta_store::MetaEntry;
use metafield::prelude::*;

use crate::utils::{db_err, decode_err, from_db_id, inspect, to_db_id};

// Databases created with a json-typed column hold numbers as INTEGER/REAL
const COLUMNS: &str = "entry_id, entity_type, entity_id, key, CAST(value AS TEXT) AS value";

fn row_to_entry(row: &SqliteRow) -> Result<MetaEntry, sqlx::Error> {
	let entity_type: String = row.try_get("entity_type")?;
	let value: String = row.try_get("value")?;
	Ok(MetaEntry {
		entry_id: EntryId(from_db_id(row.try_get("entry_id")?)?),
		entity_type: entity_type.parse().map_err(decode_err)?,
		entity_id: EntityId(from_db_id(row.try_get("entity_id")?)?),
		key: row.try_get::<String, _>("key")?.into(),
		value: serde_json::from_str(&value).map_err(decode_err)?,
	})
}

fn encode(value: &MetaValue) -> MfResult<String> {
	serde_json::to_string(value).map_err(|err| {
		warn!("Cannot encode meta value: {}", err);
		Error::DbError
	})
}

pub(crate) async fn list_by_key(
	db: &SqlitePool,
	entity_type: EntityType,
	entity_id: EntityId,
	key: &str,
) -> MfResult<Vec<MetaEntry>> {
	let rows = sqlx::query(&format!(
		"SELECT {} FROM meta WHERE entity_type = ? AND entity_id = ? AND key = ? ORDER BY entry_id",
		COLUMNS
	))
	.bind(entity_type.as_str())
	.bind(to_db_id(entity_id.0)?)
	.bind(key)
	.fetch_all(db)
	.await
	.map_err(db_err)?;

	rows.iter()
		.map(row_to_entry)
		.collect::<Result<Vec<_>, _>>()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

pub(crate) async fn read(
	db: &SqlitePool,
	entity_type: EntityType,
	entry_id: EntryId,
) -> MfResult<Option<MetaEntry>> {
	let row = sqlx::query(&format!(
		"SELECT {} FROM meta WHERE entity_type = ? AND entry_id = ?",
		COLUMNS
	))
	.bind(entity_type.as_str())
	.bind(to_db_id(entry_id.0)?)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	row.as_ref()
		.map(row_to_entry)
		.transpose()
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)
}

pub(crate) async fn create(
	db: &SqlitePool,
	entity_type: EntityType,
	entity_id: EntityId,
	key: &str,
	value: &MetaValue,
) -> MfResult<EntryId> {
	let res = sqlx::query("INSERT INTO meta (entity_type, entity_id, key, value) VALUES (?, ?, ?, ?)")
		.bind(entity_type.as_str())
		.bind(to_db_id(entity_id.0)?)
		.bind(key)
		.bind(encode(value)?)
		.execute(db)
		.await
		.map_err(db_err)?;

	let id = u64::try_from(res.last_insert_rowid()).map_err(|_| Error::DbError)?;
	Ok(EntryId(id))
}

pub(crate) async fn update(
	db: &SqlitePool,
	entity_type: EntityType,
	entry_id: EntryId,
	key: &str,
	value: &MetaValue,
) -> MfResult<bool> {
	let res = sqlx::query("UPDATE meta SET key = ?, value = ? WHERE entity_type = ? AND entry_id = ?")
		.bind(key)
		.bind(encode(value)?)
		.bind(entity_type.as_str())
		.bind(to_db_id(entry_id.0)?)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}

pub(crate) async fn delete(
	db: &SqlitePool,
	entity_type: EntityType,
	entry_id: EntryId,
) -> MfResult<bool> {
	let res = sqlx::query("DELETE FROM meta WHERE entity_type = ? AND entry_id = ?")
		.bind(entity_type.as_str())
		.bind(to_db_id(entry_id.0)?)
		.execute(db)
		.await
		.map_err(db_err)?;

	Ok(res.rows_affected() > 0)
}

// vim: ts=4
