//! Parent entity records

use sqlx::{Row, SqlitePool};

use metafield::entity_adapter::ParentEntity;
use metafield::prelude::*;

use crate::utils::{db_err, from_db_id, inspect, to_db_id};

pub(crate) async fn read(
	db: &SqlitePool,
	entity_type: EntityType,
	entity_id: EntityId,
) -> MfResult<Option<ParentEntity>> {
	let row = sqlx::query(
		"SELECT owner_id, status FROM entities WHERE entity_type = ? AND entity_id = ?",
	)
	.bind(entity_type.as_str())
	.bind(to_db_id(entity_id.0)?)
	.fetch_optional(db)
	.await
	.map_err(db_err)?;

	let Some(row) = row else {
		return Ok(None);
	};

	let owner: Option<i64> = row.try_get("owner_id").map_err(db_err)?;
	let owner = owner.map(from_db_id).transpose().inspect_err(inspect).map_err(|_| Error::DbError)?;
	let status: String = row.try_get("status").map_err(db_err)?;

	Ok(Some(ParentEntity { entity_type, entity_id, owner: owner.map(UserId), status: status.into() }))
}

pub(crate) async fn upsert(db: &SqlitePool, entity: &ParentEntity) -> MfResult<()> {
	let owner = entity.owner.map(|o| to_db_id(o.0)).transpose()?;
	sqlx::query(
		"INSERT INTO entities (entity_type, entity_id, owner_id, status) VALUES (?, ?, ?, ?)
		ON CONFLICT(entity_type, entity_id) DO UPDATE SET owner_id = excluded.owner_id, status = excluded.status",
	)
	.bind(entity.entity_type.as_str())
	.bind(to_db_id(entity.entity_id.0)?)
	.bind(owner)
	.bind(entity.status.as_ref())
	.execute(db)
	.await
	.map_err(db_err)?;

	Ok(())
}

/// Remove an entity together with its meta entries
pub(crate) async fn delete(db: &SqlitePool, entity_type: EntityType, entity_id: EntityId) -> MfResult<bool> {
	let mut tx = db.begin().await.map_err(db_err)?;
	let id = to_db_id(entity_id.0)?;

	sqlx::query("DELETE FROM meta WHERE entity_type = ? AND entity_id = ?")
		.bind(entity_type.as_str())
		.bind(id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;
	let res = sqlx::query("DELETE FROM entities WHERE entity_type = ? AND entity_id = ?")
		.bind(entity_type.as_str())
		.bind(id)
		.execute(&mut *tx)
		.await
		.map_err(db_err)?;

	tx.commit().await.map_err(db_err)?;
	Ok(res.rows_affected() > 0)
}

// vim: ts=4
