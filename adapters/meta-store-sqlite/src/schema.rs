//! Database schema initialization

use sqlx::SqlitePool;

/// Create tables and indexes if they do not exist yet
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Meta entries
	//**************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS meta (
		entry_id integer PRIMARY KEY AUTOINCREMENT,
		entity_type text NOT NULL,
		entity_id integer NOT NULL,
		key text NOT NULL,
		value text NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;

	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_meta_parent_key ON meta(entity_type, entity_id, key)",
	)
	.execute(&mut *tx)
	.await?;

	// Parent entities
	//*****************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS entities (
		entity_type text NOT NULL,
		entity_id integer NOT NULL,
		owner_id integer,
		status text NOT NULL DEFAULT '',
		PRIMARY KEY(entity_type, entity_id)
	)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;

	Ok(())
}

// vim: ts=4
