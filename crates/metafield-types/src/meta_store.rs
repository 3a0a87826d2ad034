//! Key-value persistence for meta entries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::prelude::*;

/// One stored meta row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaEntry {
	pub entry_id: EntryId,
	pub entity_type: EntityType,
	pub entity_id: EntityId,
	pub key: Box<str>,
	pub value: MetaValue,
}

/// Storage backend for meta entries.
///
/// Entries are addressed by entry id since a key may hold several values.
/// Implementations report backend errors as `Error::DbError`; a `false`
/// result from update/delete means nothing was changed.
#[async_trait]
pub trait MetaStore: Debug + Send + Sync {
	/// All entries stored under `key` for a parent, in insertion order
	async fn get(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		key: &str,
	) -> MfResult<Vec<MetaEntry>>;

	async fn get_by_entry_id(
		&self,
		entity_type: EntityType,
		entry_id: EntryId,
	) -> MfResult<Option<MetaEntry>>;

	async fn add(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		key: &str,
		value: &MetaValue,
	) -> MfResult<EntryId>;

	/// Overwrite key and value of an entry. Not a compare-and-swap.
	async fn update_by_entry_id(
		&self,
		entity_type: EntityType,
		entry_id: EntryId,
		key: &str,
		value: &MetaValue,
	) -> MfResult<bool>;

	async fn delete_by_entry_id(&self, entity_type: EntityType, entry_id: EntryId)
	-> MfResult<bool>;
}

// vim: ts=4
