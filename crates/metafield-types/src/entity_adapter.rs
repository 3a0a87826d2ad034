//! Parent entity lookup and per-entity-type capability checks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::abac::AttrSet;
use crate::auth::AuthCtx;
use crate::prelude::*;

/// An object that can own metadata (post, user, comment, term)
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentEntity {
	pub entity_type: EntityType,
	pub entity_id: EntityId,
	pub owner: Option<UserId>,
	pub status: Box<str>,
}

impl ParentEntity {
	pub fn is_owned_by(&self, caller: Option<&AuthCtx>) -> bool {
		match (self.owner, caller) {
			(Some(owner), Some(auth)) => owner == auth.user_id,
			_ => false,
		}
	}
}

impl AttrSet for ParentEntity {
	fn get(&self, key: &str) -> Option<&str> {
		match key {
			"status" => Some(&self.status),
			"entity_type" => Some(self.entity_type.as_str()),
			_ => None,
		}
	}

	fn get_list(&self, _key: &str) -> Option<Vec<&str>> {
		None
	}
}

/// Read access to the externally owned entities
#[async_trait]
pub trait EntityDirectory: Debug + Send + Sync {
	async fn get_parent_entity(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
	) -> MfResult<Option<ParentEntity>>;
}

/// Parent lookup and capability checks for one entity type
#[async_trait]
pub trait EntityAdapter: Send + Sync {
	fn entity_type(&self) -> EntityType;

	async fn get_parent_object(&self, entity_id: EntityId) -> MfResult<Option<ParentEntity>>;

	fn check_read_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool;

	fn check_edit_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool;

	fn check_delete_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool;
}

// vim: ts=4
