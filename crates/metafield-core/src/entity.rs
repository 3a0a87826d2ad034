//! Entity adapters, one per parent entity type.
//!
//! Each adapter resolves its parent objects through the shared
//! [`EntityDirectory`] and applies the capability rules of its type.

use async_trait::async_trait;
use std::sync::Arc;

use metafield_types::abac::AttrSet;
use metafield_types::entity_adapter::{EntityAdapter, EntityDirectory};

use crate::prelude::*;

pub const ROLE_EDITOR: &str = "editor";
pub const ROLE_MODERATOR: &str = "moderator";

pub const STATUS_PUBLISH: &str = "publish";
pub const STATUS_APPROVED: &str = "approved";

fn owner_or_roles(caller: Option<&AuthCtx>, parent: &ParentEntity, roles: &[&str]) -> bool {
	parent.is_owned_by(caller) || caller.is_some_and(|auth| auth.has_any_role(roles))
}

// Post //
//******//
/// Posts are readable when published; owners and editors may edit
#[derive(Debug)]
pub struct PostAdapter {
	directory: Arc<dyn EntityDirectory>,
}

impl PostAdapter {
	pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
		Self { directory }
	}
}

#[async_trait]
impl EntityAdapter for PostAdapter {
	fn entity_type(&self) -> EntityType {
		EntityType::Post
	}

	async fn get_parent_object(&self, entity_id: EntityId) -> MfResult<Option<ParentEntity>> {
		self.directory.get_parent_entity(EntityType::Post, entity_id).await
	}

	fn check_read_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		parent.has("status", STATUS_PUBLISH) || owner_or_roles(caller, parent, &[ROLE_EDITOR])
	}

	fn check_edit_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		owner_or_roles(caller, parent, &[ROLE_EDITOR])
	}

	fn check_delete_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		self.check_edit_permission(caller, parent)
	}
}

// User //
//******//
/// User profiles are public; only the user and admins may edit them
#[derive(Debug)]
pub struct UserAdapter {
	directory: Arc<dyn EntityDirectory>,
}

impl UserAdapter {
	pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
		Self { directory }
	}
}

#[async_trait]
impl EntityAdapter for UserAdapter {
	fn entity_type(&self) -> EntityType {
		EntityType::User
	}

	async fn get_parent_object(&self, entity_id: EntityId) -> MfResult<Option<ParentEntity>> {
		self.directory.get_parent_entity(EntityType::User, entity_id).await
	}

	fn check_read_permission(&self, _caller: Option<&AuthCtx>, _parent: &ParentEntity) -> bool {
		true
	}

	fn check_edit_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		caller.is_some_and(|auth| auth.is_admin() || auth.user_id.0 == parent.entity_id.0)
	}

	fn check_delete_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		self.check_edit_permission(caller, parent)
	}
}

// Comment //
//*********//
#[derive(Debug)]
pub struct CommentAdapter {
	directory: Arc<dyn EntityDirectory>,
}

impl CommentAdapter {
	pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
		Self { directory }
	}
}

#[async_trait]
impl EntityAdapter for CommentAdapter {
	fn entity_type(&self) -> EntityType {
		EntityType::Comment
	}

	async fn get_parent_object(&self, entity_id: EntityId) -> MfResult<Option<ParentEntity>> {
		self.directory.get_parent_entity(EntityType::Comment, entity_id).await
	}

	fn check_read_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		parent.has("status", STATUS_APPROVED) || owner_or_roles(caller, parent, &[ROLE_MODERATOR])
	}

	fn check_edit_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		owner_or_roles(caller, parent, &[ROLE_MODERATOR])
	}

	fn check_delete_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		self.check_edit_permission(caller, parent)
	}
}

// Term //
//******//
#[derive(Debug)]
pub struct TermAdapter {
	directory: Arc<dyn EntityDirectory>,
}

impl TermAdapter {
	pub fn new(directory: Arc<dyn EntityDirectory>) -> Self {
		Self { directory }
	}
}

#[async_trait]
impl EntityAdapter for TermAdapter {
	fn entity_type(&self) -> EntityType {
		EntityType::Term
	}

	async fn get_parent_object(&self, entity_id: EntityId) -> MfResult<Option<ParentEntity>> {
		self.directory.get_parent_entity(EntityType::Term, entity_id).await
	}

	fn check_read_permission(&self, _caller: Option<&AuthCtx>, _parent: &ParentEntity) -> bool {
		true
	}

	fn check_edit_permission(&self, caller: Option<&AuthCtx>, _parent: &ParentEntity) -> bool {
		caller.is_some_and(|auth| auth.has_any_role(&[ROLE_EDITOR]))
	}

	fn check_delete_permission(&self, caller: Option<&AuthCtx>, parent: &ParentEntity) -> bool {
		self.check_edit_permission(caller, parent)
	}
}

/// Adapters for all four built-in entity types
pub fn standard_adapters(directory: &Arc<dyn EntityDirectory>) -> Vec<Arc<dyn EntityAdapter>> {
	vec![
		Arc::new(PostAdapter::new(directory.clone())),
		Arc::new(UserAdapter::new(directory.clone())),
		Arc::new(CommentAdapter::new(directory.clone())),
		Arc::new(TermAdapter::new(directory.clone())),
	]
}


// vim: ts=4
