//! Permission engine
//!
//! Decides whether a caller may read, write or delete a meta key on a
//! parent entity. Parent capabilities come from the [`EntityAdapter`] of
//! the parent's type, key-level decisions from the key definition.

use std::collections::HashMap;
use std::sync::Arc;

use metafield_types::entity_adapter::{EntityAdapter, EntityDirectory};
use metafield_types::value;

use crate::entity::standard_adapters;
use crate::prelude::*;
use crate::registry::MetaKeyDefinition;
use crate::rule::{Action, RuleContext};

fn subject(ctx: &RequestContext) -> String {
	ctx.caller().map_or_else(|| "anonymous".to_string(), |auth| auth.user_id.to_string())
}

#[derive(Default)]
pub struct PermissionEngine {
	adapters: HashMap<EntityType, Arc<dyn EntityAdapter>>,
}

impl PermissionEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// Engine with the built-in adapters for all entity types
	pub fn with_directory(directory: &Arc<dyn EntityDirectory>) -> Self {
		let mut engine = Self::new();
		for adapter in standard_adapters(directory) {
			engine.register_adapter(adapter);
		}
		engine
	}

	/// Install or replace the adapter for its entity type
	pub fn register_adapter(&mut self, adapter: Arc<dyn EntityAdapter>) {
		self.adapters.insert(adapter.entity_type(), adapter);
	}

	pub fn adapter(&self, entity_type: EntityType) -> MfResult<&dyn EntityAdapter> {
		self.adapters.get(&entity_type).map(AsRef::as_ref).ok_or_else(|| {
			Error::Internal(format!("no entity adapter registered for {}", entity_type))
		})
	}

	/// Look up the parent entity, `None` when it does not exist
	pub async fn parent(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
	) -> MfResult<Option<ParentEntity>> {
		self.adapter(entity_type)?.get_parent_object(entity_id).await
	}

	pub fn can_read_parent(&self, ctx: &RequestContext, parent: &ParentEntity) -> bool {
		self.adapter(parent.entity_type)
			.is_ok_and(|a| a.check_read_permission(ctx.caller(), parent))
	}

	pub fn can_edit_parent(&self, ctx: &RequestContext, parent: &ParentEntity) -> bool {
		self.adapter(parent.entity_type)
			.is_ok_and(|a| a.check_edit_permission(ctx.caller(), parent))
	}

	pub fn can_delete_parent(&self, ctx: &RequestContext, parent: &ParentEntity) -> bool {
		self.adapter(parent.entity_type)
			.is_ok_and(|a| a.check_delete_permission(ctx.caller(), parent))
	}

	/// Evaluate the key's authorization rule, `None` when it has none
	pub fn evaluate_rule(
		&self,
		ctx: &RequestContext,
		parent: &ParentEntity,
		def: &MetaKeyDefinition,
		action: Action,
	) -> Option<bool> {
		def.authorization_rule.as_ref().map(|rule| {
			rule.evaluate(&RuleContext { caller: ctx.caller(), parent, def, action })
		})
	}

	/// Whether a stored value of `def` may be shown to the caller
	pub fn can_read(
		&self,
		ctx: &RequestContext,
		parent: &ParentEntity,
		def: &MetaKeyDefinition,
		stored: &MetaValue,
	) -> bool {
		if value::is_empty(stored) || value::is_serialized(stored) {
			return false;
		}

		if !self.can_read_parent(ctx, parent) {
			debug!(subject = %subject(ctx), key = %def.key, "Parent not readable");
			return false;
		}

		if ctx.view_mode == ViewMode::View && !def.show_in_rest {
			return false;
		}

		if let Some(allowed) = self.evaluate_rule(ctx, parent, def, Action::Read) {
			debug!(subject = %subject(ctx), key = %def.key, allowed = allowed, "Read rule evaluated");
			return allowed;
		}

		if ctx.is_edit() {
			return self.can_write(ctx, parent, def);
		}

		true
	}

	pub fn can_write(&self, ctx: &RequestContext, parent: &ParentEntity, def: &MetaKeyDefinition) -> bool {
		if def.is_protected() {
			debug!(subject = %subject(ctx), key = %def.key, "Protected key denied for write");
			return false;
		}

		if !self.can_edit_parent(ctx, parent) {
			debug!(subject = %subject(ctx), key = %def.key, "Parent not editable");
			return false;
		}

		self.evaluate_rule(ctx, parent, def, Action::Write).unwrap_or(true)
	}

	pub fn can_delete(&self, ctx: &RequestContext, parent: &ParentEntity, def: &MetaKeyDefinition) -> bool {
		if def.is_protected() {
			debug!(subject = %subject(ctx), key = %def.key, "Protected key denied for delete");
			return false;
		}

		if !self.can_delete_parent(ctx, parent) {
			debug!(subject = %subject(ctx), key = %def.key, "Parent not deletable");
			return false;
		}

		self.evaluate_rule(ctx, parent, def, Action::Delete).unwrap_or(true)
	}
}


// vim: ts=4
