//! Meta resource service
//!
//! Implements list/get/create/update/delete of meta entries on top of the
//! registry, the permission engine and a [`MetaStore`]. Every failure is
//! returned as an [`Error`] whose variant the HTTP layer maps to a status.

use serde::Deserialize;
use std::sync::Arc;

use metafield_types::meta_store::{MetaEntry, MetaStore};
use metafield_types::value;

use crate::dto::{DeleteResponse, MetaResponse};
use crate::notify::{MetaEvent, MetaEventKind, NotificationSink};
use crate::perm::PermissionEngine;
use crate::prelude::*;
use crate::registry::{FrozenMetaKeyRegistry, MetaKeyDefinition, is_protected_key};
use crate::rule::Action;
use crate::schema::SchemaBuilder;

/// Body of a create request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMeta {
	#[serde(default)]
	pub key: String,
	#[serde(default)]
	pub value: MetaValue,
}

/// Body of an update request; absent fields keep their current value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMeta {
	pub key: Option<String>,
	pub value: Option<MetaValue>,
}

pub struct MetaResourceService {
	registry: Arc<FrozenMetaKeyRegistry>,
	store: Arc<dyn MetaStore>,
	perm: PermissionEngine,
	notifier: Arc<dyn NotificationSink>,
	schema: SchemaBuilder,
	base_url: Box<str>,
}

impl MetaResourceService {
	pub fn new(
		registry: Arc<FrozenMetaKeyRegistry>,
		store: Arc<dyn MetaStore>,
		perm: PermissionEngine,
		notifier: Arc<dyn NotificationSink>,
	) -> Self {
		Self {
			schema: SchemaBuilder::new(registry.clone()),
			registry,
			store,
			perm,
			notifier,
			base_url: "".into(),
		}
	}

	/// Prefix for the links of response DTOs
	pub fn with_base_url(mut self, base_url: &str) -> Self {
		self.base_url = base_url.trim_end_matches('/').into();
		self
	}

	pub fn registry(&self) -> &FrozenMetaKeyRegistry {
		&self.registry
	}

	pub fn schema(&self) -> &SchemaBuilder {
		&self.schema
	}

	// Helpers
	//*********
	async fn parent(&self, entity_type: EntityType, entity_id: EntityId) -> MfResult<ParentEntity> {
		self.perm
			.parent(entity_type, entity_id)
			.await?
			.ok_or(Error::NotFound(ErrorCode::InvalidParent))
	}

	/// Edit context requires edit capability on the parent
	fn check_context(&self, ctx: &RequestContext, parent: &ParentEntity) -> MfResult<()> {
		if ctx.is_edit() && !self.perm.can_edit_parent(ctx, parent) {
			warn!(parent = %parent.entity_id, "Edit context denied");
			return Err(Error::Forbidden(ErrorCode::ForbiddenContext));
		}
		Ok(())
	}

	/// In edit context a denying rule fails the whole read
	fn check_rule_in_context(
		&self,
		ctx: &RequestContext,
		parent: &ParentEntity,
		def: &MetaKeyDefinition,
	) -> MfResult<()> {
		if ctx.is_edit() && self.perm.evaluate_rule(ctx, parent, def, Action::Read) == Some(false) {
			warn!(parent = %parent.entity_id, key = %def.key, "Authorization rule denied edit context");
			return Err(Error::Forbidden(ErrorCode::ForbiddenContext));
		}
		Ok(())
	}

	async fn entry(
		&self,
		entity_type: EntityType,
		parent_id: EntityId,
		entry_id: EntryId,
	) -> MfResult<MetaEntry> {
		let entry = self
			.store
			.get_by_entry_id(entity_type, entry_id)
			.await?
			.filter(|e| e.entity_type == entity_type)
			.ok_or(Error::NotFound(ErrorCode::InvalidEntryId))?;

		if entry.entity_id != parent_id {
			warn!(entry = %entry_id, claimed = %parent_id, actual = %entry.entity_id, "Meta parent mismatch");
			return Err(Error::InvalidInput(ErrorCode::ParentMismatch));
		}
		Ok(entry)
	}

	fn visible<'a>(
		&self,
		ctx: &RequestContext,
		parent: &ParentEntity,
		def: &MetaKeyDefinition,
		entries: &'a [MetaEntry],
	) -> Vec<&'a MetaEntry> {
		entries.iter().filter(|e| self.perm.can_read(ctx, parent, def, &e.value)).collect()
	}

	fn emit(&self, kind: MetaEventKind, parent: &ParentEntity, meta: &MetaResponse) {
		self.notifier.notify(&MetaEvent {
			kind,
			entity_type: parent.entity_type,
			entity_id: parent.entity_id,
			meta: meta.clone(),
		});
	}

	// Read operations
	//*****************
	/// All visible meta of a parent, in key registration order
	pub async fn list(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		ctx: &RequestContext,
	) -> MfResult<Vec<MetaResponse>> {
		let parent = self.parent(entity_type, entity_id).await?;
		if !self.perm.can_read_parent(ctx, &parent) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}
		self.check_context(ctx, &parent)?;

		let mut items = Vec::new();
		for def in self.registry.list_for(entity_type) {
			let entries = self.store.get(entity_type, entity_id, &def.key).await?;
			if entries.is_empty() {
				continue;
			}
			self.check_rule_in_context(ctx, &parent, def)?;

			let visible = self.visible(ctx, &parent, def, &entries);
			if let Some(item) =
				MetaResponse::from_entries(&self.base_url, def, entity_type, entity_id, &visible)
			{
				items.push(item);
			}
		}
		Ok(items)
	}

	/// One key of a parent by name
	pub async fn get(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		key: &str,
		ctx: &RequestContext,
	) -> MfResult<MetaResponse> {
		let parent = self.parent(entity_type, entity_id).await?;
		let def = self
			.registry
			.lookup(entity_type, key)
			.ok_or(Error::NotFound(ErrorCode::UnknownKey))?;
		self.check_context(ctx, &parent)?;
		self.check_rule_in_context(ctx, &parent, def)?;

		let entries = self.store.get(entity_type, entity_id, key).await?;
		let visible = self.visible(ctx, &parent, def, &entries);
		MetaResponse::from_entries(&self.base_url, def, entity_type, entity_id, &visible)
			.ok_or(Error::NotFound(ErrorCode::NotVisible))
	}

	/// One stored entry by its id
	pub async fn get_entry(
		&self,
		entity_type: EntityType,
		parent_id: EntityId,
		entry_id: EntryId,
		ctx: &RequestContext,
	) -> MfResult<MetaResponse> {
		let parent = self.parent(entity_type, parent_id).await?;
		self.check_context(ctx, &parent)?;
		let entry = self.entry(entity_type, parent_id, entry_id).await?;
		let def = self
			.registry
			.lookup(entity_type, &entry.key)
			.ok_or(Error::NotFound(ErrorCode::UnknownKey))?;
		self.check_rule_in_context(ctx, &parent, def)?;

		if !self.perm.can_read(ctx, &parent, def, &entry.value) {
			return Err(Error::NotFound(ErrorCode::NotVisible));
		}
		Ok(MetaResponse::from_entry(&self.base_url, def, &entry))
	}

	// Write operations
	//******************
	pub async fn create(
		&self,
		entity_type: EntityType,
		entity_id: EntityId,
		req: CreateMeta,
		ctx: &RequestContext,
	) -> MfResult<MetaResponse> {
		let parent = self.parent(entity_type, entity_id).await?;
		if !self.perm.can_edit_parent(ctx, &parent) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}

		let key = req.key.trim();
		if key.is_empty() {
			return Err(Error::InvalidInput(ErrorCode::InvalidKey));
		}
		let def = self.registry.lookup(entity_type, key);
		if is_protected_key(key, def) {
			warn!(key = %key, "Create of protected key rejected");
			return Err(Error::PolicyViolation(key.into()));
		}
		let def = def.ok_or(Error::InvalidInput(ErrorCode::UnknownKey))?;
		if !self.perm.can_write(ctx, &parent, def) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}
		if !value::is_scalar(&req.value) {
			return Err(Error::InvalidInput(ErrorCode::InvalidValue));
		}
		let value = def.sanitize(req.value)?;
		if !value::is_scalar(&value) || !value::matches_type(&value, def.value_type) {
			return Err(Error::InvalidInput(ErrorCode::InvalidValue));
		}

		let entry_id = self
			.store
			.add(entity_type, entity_id, &def.key, &value)
			.await
			.inspect_err(|err| warn!(key = %def.key, "Meta add failed: {}", err))
			.map_err(|_| Error::StoreFailure(ErrorCode::CouldNotAdd))?;
		let entry = self
			.store
			.get_by_entry_id(entity_type, entry_id)
			.await?
			.ok_or(Error::StoreFailure(ErrorCode::CouldNotAdd))?;
		info!(entity_type = %entity_type, parent = %entity_id, entry = %entry_id, key = %def.key, "Meta created");

		let meta = MetaResponse::from_entry(&self.base_url, def, &entry);
		self.emit(MetaEventKind::Inserted, &parent, &meta);
		Ok(meta)
	}

	/// Change the key and/or value of an entry.
	///
	/// The no-op check reads the current row and then writes without a
	/// version check, so concurrent updates of one entry are last-write-wins.
	pub async fn update(
		&self,
		entity_type: EntityType,
		parent_id: EntityId,
		entry_id: EntryId,
		req: UpdateMeta,
		ctx: &RequestContext,
	) -> MfResult<MetaResponse> {
		let parent = self.parent(entity_type, parent_id).await?;
		if !self.perm.can_edit_parent(ctx, &parent) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}
		let current = self.entry(entity_type, parent_id, entry_id).await?;

		if req.key.is_none() && req.value.is_none() {
			return Err(Error::InvalidInput(ErrorCode::InvalidParameters));
		}
		let key = match req.key.as_deref().map(str::trim) {
			Some("") => return Err(Error::InvalidInput(ErrorCode::InvalidKey)),
			Some(key) => key,
			None => current.key.as_ref(),
		};
		if !value::is_scalar(&current.value) {
			return Err(Error::InvalidInput(ErrorCode::InvalidExistingValue));
		}
		if req.value.as_ref().is_some_and(|v| !value::is_scalar(v)) {
			return Err(Error::InvalidInput(ErrorCode::InvalidValue));
		}

		let current_def = self.registry.lookup(entity_type, &current.key);
		if is_protected_key(&current.key, current_def) {
			warn!(key = %current.key, "Update of protected key rejected");
			return Err(Error::PolicyViolation(current.key.clone()));
		}
		let def = self.registry.lookup(entity_type, key);
		if is_protected_key(key, def) {
			warn!(key = %key, "Rename to protected key rejected");
			return Err(Error::PolicyViolation(key.into()));
		}
		let current_def = current_def.ok_or(Error::NotFound(ErrorCode::UnknownKey))?;
		let def = def.ok_or(Error::InvalidInput(ErrorCode::UnknownKey))?;
		if !self.perm.can_write(ctx, &parent, current_def) || !self.perm.can_write(ctx, &parent, def)
		{
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}

		let changes_value = req.value.is_some() || key != current.key.as_ref();
		let value = match req.value {
			Some(v) => def.sanitize(v)?,
			None => current.value.clone(),
		};
		if !value::is_scalar(&value) {
			return Err(Error::InvalidInput(ErrorCode::InvalidValue));
		}
		// Stored values keep their type; new ones must match the key
		if changes_value && !value::matches_type(&value, def.value_type) {
			debug!(key = %key, expected = %def.value_type, "Meta value type mismatch");
			return Err(Error::InvalidInput(ErrorCode::InvalidValue));
		}

		if key == current.key.as_ref()
			&& value::canonical_string(&value) == value::canonical_string(&current.value)
		{
			debug!(entry = %entry_id, "Meta update is a no-op");
			return Ok(MetaResponse::from_entry(&self.base_url, def, &current));
		}

		let updated = self
			.store
			.update_by_entry_id(entity_type, entry_id, key, &value)
			.await
			.inspect_err(|err| warn!(entry = %entry_id, "Meta update failed: {}", err))
			.unwrap_or(false);
		if !updated {
			warn!(entry = %entry_id, "Meta update failed");
			return Err(Error::StoreFailure(ErrorCode::CouldNotUpdate));
		}

		let entry = self
			.store
			.get_by_entry_id(entity_type, entry_id)
			.await?
			.ok_or(Error::StoreFailure(ErrorCode::CouldNotUpdate))?;
		info!(entity_type = %entity_type, parent = %parent_id, entry = %entry_id, key = %key, "Meta updated");

		let meta = MetaResponse::from_entry(&self.base_url, def, &entry);
		self.emit(MetaEventKind::Updated, &parent, &meta);
		Ok(meta)
	}

	pub async fn delete(
		&self,
		entity_type: EntityType,
		parent_id: EntityId,
		entry_id: EntryId,
		force: bool,
		ctx: &RequestContext,
	) -> MfResult<DeleteResponse> {
		if !force {
			return Err(Error::Unsupported(ErrorCode::TrashingUnsupported));
		}

		let parent = self.parent(entity_type, parent_id).await?;
		if !self.perm.can_delete_parent(ctx, &parent) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}
		let current = self.entry(entity_type, parent_id, entry_id).await?;

		if !value::is_scalar(&current.value) {
			return Err(Error::InvalidInput(ErrorCode::InvalidExistingValue));
		}
		let def = self.registry.lookup(entity_type, &current.key);
		if is_protected_key(&current.key, def) {
			warn!(key = %current.key, "Delete of protected key rejected");
			return Err(Error::PolicyViolation(current.key.clone()));
		}
		let def = def.ok_or(Error::NotFound(ErrorCode::UnknownKey))?;
		if !self.perm.can_delete(ctx, &parent, def) {
			return Err(Error::Forbidden(ErrorCode::Forbidden));
		}

		let previous = MetaResponse::from_entry(&self.base_url, def, &current);
		let deleted = self
			.store
			.delete_by_entry_id(entity_type, entry_id)
			.await
			.inspect_err(|err| warn!(entry = %entry_id, "Meta delete failed: {}", err))
			.unwrap_or(false);
		if !deleted {
			warn!(entry = %entry_id, "Meta delete failed");
			return Err(Error::StoreFailure(ErrorCode::CouldNotDelete));
		}
		info!(entity_type = %entity_type, parent = %parent_id, entry = %entry_id, key = %current.key, "Meta deleted");

		self.emit(MetaEventKind::Deleted, &parent, &previous);
		Ok(DeleteResponse { deleted: true, previous })
	}
}

// vim: ts=4
