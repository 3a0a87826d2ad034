//! In-memory collaborators for service tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use metafield_core::notify::{MetaEvent, NotificationSink};
use metafield_core::perm::PermissionEngine;
use metafield_core::registry::{MetaKeyDefinition, MetaKeyRegistry};
use metafield_core::rule::DenyAll;
use metafield_core::service::MetaResourceService;
use metafield_types::auth::{AuthCtx, RequestContext};
use metafield_types::entity_adapter::{EntityDirectory, ParentEntity};
use metafield_types::meta_store::{MetaEntry, MetaStore};
use metafield_types::prelude::*;
use metafield_types::types::ValueType;

pub const OWNER: u64 = 7;
pub const STRANGER: u64 = 8;
pub const POST: u64 = 5;
pub const OTHER_POST: u64 = 6;
pub const DRAFT: u64 = 9;

#[derive(Debug, Default)]
pub struct MemStore {
	entries: Mutex<Vec<MetaEntry>>,
	next_id: AtomicU64,
	pub writes: AtomicUsize,
	pub fail_writes: std::sync::atomic::AtomicBool,
}

impl MemStore {
	pub fn insert(&self, entity_type: EntityType, entity_id: u64, key: &str, value: MetaValue) -> EntryId {
		let entry_id = EntryId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
		self.entries.lock().unwrap().push(MetaEntry {
			entry_id,
			entity_type,
			entity_id: EntityId(entity_id),
			key: key.into(),
			value,
		});
		entry_id
	}

	fn failing(&self) -> bool {
		self.fail_writes.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl MetaStore for MemStore {
	async fn get(&self, entity_type: EntityType, entity_id: EntityId, key: &str) -> MfResult<Vec<MetaEntry>> {
		Ok(self
			.entries
			.lock()
			.unwrap()
			.iter()
			.filter(|e| e.entity_type == entity_type && e.entity_id == entity_id && e.key.as_ref() == key)
			.cloned()
			.collect())
	}

	async fn get_by_entry_id(&self, entity_type: EntityType, entry_id: EntryId) -> MfResult<Option<MetaEntry>> {
		Ok(self
			.entries
			.lock()
			.unwrap()
			.iter()
			.find(|e| e.entity_type == entity_type && e.entry_id == entry_id)
			.cloned())
	}

	async fn add(&self, entity_type: EntityType, entity_id: EntityId, key: &str, value: &MetaValue) -> MfResult<EntryId> {
		if self.failing() {
			return Err(Error::DbError);
		}
		self.writes.fetch_add(1, Ordering::SeqCst);
		Ok(self.insert(entity_type, entity_id.0, key, value.clone()))
	}

	async fn update_by_entry_id(&self, entity_type: EntityType, entry_id: EntryId, key: &str, value: &MetaValue) -> MfResult<bool> {
		if self.failing() {
			return Err(Error::DbError);
		}
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut entries = self.entries.lock().unwrap();
		match entries.iter_mut().find(|e| e.entity_type == entity_type && e.entry_id == entry_id) {
			Some(entry) => {
				entry.key = key.into();
				entry.value = value.clone();
				Ok(true)
			}
			None => Ok(false),
		}
	}

	async fn delete_by_entry_id(&self, entity_type: EntityType, entry_id: EntryId) -> MfResult<bool> {
		if self.failing() {
			return Err(Error::DbError);
		}
		self.writes.fetch_add(1, Ordering::SeqCst);
		let mut entries = self.entries.lock().unwrap();
		let before = entries.len();
		entries.retain(|e| !(e.entity_type == entity_type && e.entry_id == entry_id));
		Ok(entries.len() < before)
	}
}

#[derive(Debug, Default)]
pub struct MemDirectory {
	entities: HashMap<(EntityType, u64), ParentEntity>,
}

impl MemDirectory {
	pub fn with(mut self, entity_type: EntityType, id: u64, owner: Option<u64>, status: &str) -> Self {
		self.entities.insert(
			(entity_type, id),
			ParentEntity { entity_type, entity_id: EntityId(id), owner: owner.map(UserId), status: status.into() },
		);
		self
	}
}

#[async_trait]
impl EntityDirectory for MemDirectory {
	async fn get_parent_entity(&self, entity_type: EntityType, entity_id: EntityId) -> MfResult<Option<ParentEntity>> {
		Ok(self.entities.get(&(entity_type, entity_id.0)).cloned())
	}
}

#[derive(Default)]
pub struct RecordingNotifier {
	pub events: Mutex<Vec<MetaEvent>>,
}

impl NotificationSink for RecordingNotifier {
	fn notify(&self, event: &MetaEvent) {
		self.events.lock().unwrap().push(event.clone());
	}
}

impl RecordingNotifier {
	pub fn names(&self) -> Vec<&'static str> {
		self.events.lock().unwrap().iter().map(|e| e.kind.name()).collect()
	}
}

pub struct Fixture {
	pub service: MetaResourceService,
	pub store: Arc<MemStore>,
	pub notifier: Arc<RecordingNotifier>,
}

pub fn registry() -> MetaKeyRegistry {
	let mut registry = MetaKeyRegistry::new();
	let defs = [
		MetaKeyDefinition::builder("color").show_in_rest(true).description("Accent color"),
		MetaKeyDefinition::builder("rating").value_type(ValueType::Number).show_in_rest(true),
		MetaKeyDefinition::builder("tags").single(false).show_in_rest(true),
		MetaKeyDefinition::builder("internal_note"),
		MetaKeyDefinition::builder("_edit_lock"),
		MetaKeyDefinition::builder("_featured").show_in_rest(true),
		MetaKeyDefinition::builder("locked").show_in_rest(true).authorization_rule(Arc::new(DenyAll)),
		MetaKeyDefinition::builder("data").value_type(ValueType::Object).show_in_rest(true),
		MetaKeyDefinition::builder("slug")
			.show_in_rest(true)
			.sanitize(|v| Ok(json!(v.as_str().unwrap_or_default().trim().to_lowercase()))),
	];
	for def in defs {
		registry.register(EntityType::Post, def.build().unwrap()).unwrap();
	}
	registry
}

pub fn fixture() -> Fixture {
	let directory: Arc<dyn EntityDirectory> = Arc::new(
		MemDirectory::default()
			.with(EntityType::Post, POST, Some(OWNER), "publish")
			.with(EntityType::Post, OTHER_POST, Some(OWNER), "publish")
			.with(EntityType::Post, DRAFT, Some(OWNER), "draft"),
	);
	let store = Arc::new(MemStore::default());
	let notifier = Arc::new(RecordingNotifier::default());
	let service = MetaResourceService::new(
		Arc::new(registry().freeze()),
		store.clone(),
		PermissionEngine::with_directory(&directory),
		notifier.clone(),
	)
	.with_base_url("http://localhost/");
	Fixture { service, store, notifier }
}

pub fn owner(view_mode: ViewMode) -> RequestContext {
	RequestContext::new(Some(AuthCtx::new(UserId(OWNER), &["author"])), view_mode)
}

pub fn stranger(view_mode: ViewMode) -> RequestContext {
	RequestContext::new(Some(AuthCtx::new(UserId(STRANGER), &["author"])), view_mode)
}

pub fn anonymous() -> RequestContext {
	RequestContext::new(None, ViewMode::View)
}

// vim: ts=4
