//! Meta key registry
//!
//! Keys are registered per entity type at startup, then the registry is
//! frozen and shared read-only with the service.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::prelude::*;
use crate::rule::AuthorizationRule;

/// Type alias for a value sanitizer run before values are stored
pub type SanitizeRule = Arc<dyn Fn(&MetaValue) -> MfResult<MetaValue> + Send + Sync>;

/// Prefix marking a key as internal
pub const PROTECTED_PREFIX: char = '_';

/// A registered meta key with its type, visibility and rules
#[derive(Clone)]
pub struct MetaKeyDefinition {
	pub key: Box<str>,
	pub value_type: ValueType,

	/// A single value per parent, or a list of values
	pub single: bool,

	/// Visible through the API in view context
	pub show_in_rest: bool,

	pub description: Option<Box<str>>,

	/// Used by create-like endpoints when no value is supplied
	pub default: Option<MetaValue>,

	pub authorization_rule: Option<Arc<dyn AuthorizationRule>>,
	pub sanitize_rule: Option<SanitizeRule>,
}

impl Debug for MetaKeyDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MetaKeyDefinition")
			.field("key", &self.key)
			.field("value_type", &self.value_type)
			.field("single", &self.single)
			.field("show_in_rest", &self.show_in_rest)
			.field("description", &self.description)
			.field("default", &self.default)
			.field("authorization_rule", &self.authorization_rule)
			.field("sanitize_rule", &self.sanitize_rule.is_some())
			.finish()
	}
}

impl MetaKeyDefinition {
	pub fn builder(key: impl Into<Box<str>>) -> MetaKeyDefinitionBuilder {
		MetaKeyDefinitionBuilder::new(key)
	}

	/// Internal keys start with an underscore and are hidden unless opted in
	pub fn is_protected(&self) -> bool {
		is_protected_key(&self.key, Some(self))
	}

	/// Run the sanitizer, if any
	pub fn sanitize(&self, value: MetaValue) -> MfResult<MetaValue> {
		match &self.sanitize_rule {
			Some(rule) => rule(&value),
			None => Ok(value),
		}
	}
}

/// A key is protected when it carries the reserved prefix and has not been
/// registered with `show_in_rest`.
pub fn is_protected_key(key: &str, def: Option<&MetaKeyDefinition>) -> bool {
	key.starts_with(PROTECTED_PREFIX) && !def.is_some_and(|d| d.show_in_rest)
}

/// Builder for MetaKeyDefinition with fluent API
pub struct MetaKeyDefinitionBuilder {
	key: Box<str>,
	value_type: ValueType,
	single: bool,
	show_in_rest: bool,
	description: Option<Box<str>>,
	default: Option<MetaValue>,
	authorization_rule: Option<Arc<dyn AuthorizationRule>>,
	sanitize_rule: Option<SanitizeRule>,
}

impl MetaKeyDefinitionBuilder {
	pub fn new(key: impl Into<Box<str>>) -> Self {
		Self {
			key: key.into(),
			value_type: ValueType::String,
			single: true,
			show_in_rest: false,
			description: None,
			default: None,
			authorization_rule: None,
			sanitize_rule: None,
		}
	}

	pub fn value_type(mut self, value_type: ValueType) -> Self {
		self.value_type = value_type;
		self
	}

	pub fn single(mut self, single: bool) -> Self {
		self.single = single;
		self
	}

	pub fn show_in_rest(mut self, show_in_rest: bool) -> Self {
		self.show_in_rest = show_in_rest;
		self
	}

	pub fn description(mut self, description: impl Into<Box<str>>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn default(mut self, value: MetaValue) -> Self {
		self.default = Some(value);
		self
	}

	pub fn authorization_rule(mut self, rule: Arc<dyn AuthorizationRule>) -> Self {
		self.authorization_rule = Some(rule);
		self
	}

	pub fn sanitize<F>(mut self, f: F) -> Self
	where
		F: Fn(&MetaValue) -> MfResult<MetaValue> + Send + Sync + 'static,
	{
		self.sanitize_rule = Some(Arc::new(f));
		self
	}

	pub fn build(self) -> MfResult<MetaKeyDefinition> {
		if self.key.trim().is_empty() {
			return Err(Error::ConfigError("meta key must not be empty".into()));
		}

		Ok(MetaKeyDefinition {
			key: self.key,
			value_type: self.value_type,
			single: self.single,
			show_in_rest: self.show_in_rest,
			description: self.description,
			default: self.default,
			authorization_rule: self.authorization_rule,
			sanitize_rule: self.sanitize_rule,
		})
	}
}

/// Keys of one entity type, in registration order
#[derive(Debug, Default)]
struct KeyTable {
	order: Vec<MetaKeyDefinition>,
	index: HashMap<Box<str>, usize>,
}

impl KeyTable {
	fn get(&self, key: &str) -> Option<&MetaKeyDefinition> {
		self.index.get(key).and_then(|&i| self.order.get(i))
	}
}

/// Mutable registry used during initialization
#[derive(Debug, Default)]
pub struct MetaKeyRegistry {
	tables: HashMap<EntityType, KeyTable>,
}

impl MetaKeyRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a key, failing if it already exists for the entity type
	pub fn register(&mut self, entity_type: EntityType, def: MetaKeyDefinition) -> MfResult<()> {
		let table = self.tables.entry(entity_type).or_default();
		if table.index.contains_key(&def.key) {
			return Err(Error::DuplicateKey(def.key));
		}

		tracing::debug!(entity_type = %entity_type, key = %def.key, "Registered meta key");
		table.index.insert(def.key.clone(), table.order.len());
		table.order.push(def);
		Ok(())
	}

	/// Register or overwrite a key. An overwritten key keeps its position.
	pub fn reregister(&mut self, entity_type: EntityType, def: MetaKeyDefinition) {
		let table = self.tables.entry(entity_type).or_default();
		if let Some(&i) = table.index.get(&def.key) {
			tracing::warn!(entity_type = %entity_type, key = %def.key, "Meta key re-registered");
			if let Some(slot) = table.order.get_mut(i) {
				*slot = def;
			}
		} else {
			tracing::debug!(entity_type = %entity_type, key = %def.key, "Registered meta key");
			table.index.insert(def.key.clone(), table.order.len());
			table.order.push(def);
		}
	}

	pub fn len(&self) -> usize {
		self.tables.values().map(|t| t.order.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn freeze(self) -> FrozenMetaKeyRegistry {
		FrozenMetaKeyRegistry { tables: self.tables }
	}
}

/// Immutable registry shared between requests
#[derive(Debug)]
pub struct FrozenMetaKeyRegistry {
	tables: HashMap<EntityType, KeyTable>,
}

impl FrozenMetaKeyRegistry {
	pub fn lookup(&self, entity_type: EntityType, key: &str) -> Option<&MetaKeyDefinition> {
		self.tables.get(&entity_type).and_then(|t| t.get(key))
	}

	/// Definitions of an entity type in registration order
	pub fn list_for(&self, entity_type: EntityType) -> &[MetaKeyDefinition] {
		self.tables.get(&entity_type).map_or(&[], |t| t.order.as_slice())
	}

	pub fn len(&self) -> usize {
		self.tables.values().map(|t| t.order.len()).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}


// vim: ts=4
