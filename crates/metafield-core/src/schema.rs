//! Schema builder
//!
//! Derives a JSON-Schema-like description of the meta resource from the
//! registry, and the argument rules endpoints validate request bodies with.

use serde::Serialize;
use serde::ser::SerializeMap;
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::sync::Arc;

use metafield_types::value;

use crate::prelude::*;
use crate::registry::{FrozenMetaKeyRegistry, MetaKeyDefinition};

pub const SCHEMA_DRAFT: &str = "http://json-schema.org/draft-04/schema#";
pub const DEFAULT_DESCRIPTION: &str = "Description of the meta key";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
	Create,
	Edit,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySchema {
	#[serde(rename = "type")]
	pub typ: ValueType,
	pub required: bool,
	pub description: Box<str>,
	pub default: Option<MetaValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyProperties {
	pub key: PropertySchema,
	pub value: PropertySchema,
}

/// Schema of one registered key
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySchema {
	pub id: Box<str>,
	#[serde(rename = "type")]
	pub typ: &'static str,
	pub description: Box<str>,
	pub single: bool,
	pub properties: KeyProperties,
}

impl KeySchema {
	fn new(def: &MetaKeyDefinition) -> Self {
		Self {
			id: def.key.clone(),
			typ: "object",
			description: def.description.clone().unwrap_or_else(|| DEFAULT_DESCRIPTION.into()),
			single: def.single,
			properties: KeyProperties {
				key: PropertySchema {
					typ: ValueType::String,
					required: true,
					description: "The key for the custom field.".into(),
					default: None,
				},
				value: PropertySchema {
					typ: def.value_type,
					required: true,
					description: "The value of the custom field.".into(),
					default: def.default.clone(),
				},
			},
		}
	}
}

/// Key schemas in registration order, serialized as an object
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeySchemas(pub Vec<KeySchema>);

impl Serialize for KeySchemas {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		let mut map = serializer.serialize_map(Some(self.0.len()))?;
		for schema in &self.0 {
			map.serialize_entry(&schema.id, schema)?;
		}
		map.end()
	}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaDocument {
	#[serde(rename = "$schema")]
	pub schema: &'static str,
	pub title: &'static str,
	#[serde(rename = "type")]
	pub typ: &'static str,
	pub properties: KeySchemas,
}

impl SchemaDocument {
	pub fn get(&self, key: &str) -> Option<&KeySchema> {
		self.properties.0.iter().find(|s| s.id.as_ref() == key)
	}
}

/// Validation rule for one endpoint argument
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgRule {
	#[serde(rename = "type")]
	pub typ: ValueType,
	pub required: bool,
	pub description: Box<str>,
	pub default: Option<MetaValue>,
}

/// Argument rules keyed by argument name
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EndpointArgs(pub BTreeMap<Box<str>, ArgRule>);

impl EndpointArgs {
	pub fn get(&self, name: &str) -> Option<&ArgRule> {
		self.0.get(name)
	}

	/// Fill defaults, then check presence and types of the arguments.
	///
	/// A `null` argument counts as absent.
	pub fn validate(&self, body: &mut serde_json::Map<String, MetaValue>) -> MfResult<()> {
		for (name, rule) in &self.0 {
			let present = body.get(name.as_ref()).is_some_and(|v| !v.is_null());
			if !present {
				if let Some(default) = &rule.default {
					body.insert(name.to_string(), default.clone());
				} else if rule.required {
					debug!(arg = %name, "Missing required argument");
					return Err(Error::InvalidInput(ErrorCode::MissingParameter));
				}
				continue;
			}

			if let Some(arg) = body.get(name.as_ref()) {
				if !value::matches_type(arg, rule.typ) {
					debug!(arg = %name, expected = %rule.typ, "Argument type mismatch");
					return Err(Error::InvalidInput(if name.as_ref() == "key" {
						ErrorCode::InvalidKey
					} else {
						ErrorCode::InvalidValue
					}));
				}
			}
		}
		Ok(())
	}
}

/// Assemble argument rules for an operation.
///
/// Only create-like operations carry `required` and `default`, so edits
/// never inject defaults into stored values.
pub fn build_endpoint_args(schema: &KeySchema, operation: Operation) -> EndpointArgs {
	let rule = |prop: &PropertySchema| ArgRule {
		typ: prop.typ,
		description: prop.description.clone(),
		required: operation == Operation::Create && prop.required,
		default: if operation == Operation::Create { prop.default.clone() } else { None },
	};

	let mut args = BTreeMap::new();
	args.insert("key".into(), rule(&schema.properties.key));
	args.insert("value".into(), rule(&schema.properties.value));
	EndpointArgs(args)
}

pub struct SchemaBuilder {
	registry: Arc<FrozenMetaKeyRegistry>,
}

impl SchemaBuilder {
	pub fn new(registry: Arc<FrozenMetaKeyRegistry>) -> Self {
		Self { registry }
	}

	/// Schema listing every registered key of the entity type
	pub fn build_schema(&self, entity_type: EntityType) -> SchemaDocument {
		self.document(self.registry.list_for(entity_type).iter())
	}

	/// Schema limited to the keys exposed in the given view mode
	pub fn build_schema_for(&self, entity_type: EntityType, view_mode: ViewMode) -> SchemaDocument {
		self.document(
			self.registry
				.list_for(entity_type)
				.iter()
				.filter(|def| view_mode == ViewMode::Edit || def.show_in_rest),
		)
	}

	pub fn key_schema(&self, entity_type: EntityType, key: &str) -> Option<KeySchema> {
		self.registry.lookup(entity_type, key).map(KeySchema::new)
	}

	/// Argument rules for a registered key, `None` for unknown keys
	pub fn endpoint_args(
		&self,
		entity_type: EntityType,
		key: &str,
		operation: Operation,
	) -> Option<EndpointArgs> {
		self.key_schema(entity_type, key).map(|schema| build_endpoint_args(&schema, operation))
	}

	fn document<'a>(&self, defs: impl Iterator<Item = &'a MetaKeyDefinition>) -> SchemaDocument {
		SchemaDocument {
			schema: SCHEMA_DRAFT,
			title: "meta",
			typ: "object",
			properties: KeySchemas(defs.map(KeySchema::new).collect()),
		}
	}
}


// vim: ts=4
