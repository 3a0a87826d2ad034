//! Response DTOs of the meta resource.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use metafield_types::meta_store::MetaEntry;
use metafield_types::value::prepare_value;

use crate::prelude::*;
use crate::registry::MetaKeyDefinition;
use crate::schema::DEFAULT_DESCRIPTION;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaLinks {
	#[serde(rename = "self")]
	pub self_: String,
	pub collection: String,
	pub about: String,
}

impl MetaLinks {
	fn new(base_url: &str, entity_type: EntityType, entity_id: EntityId, item: &str) -> Self {
		let collection = format!("{}/api/{}/{}/meta", base_url, entity_type.collection(), entity_id);
		Self {
			self_: format!("{}{}", collection, item),
			collection,
			about: format!("{}/api/schema/{}", base_url, entity_type.collection()),
		}
	}
}

/// One meta key as exposed through the API.
///
/// `id` is set for a single stored entry. Keys registered with
/// `single = false` are rendered with all visible values in `value`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaResponse {
	pub id: Option<EntryId>,
	pub key: Box<str>,
	pub value: MetaValue,
	#[serde(rename = "type")]
	pub typ: ValueType,
	pub description: Box<str>,
	pub links: MetaLinks,
}

impl MetaResponse {
	/// Render one stored entry
	pub fn from_entry(base_url: &str, def: &MetaKeyDefinition, entry: &MetaEntry) -> Self {
		Self {
			id: Some(entry.entry_id),
			key: entry.key.clone(),
			value: prepare_value(&entry.value, def.value_type),
			typ: def.value_type,
			description: description(def),
			links: MetaLinks::new(
				base_url,
				entry.entity_type,
				entry.entity_id,
				&format!("/{}", entry.entry_id),
			),
		}
	}

	/// Render the visible entries of a key.
	///
	/// `entries` must not be empty.
	pub fn from_entries(
		base_url: &str,
		def: &MetaKeyDefinition,
		entity_type: EntityType,
		entity_id: EntityId,
		entries: &[&MetaEntry],
	) -> Option<Self> {
		if def.single {
			return entries.first().map(|entry| Self::from_entry(base_url, def, entry));
		}
		if entries.is_empty() {
			return None;
		}

		let values =
			entries.iter().map(|entry| prepare_value(&entry.value, def.value_type)).collect();
		Some(Self {
			id: None,
			key: def.key.clone(),
			value: MetaValue::Array(values),
			typ: def.value_type,
			description: description(def),
			links: MetaLinks::new(base_url, entity_type, entity_id, &format!("-key/{}", def.key)),
		})
	}
}

fn description(def: &MetaKeyDefinition) -> Box<str> {
	def.description.clone().unwrap_or_else(|| DEFAULT_DESCRIPTION.into())
}

/// Result of a successful delete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
	pub deleted: bool,
	pub previous: MetaResponse,
}


// vim: ts=4
