//! Common types used throughout metafield.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

/// Stored meta values are arbitrary JSON; only scalars are writable.
pub type MetaValue = serde_json::Value;

macro_rules! id_type {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub u64);

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

id_type!(
	/// Identifier of a parent entity, unique within its entity type
	EntityId
);
id_type!(
	/// Opaque identifier of one stored meta row
	EntryId
);
id_type!(UserId);

// EntityType //
//************//
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
	Post,
	User,
	Comment,
	Term,
}

impl EntityType {
	pub const ALL: [EntityType; 4] =
		[EntityType::Post, EntityType::User, EntityType::Comment, EntityType::Term];

	pub fn as_str(self) -> &'static str {
		match self {
			EntityType::Post => "post",
			EntityType::User => "user",
			EntityType::Comment => "comment",
			EntityType::Term => "term",
		}
	}

	/// REST collection name used in URLs
	pub fn collection(self) -> &'static str {
		match self {
			EntityType::Post => "posts",
			EntityType::User => "users",
			EntityType::Comment => "comments",
			EntityType::Term => "terms",
		}
	}

	pub fn from_collection(collection: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|t| t.collection() == collection)
	}
}

impl std::fmt::Display for EntityType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for EntityType {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|t| t.as_str() == s)
			.ok_or_else(|| crate::error::Error::ConfigError(format!("unknown entity type: {}", s)))
	}
}

// ViewMode //
//**********//
/// Request context controlling which keys and values are exposed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
	#[default]
	View,
	Edit,
}

// ValueType //
//***********//
/// Declared type of a registered meta key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
	#[default]
	String,
	Number,
	Boolean,
	Array,
	Object,
}

impl ValueType {
	pub fn as_str(self) -> &'static str {
		match self {
			ValueType::String => "string",
			ValueType::Number => "number",
			ValueType::Boolean => "boolean",
			ValueType::Array => "array",
			ValueType::Object => "object",
		}
	}
}

impl std::fmt::Display for ValueType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

// Responses //
//***********//
/// Success envelope for API responses
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
	pub data: T,
	pub req_id: Option<String>,
}

impl<T> ApiResponse<T> {
	pub fn new(data: T) -> Self {
		Self { data, req_id: None }
	}

	pub fn with_req_id(mut self, req_id: Option<String>) -> Self {
		self.req_id = req_id;
		self
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
	pub code: String,
	pub message: String,
}

/// Error envelope for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	pub error: ErrorDetails,
}

impl ErrorResponse {
	pub fn new(code: String, message: impl Into<String>) -> Self {
		Self { error: ErrorDetails { code, message: message.into() } }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_entity_type_collections() {
		for typ in EntityType::ALL {
			assert_eq!(EntityType::from_collection(typ.collection()), Some(typ));
		}
		assert_eq!(EntityType::from_collection("pages"), None);
		assert_eq!("comment".parse::<EntityType>().ok(), Some(EntityType::Comment));
		assert!("page".parse::<EntityType>().is_err());
	}

	#[test]
	fn test_view_mode_from_query() {
		#[derive(Deserialize)]
		struct Q {
			#[serde(default)]
			context: ViewMode,
		}

		let q: Q = serde_urlencoded::from_str("context=edit").unwrap();
		assert_eq!(q.context, ViewMode::Edit);
		let q: Q = serde_urlencoded::from_str("").unwrap();
		assert_eq!(q.context, ViewMode::View);
		assert!(serde_urlencoded::from_str::<Q>("context=embed").is_err());
	}

	#[test]
	fn test_api_response_skips_empty_req_id() {
		let json = serde_json::to_value(ApiResponse::new(1)).unwrap();
		assert_eq!(json, serde_json::json!({ "data": 1 }));
	}
}

// vim: ts=4
