//! Key definitions loaded from a YAML file.
//!
//! ```yaml
//! keys:
//!   - entity_type: post
//!     key: color
//!     type: string
//!     show_in_rest: true
//!     description: Accent color
//!     auth: owner, role:editor
//!     sanitize: trim
//! ```

use serde::Deserialize;
use std::path::Path;

use crate::prelude::*;
use crate::registry::{MetaKeyDefinition, MetaKeyRegistry};
use crate::rule::parse_rule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sanitizer {
	Trim,
	Lowercase,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyConfig {
	pub entity_type: EntityType,
	pub key: String,
	#[serde(rename = "type", default)]
	pub value_type: ValueType,
	#[serde(default = "default_single")]
	pub single: bool,
	#[serde(default)]
	pub show_in_rest: bool,
	pub description: Option<String>,
	pub default: Option<MetaValue>,
	pub auth: Option<String>,
	pub sanitize: Option<Sanitizer>,
}

fn default_single() -> bool {
	true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyDefinitionFile {
	#[serde(default)]
	pub keys: Vec<KeyConfig>,
}

fn sanitize_string(value: &MetaValue, f: impl Fn(&str) -> String) -> MetaValue {
	match value {
		MetaValue::String(s) => MetaValue::String(f(s)),
		other => other.clone(),
	}
}

impl KeyConfig {
	pub fn to_definition(&self) -> MfResult<MetaKeyDefinition> {
		let mut builder = MetaKeyDefinition::builder(self.key.as_str())
			.value_type(self.value_type)
			.single(self.single)
			.show_in_rest(self.show_in_rest);
		if let Some(description) = &self.description {
			builder = builder.description(description.as_str());
		}
		if let Some(default) = &self.default {
			builder = builder.default(default.clone());
		}
		if let Some(auth) = &self.auth {
			builder = builder.authorization_rule(parse_rule(auth)?);
		}
		builder = match self.sanitize {
			Some(Sanitizer::Trim) => builder.sanitize(|v| Ok(sanitize_string(v, |s| s.trim().to_string()))),
			Some(Sanitizer::Lowercase) => builder.sanitize(|v| Ok(sanitize_string(v, str::to_lowercase))),
			None => builder,
		};
		builder.build()
	}
}

impl KeyDefinitionFile {
	pub fn parse(yaml: &str) -> MfResult<Self> {
		serde_yaml::from_str(yaml)
			.map_err(|err| Error::ConfigError(format!("invalid key definitions: {}", err)))
	}

	pub async fn load(path: impl AsRef<Path>) -> MfResult<Self> {
		let path = path.as_ref();
		let yaml = tokio::fs::read_to_string(path).await.inspect_err(|err| {
			error!("Cannot read key definitions from {}: {}", path.display(), err);
		})?;
		Self::parse(&yaml)
	}

	/// Register every key, failing on the first duplicate
	pub fn register_into(&self, registry: &mut MetaKeyRegistry) -> MfResult<()> {
		for key in &self.keys {
			registry.register(key.entity_type, key.to_definition()?)?;
		}
		info!(count = self.keys.len(), "Meta key definitions loaded");
		Ok(())
	}
}


// vim: ts=4
