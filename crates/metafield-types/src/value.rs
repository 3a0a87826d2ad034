//! Helpers for classifying and normalizing stored meta values.

use crate::types::{MetaValue, ValueType};

/// Nothing stored: null, an empty string or an empty list of values.
pub fn is_empty(value: &MetaValue) -> bool {
	match value {
		MetaValue::Null => true,
		MetaValue::String(s) => s.is_empty(),
		MetaValue::Array(values) => values.is_empty(),
		_ => false,
	}
}

/// A string carrying an encoded array or object.
pub fn is_serialized(value: &MetaValue) -> bool {
	let MetaValue::String(s) = value else {
		return false;
	};
	let trimmed = s.trim();
	if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
		return false;
	}
	serde_json::from_str::<MetaValue>(trimmed).is_ok_and(|v| v.is_array() || v.is_object())
}

/// String, number or boolean, excluding serialized blobs.
pub fn is_scalar(value: &MetaValue) -> bool {
	match value {
		MetaValue::String(_) => !is_serialized(value),
		MetaValue::Number(_) | MetaValue::Bool(_) => true,
		MetaValue::Null | MetaValue::Array(_) | MetaValue::Object(_) => false,
	}
}

/// Textual form used for equality checks between scalars.
pub fn canonical_string(value: &MetaValue) -> Option<String> {
	match value {
		MetaValue::String(s) => Some(s.clone()),
		MetaValue::Number(n) => Some(n.to_string()),
		MetaValue::Bool(b) => Some(b.to_string()),
		MetaValue::Null | MetaValue::Array(_) | MetaValue::Object(_) => None,
	}
}

/// Whether `value` already has the JSON shape of `typ`.
pub fn matches_type(value: &MetaValue, typ: ValueType) -> bool {
	match typ {
		ValueType::String => value.is_string(),
		ValueType::Number => value.is_number(),
		ValueType::Boolean => value.is_boolean(),
		ValueType::Array => value.is_array(),
		ValueType::Object => value.is_object(),
	}
}

/// Coerce a stored scalar to the declared type for output.
///
/// Values that cannot be coerced are returned unchanged.
pub fn prepare_value(value: &MetaValue, typ: ValueType) -> MetaValue {
	if !is_scalar(value) {
		return value.clone();
	}
	match (typ, value) {
		(ValueType::String, MetaValue::String(_)) => value.clone(),
		(ValueType::String, _) => canonical_string(value).map_or(MetaValue::Null, MetaValue::String),
		(ValueType::Number, MetaValue::String(s)) => s
			.trim()
			.parse::<f64>()
			.ok()
			.and_then(serde_json::Number::from_f64)
			.map_or_else(|| value.clone(), MetaValue::Number),
		(ValueType::Number, MetaValue::Bool(b)) => MetaValue::from(u8::from(*b)),
		(ValueType::Boolean, MetaValue::String(s)) => {
			MetaValue::Bool(!matches!(s.as_str(), "" | "0" | "false"))
		}
		(ValueType::Boolean, MetaValue::Number(n)) => {
			MetaValue::Bool(n.as_f64().is_some_and(|f| f != 0.0))
		}
		_ => value.clone(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_serialized_detection() {
		assert!(is_serialized(&json!("{\"a\":1}")));
		assert!(is_serialized(&json!(" [1,2] ")));
		assert!(!is_serialized(&json!("[not json")));
		assert!(!is_serialized(&json!("red")));
		assert!(!is_serialized(&json!({ "a": 1 })));
	}

	#[test]
	fn test_scalar() {
		assert!(is_scalar(&json!("red")));
		assert!(is_scalar(&json!(4.5)));
		assert!(is_scalar(&json!(false)));
		assert!(!is_scalar(&json!(null)));
		assert!(!is_scalar(&json!([1])));
		assert!(!is_scalar(&json!({ "a": 1 })));
		assert!(!is_scalar(&json!("{\"a\":1}")));
	}

	#[test]
	fn test_empty() {
		assert!(is_empty(&json!(null)));
		assert!(is_empty(&json!("")));
		assert!(is_empty(&json!([])));
		assert!(!is_empty(&json!("0")));
		assert!(!is_empty(&json!(false)));
	}

	#[test]
	fn test_canonical_string() {
		assert_eq!(canonical_string(&json!("red")).as_deref(), Some("red"));
		assert_eq!(canonical_string(&json!(12)).as_deref(), Some("12"));
		assert_eq!(canonical_string(&json!(true)).as_deref(), Some("true"));
		assert_eq!(canonical_string(&json!([1])), None);
	}

	#[test]
	fn test_prepare_value() {
		assert_eq!(prepare_value(&json!(12), ValueType::String), json!("12"));
		assert_eq!(prepare_value(&json!("2.5"), ValueType::Number), json!(2.5));
		assert_eq!(prepare_value(&json!("abc"), ValueType::Number), json!("abc"));
		assert_eq!(prepare_value(&json!("0"), ValueType::Boolean), json!(false));
		assert_eq!(prepare_value(&json!("yes"), ValueType::Boolean), json!(true));
		assert_eq!(prepare_value(&json!(0), ValueType::Boolean), json!(false));
		assert_eq!(prepare_value(&json!([1, 2]), ValueType::String), json!([1, 2]));
	}
}

// vim: ts=4
