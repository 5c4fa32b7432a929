//! Serde helpers for DDP field quirks

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Deserialize a field that distinguishes "absent" from "explicit null".
///
/// Pair with `#[serde(default)]`: a missing key stays `None`, while a
/// present key (including `null`) becomes `Some`.
pub fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Deserialize a field where an explicit `null` means the default value.
///
/// Pair with `#[serde(default)]` so a missing key behaves the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Deserialize an error code sent either as a string or a number.
/// `null` yields an empty code.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Text(String),
        Number(Number),
    }

    Ok(match Option::<Code>::deserialize(deserializer)? {
        Some(Code::Text(text)) => text,
        Some(Code::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct OptionalField {
        #[serde(default, deserialize_with = "present")]
        value: Option<Value>,
    }

    #[test]
    fn test_present_absent() {
        let field: OptionalField = serde_json::from_value(json!({})).unwrap();
        assert_eq!(field.value, None);
    }

    #[test]
    fn test_present_null() {
        let field: OptionalField = serde_json::from_value(json!({"value": null})).unwrap();
        assert_eq!(field.value, Some(Value::Null));
    }

    #[derive(Debug, Deserialize)]
    struct CodeField {
        #[serde(deserialize_with = "string_or_number")]
        code: String,
    }

    #[test]
    fn test_string_or_number() {
        let text: CodeField = serde_json::from_value(json!({"code": "too-many-requests"})).unwrap();
        assert_eq!(text.code, "too-many-requests");

        let number: CodeField = serde_json::from_value(json!({"code": 500})).unwrap();
        assert_eq!(number.code, "500");

        let null: CodeField = serde_json::from_value(json!({"code": null})).unwrap();
        assert_eq!(null.code, "");

        assert!(serde_json::from_value::<CodeField>(json!({"code": [1]})).is_err());
    }

    #[derive(Debug, Deserialize)]
    struct ListField {
        #[serde(default, deserialize_with = "null_as_default")]
        items: Vec<String>,
    }

    #[test]
    fn test_null_as_default() {
        let null: ListField = serde_json::from_value(json!({"items": null})).unwrap();
        assert!(null.items.is_empty());

        let absent: ListField = serde_json::from_value(json!({})).unwrap();
        assert!(absent.items.is_empty());

        let set: ListField = serde_json::from_value(json!({"items": ["a"]})).unwrap();
        assert_eq!(set.items, vec!["a"]);

        assert!(serde_json::from_value::<ListField>(json!({"items": "a"})).is_err());
    }
}
