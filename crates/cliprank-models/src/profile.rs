//! Render profile canonicalization and hashing.
//!
//! A render profile is an arbitrary JSON map of caller overrides (aspect,
//! subtitle style, boost keywords, ...). Its canonical SHA-1 digest is part
//! of the clip dedup key, so two callers sending the same settings in a
//! different key order must land on the same clip row.

use serde_json::{Map, Value};
use sha1::{Digest, Sha1};
use thiserror::Error;

/// Result type for profile operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors from profile canonicalization.
#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Profile must be a JSON object or null, got {0}")]
    NotAMap(&'static str),

    #[error("Profile serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Compute the canonical hash of a render profile.
///
/// - Empty object and `null` hash to the empty string sentinel, which can
///   never collide with a real digest.
/// - Map keys are sorted recursively; list order is preserved; scalars pass
///   through untouched.
/// - Anything other than an object or null fails fast; the caller must abort
///   the whole run, no partial upsert.
pub fn profile_hash(profile: &Value) -> ProfileResult<String> {
    let map = match profile {
        Value::Null => return Ok(String::new()),
        Value::Object(map) => map,
        Value::Bool(_) => return Err(ProfileError::NotAMap("bool")),
        Value::Number(_) => return Err(ProfileError::NotAMap("number")),
        Value::String(_) => return Err(ProfileError::NotAMap("string")),
        Value::Array(_) => return Err(ProfileError::NotAMap("array")),
    };

    if map.is_empty() {
        return Ok(String::new());
    }

    let canonical = serde_json::to_string(&canonicalize(profile))?;
    let digest = Sha1::digest(canonical.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Rebuild a JSON value with object keys inserted in sorted order at every
/// level. Keeps the serialized form stable regardless of how the input map
/// was built.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            let mut sorted = Map::new();
            for (key, nested) in entries {
                sorted.insert(key.clone(), canonicalize(nested));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        scalar => scalar.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_and_null_share_sentinel() {
        assert_eq!(profile_hash(&json!({})).unwrap(), "");
        assert_eq!(profile_hash(&Value::Null).unwrap(), "");
    }

    #[test]
    fn test_key_order_independent() {
        let a = profile_hash(&json!({"a": 1, "b": 2})).unwrap();
        let b = profile_hash(&json!({"b": 2, "a": 1})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 40);
    }

    #[test]
    fn test_nested_key_order_independent() {
        let a = profile_hash(&json!({"style": {"font": "x", "size": 12}, "crop": "center"})).unwrap();
        let b = profile_hash(&json!({"crop": "center", "style": {"size": 12, "font": "x"}})).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_list_order_preserved() {
        let a = profile_hash(&json!({"keywords": ["alpha", "beta"]})).unwrap();
        let b = profile_hash(&json!({"keywords": ["beta", "alpha"]})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_different_values_differ() {
        let a = profile_hash(&json!({"a": 1})).unwrap();
        let b = profile_hash(&json!({"a": 2})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_non_map_fails_fast() {
        assert!(profile_hash(&json!([1, 2, 3])).is_err());
        assert!(profile_hash(&json!("profile")).is_err());
        assert!(profile_hash(&json!(42)).is_err());
    }

    #[test]
    fn test_deterministic() {
        let value = json!({"z": [3, 2, 1], "a": {"nested": true}});
        assert_eq!(profile_hash(&value).unwrap(), profile_hash(&value).unwrap());
    }
}
