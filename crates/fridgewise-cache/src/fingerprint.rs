//! Request body fingerprints.
//!
//! A fingerprint folds an arbitrary JSON payload into a short key component.
//! Payloads that are deeply equal up to object key order always produce the
//! same fingerprint. The hash is not cryptographic and collisions between
//! distinct payloads are tolerated.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::error;

/// Returned when a payload cannot be serialized.
pub const UNKNOWN_FINGERPRINT: &str = "unknown";

/// Rewrites `value` so every object's keys are sorted at every depth.
///
/// Array element order is preserved.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();

            let mut sorted = Map::with_capacity(map.len());
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key.as_str()]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Fingerprint of a JSON payload.
pub fn fingerprint(value: &Value) -> String {
    match serde_json::to_string(&canonicalize(value)) {
        Ok(canonical) => hash_units(canonical.encode_utf16()),
        Err(e) => {
            error!(error = %e, "Body fingerprint serialization failed");
            UNKNOWN_FINGERPRINT.to_string()
        }
    }
}

/// Fingerprint of any serializable payload.
///
/// Values that cannot be represented as JSON, such as maps with non-string
/// keys, yield [`UNKNOWN_FINGERPRINT`].
pub fn fingerprint_serializable<T: Serialize + ?Sized>(payload: &T) -> String {
    match serde_json::to_value(payload) {
        Ok(value) => fingerprint(&value),
        Err(e) => {
            error!(error = %e, "Body fingerprint serialization failed");
            UNKNOWN_FINGERPRINT.to_string()
        }
    }
}

/// Fingerprint of a payload that is not JSON, computed over its raw bytes.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hash_units(bytes.iter().map(|b| u16::from(*b)))
}

/// Fingerprint of a raw request body, or `None` when the body does not
/// take part in a cache key.
///
/// Empty and whitespace-only bodies, `{}`, `[]` and bare JSON primitives are
/// ignored. Non-empty objects and arrays use [`fingerprint`]; anything that
/// is not JSON is hashed over its bytes.
pub fn request_body_fingerprint(bytes: &[u8]) -> Option<String> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) if map.is_empty() => None,
        Ok(Value::Array(items)) if items.is_empty() => None,
        Ok(value @ (Value::Object(_) | Value::Array(_))) => Some(fingerprint(&value)),
        Ok(_) => None,
        Err(_) => Some(fingerprint_bytes(bytes)),
    }
}

/// 32-bit rolling hash `h = h * 31 + unit`, rendered as lowercase hex of
/// its absolute value.
fn hash_units(units: impl Iterator<Item = u16>) -> String {
    let hash = units.fold(0i32, |h, unit| {
        (h << 5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    format!("{:x}", hash.unsigned_abs())
}
