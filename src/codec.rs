//! Type codec - per-key marshalling between memory and wire form.
//!
//! Every key belongs to exactly one behavior class, resolved statically from
//! the recognized-key table; the class never changes at runtime. The decode
//! direction runs on `Store::set` and the hydration-apply path, the encode
//! direction runs only on the flush path.
//!
//! Classes:
//! - **Json**: structured documents persisted as stringified JSON text
//! - **CommaList**: ordered string sets persisted as one comma-joined string
//! - **Url**: plain text with legacy-endpoint migration applied on decode
//! - **Passthrough**: identity both ways (scalars and unrecognized keys)

use crate::error::CodecError;
use crate::migrate::replace_legacy_url;
use crate::types::{SettingKey, SettingValue};
use serde_json::Value;

/// Behavior class of a key under the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecClass {
    Json,
    CommaList,
    Url,
    Passthrough,
}

/// Resolve the codec class for a wire key.
///
/// Unrecognized keys are a distinct passthrough case: they round-trip
/// through the store untouched.
pub fn class_of(key: &str) -> CodecClass {
    match SettingKey::from_wire(key) {
        Some(SettingKey::RuleData) | Some(SettingKey::Log) => CodecClass::Json,
        Some(SettingKey::ResourceTypes) => CodecClass::CommaList,
        Some(SettingKey::HashUrl) | Some(SettingKey::RuleUrl) => CodecClass::Url,
        Some(_) | None => CodecClass::Passthrough,
    }
}

fn wire_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a wire value into its in-memory representation.
///
/// This is the only place legacy URL migration is triggered, so every value
/// arriving from persisted or externally supplied data self-heals here.
pub fn decode(key: &str, value: Value) -> Result<SettingValue, CodecError> {
    match class_of(key) {
        CodecClass::Json => match value {
            Value::String(text) => {
                let parsed =
                    serde_json::from_str(&text).map_err(|source| CodecError::MalformedJson {
                        key: key.to_string(),
                        source,
                    })?;
                Ok(SettingValue::Json(parsed))
            }
            other => Err(CodecError::NotText {
                key: key.to_string(),
                found: wire_type_name(&other),
            }),
        },
        CodecClass::CommaList => match value {
            // "".split(',') yields [""], deliberately preserved: an empty
            // wire string means "one empty entry", not "no entries".
            Value::String(text) => Ok(SettingValue::List(
                text.split(',').map(|s| s.to_string()).collect(),
            )),
            other => Err(CodecError::NotText {
                key: key.to_string(),
                found: wire_type_name(&other),
            }),
        },
        CodecClass::Url => match value {
            Value::String(url) => Ok(SettingValue::Text(replace_legacy_url(&url))),
            other => Ok(SettingValue::from_wire_scalar(other)),
        },
        CodecClass::Passthrough => Ok(SettingValue::from_wire_scalar(value)),
    }
}

/// Encode an in-memory value into its wire representation.
///
/// Encoding is total: values that drifted out of their key's expected shape
/// fall back to passthrough encoding rather than failing the whole flush.
pub fn encode(key: &str, value: &SettingValue) -> Value {
    match class_of(key) {
        CodecClass::Json => match value {
            SettingValue::Json(doc) => {
                Value::String(serde_json::to_string(doc).unwrap_or_else(|_| "null".to_string()))
            }
            other => other.to_wire_scalar(),
        },
        CodecClass::CommaList => match value {
            SettingValue::List(items) => Value::String(items.join(",")),
            other => other.to_wire_scalar(),
        },
        CodecClass::Url | CodecClass::Passthrough => value.to_wire_scalar(),
    }
}
