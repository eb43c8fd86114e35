//! Core types for the settings store.
//!
//! Defines the recognized key vocabulary, the in-memory value representation,
//! the hash-status enum and the host platform family used for
//! environment-dependent defaults.

use crate::migrate::{CANONICAL_HASH_URL, CANONICAL_RULE_URL};
use serde_json::{json, Value};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time in milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// ================================================================================================
// PLATFORM FAMILY
// ================================================================================================

/// Host platform family.
///
/// The resource-type set default differs between the two families; this is
/// the only environment-dependent default in the store. The platform is
/// supplied by configuration at construction time rather than sniffed at
/// runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    Firefox,
    Chromium,
}

impl Platform {
    /// The fixed resource-type list seeded for this platform family.
    pub fn default_resource_types(&self) -> &'static [&'static str] {
        match self {
            Platform::Firefox => &[
                "font",
                "image",
                "imageset",
                "main_frame",
                "media",
                "object",
                "object_subrequest",
                "other",
                "script",
                "stylesheet",
                "sub_frame",
                "websocket",
                "xbl",
                "xml_dtd",
                "xmlhttprequest",
                "xslt",
            ],
            Platform::Chromium => &[
                "main_frame",
                "sub_frame",
                "stylesheet",
                "script",
                "image",
                "font",
                "object",
                "xmlhttprequest",
                "ping",
                "csp_report",
                "media",
                "websocket",
                "other",
            ],
        }
    }
}

// ================================================================================================
// IN-MEMORY VALUES
// ================================================================================================

/// In-memory representation of a cache entry.
///
/// The wire form (what the durable backend sees) is always a
/// `serde_json::Value`; this enum is what consumers read after the per-key
/// codec has run. `Raw` carries values of unrecognized shape through
/// untouched.
#[derive(Clone, Debug, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<String>),
    Json(Value),
    Raw(Value),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SettingValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            SettingValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            SettingValue::Json(v) => Some(v),
            _ => None,
        }
    }

    /// Map a wire scalar onto the matching in-memory shape.
    ///
    /// Booleans, integers and strings become their native variants; anything
    /// else (floats, objects, arrays arriving under a passthrough key) is
    /// kept raw so it survives the next flush byte-for-byte.
    pub fn from_wire_scalar(value: Value) -> Self {
        match value {
            Value::Bool(b) => SettingValue::Bool(b),
            Value::Number(ref n) if n.is_i64() => SettingValue::Int(n.as_i64().unwrap_or(0)),
            Value::String(s) => SettingValue::Text(s),
            other => SettingValue::Raw(other),
        }
    }

    /// The wire form of a value under passthrough (identity) encoding.
    pub fn to_wire_scalar(&self) -> Value {
        match self {
            SettingValue::Bool(b) => Value::Bool(*b),
            SettingValue::Int(i) => json!(i),
            SettingValue::Text(s) => Value::String(s.clone()),
            SettingValue::List(items) => json!(items),
            SettingValue::Json(v) => v.clone(),
            SettingValue::Raw(v) => v.clone(),
        }
    }
}

// ================================================================================================
// HASH STATUS
// ================================================================================================

/// Outcome of the most recent rule-set hash comparison.
///
/// Stored in the cache as one of four fixed string tokens, never as the raw
/// integer callers pass in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusCode {
    UpToDate,
    Updated,
    UpdateAvailable,
    Unknown,
}

impl StatusCode {
    /// Map a caller-supplied integer onto the closed status set.
    ///
    /// 1, 2 and 3 map to the named states; every other integer collapses to
    /// `Unknown`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => StatusCode::UpToDate,
            2 => StatusCode::Updated,
            3 => StatusCode::UpdateAvailable,
            _ => StatusCode::Unknown,
        }
    }

    /// The fixed string token persisted for this status.
    pub fn token(&self) -> &'static str {
        match self {
            StatusCode::UpToDate => "hash_status_code_1",
            StatusCode::Updated => "hash_status_code_2",
            StatusCode::UpdateAvailable => "hash_status_code_3",
            StatusCode::Unknown => "hash_status_code_4",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

// ================================================================================================
// RECOGNIZED KEYS
// ================================================================================================

/// The closed vocabulary of recognized setting keys.
///
/// Each variant knows its wire name (the exact string key used in persisted
/// snapshots, kept stable so existing snapshots hydrate) and its built-in
/// default. Keys outside this set are handled as passthrough entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingKey {
    /// Parsed rule-set data (structured JSON).
    RuleData,
    /// Hash of the currently loaded rule set.
    DataHash,
    /// Whether the badge counter is shown.
    BadgedStatus,
    /// Master on/off switch.
    GlobalStatus,
    /// Count of URLs processed.
    GlobalUrlCounter,
    /// Count of fields cleaned.
    GlobalCounter,
    /// Hash comparison status token.
    HashStatus,
    /// Whether per-request logging is enabled.
    LoggingStatus,
    /// The request log (structured JSON).
    Log,
    /// Whether statistics collection is enabled.
    StatisticsStatus,
    /// Badge background color (hex, no leading '#').
    BadgedColor,
    /// Remote endpoint for the rule-set hash.
    HashUrl,
    /// Remote endpoint for the rule-set data.
    RuleUrl,
    /// Whether the context-menu feature is enabled.
    ContextMenuEnabled,
    /// Whether the history-listener feature is enabled.
    HistoryListenerEnabled,
    /// Whether localhost requests are skipped.
    LocalHostsSkipping,
    /// Resource types the engine intercepts (ordered set).
    ResourceTypes,
}

impl SettingKey {
    /// All recognized keys, in seeding order.
    pub const ALL: [SettingKey; 17] = [
        SettingKey::RuleData,
        SettingKey::DataHash,
        SettingKey::BadgedStatus,
        SettingKey::GlobalStatus,
        SettingKey::GlobalUrlCounter,
        SettingKey::GlobalCounter,
        SettingKey::HashStatus,
        SettingKey::LoggingStatus,
        SettingKey::Log,
        SettingKey::StatisticsStatus,
        SettingKey::BadgedColor,
        SettingKey::HashUrl,
        SettingKey::RuleUrl,
        SettingKey::ContextMenuEnabled,
        SettingKey::HistoryListenerEnabled,
        SettingKey::LocalHostsSkipping,
        SettingKey::ResourceTypes,
    ];

    /// The string key used in the persisted snapshot.
    pub fn wire_name(&self) -> &'static str {
        match self {
            SettingKey::RuleData => "ClearURLsData",
            SettingKey::DataHash => "dataHash",
            SettingKey::BadgedStatus => "badgedStatus",
            SettingKey::GlobalStatus => "globalStatus",
            SettingKey::GlobalUrlCounter => "globalurlcounter",
            SettingKey::GlobalCounter => "globalCounter",
            SettingKey::HashStatus => "hashStatus",
            SettingKey::LoggingStatus => "loggingStatus",
            SettingKey::Log => "log",
            SettingKey::StatisticsStatus => "statisticsStatus",
            SettingKey::BadgedColor => "badged_color",
            SettingKey::HashUrl => "hashURL",
            SettingKey::RuleUrl => "ruleURL",
            SettingKey::ContextMenuEnabled => "contextMenuEnabled",
            SettingKey::HistoryListenerEnabled => "historyListenerEnabled",
            SettingKey::LocalHostsSkipping => "localHostsSkipping",
            SettingKey::ResourceTypes => "types",
        }
    }

    /// Resolve a wire key back to a recognized variant, if any.
    pub fn from_wire(name: &str) -> Option<SettingKey> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|k| k.wire_name() == name)
    }

    /// The built-in default seeded at hydration step 1.
    ///
    /// Only the resource-type set depends on the platform family. Note the
    /// hash status deliberately seeds the literal text "error" rather than
    /// one of the four status tokens: consumers treat it as "no comparison
    /// has run yet".
    pub fn default_value(&self, platform: Platform) -> SettingValue {
        match self {
            SettingKey::RuleData => SettingValue::Json(json!([])),
            SettingKey::DataHash => SettingValue::Text(String::new()),
            SettingKey::BadgedStatus => SettingValue::Bool(true),
            SettingKey::GlobalStatus => SettingValue::Bool(true),
            SettingKey::GlobalUrlCounter => SettingValue::Int(0),
            SettingKey::GlobalCounter => SettingValue::Int(0),
            SettingKey::HashStatus => SettingValue::Text("error".to_string()),
            SettingKey::LoggingStatus => SettingValue::Bool(false),
            SettingKey::Log => SettingValue::Json(json!({ "log": [] })),
            SettingKey::StatisticsStatus => SettingValue::Bool(true),
            SettingKey::BadgedColor => SettingValue::Text("ffa500".to_string()),
            SettingKey::HashUrl => SettingValue::Text(CANONICAL_HASH_URL.to_string()),
            SettingKey::RuleUrl => SettingValue::Text(CANONICAL_RULE_URL.to_string()),
            SettingKey::ContextMenuEnabled => SettingValue::Bool(true),
            SettingKey::HistoryListenerEnabled => SettingValue::Bool(true),
            SettingKey::LocalHostsSkipping => SettingValue::Bool(true),
            SettingKey::ResourceTypes => SettingValue::List(
                platform
                    .default_resource_types()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
        }
    }
}

// Display uses the wire name so log lines match what is on disk.
impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
