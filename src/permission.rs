use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ts_rs::TS;

/// PermissionSet
///
/// The held permissions of a session, in whichever shape the session provider delivered them.
/// - `List`: every key present is granted.
/// - `Map`: a key is granted only when its flag is true. Presence alone grants nothing.
///
/// The shape differs per session, so it is detected from the raw JSON (see `from_json`)
/// rather than assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum PermissionSet {
    List(Vec<String>),
    Map(HashMap<String, bool>),
}

impl PermissionSet {
    /// from_json
    ///
    /// Detects the shape of a raw permissions value.
    /// Arrays become `List`, keeping only the string entries. Objects become `Map`, with each
    /// value coerced by JSON truthiness. Anything else (null, number, string) yields `None`,
    /// which callers treat as zero permissions.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(PermissionSet::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect(),
            )),
            Value::Object(entries) => Some(PermissionSet::Map(
                entries
                    .iter()
                    .map(|(key, flag)| (key.clone(), is_truthy(flag)))
                    .collect(),
            )),
            _ => None,
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// deserialize_lenient
///
/// Field-level deserializer for `Option<PermissionSet>`. A malformed shape becomes `None`
/// instead of failing the whole payload.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Option<PermissionSet>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(PermissionSet::from_json))
}

/// normalize
///
/// Canonicalizes a permission key for comparison: the first `.` becomes `:`.
/// Only the first one. `inbox.reply.bulk` becomes `inbox:reply.bulk`, not `inbox:reply:bulk`.
pub fn normalize(key: &str) -> String {
    key.replacen('.', ":", 1)
}

/// is_granted
///
/// Decides whether `held` satisfies `required`.
///
/// * No requirement (absent or empty) is always granted, even without a session.
/// * No held set is never granted.
/// * Otherwise some held key must start with the normalized requirement, so a broader key
///   such as `campaigns:view:all` satisfies `campaigns:view`. In map form that key's flag
///   must also be true.
///
/// Held keys are compared as stored; only the requirement is normalized.
pub fn is_granted(required: Option<&str>, held: Option<&PermissionSet>) -> bool {
    let required = match required {
        Some(key) if !key.is_empty() => normalize(key),
        _ => return true,
    };

    match held {
        None => false,
        Some(PermissionSet::List(keys)) => keys.iter().any(|key| key.starts_with(&required)),
        Some(PermissionSet::Map(flags)) => flags
            .iter()
            .any(|(key, granted)| *granted && key.starts_with(&required)),
    }
}
