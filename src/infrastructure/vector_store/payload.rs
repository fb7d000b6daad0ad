//! Conversions between store payloads and string metadata

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Payload key holding the chunk text
pub const TEXT_KEY: &str = "text";

/// Flatten a JSON object into string metadata, skipping the text key
pub fn metadata_from_json(payload: Option<&Map<String, Value>>) -> HashMap<String, String> {
    payload
        .into_iter()
        .flatten()
        .filter(|(key, _)| key.as_str() != TEXT_KEY)
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

/// Payload object for one chunk: its metadata plus the text
pub fn payload_for(text: &str, metadata: &HashMap<String, String>) -> Value {
    let mut payload: Map<String, Value> = metadata
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    payload.insert(TEXT_KEY.to_string(), Value::String(text.to_string()));

    Value::Object(payload)
}
