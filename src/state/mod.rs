//! Typed state models for the provider's resources.
//!
//! Each resource carries its state as a struct of [`Value`]s, converted to
//! and from the dynamic attribute map at the protocol boundary. Parsing here
//! is shape-checked but lenient about absent keys (absent means Null);
//! schema-level strictness (missing, mistyped, undeclared attributes) is
//! enforced separately when configs are validated.

pub mod custom_status;
pub mod webhook;

pub use custom_status::{CustomStatusBody, CustomStatusState};
pub use webhook::{
    AuthenticationDataState, AuthenticationState, ExternalSourceDataState, ExternalSourceState,
    SigningSecretState, WebhookBody, WebhookState,
};

use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::value::{Dynamic, Value};

fn mismatch(key: &str, expected: &str, actual: &Dynamic) -> ProviderError {
    ProviderError::TypeMismatch {
        attribute: key.to_string(),
        expected: expected.to_string(),
        actual: actual.kind().to_string(),
    }
}

pub(crate) fn get_string(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<String>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::String(s)) => Ok(Value::Known(s.clone())),
        Some(other) => Err(mismatch(key, "string", other)),
    }
}

pub(crate) fn get_int(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<i64>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::Int(i)) => Ok(Value::Known(*i)),
        Some(other) => Err(mismatch(key, "int64", other)),
    }
}

pub(crate) fn get_bool(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<bool>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::Bool(b)) => Ok(Value::Known(*b)),
        Some(other) => Err(mismatch(key, "bool", other)),
    }
}

pub(crate) fn get_string_list(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<Vec<String>>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::List(items)) => {
            let mut list = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Dynamic::String(s) => list.push(s.clone()),
                    other => return Err(mismatch(key, "list of string", other)),
                }
            }
            Ok(Value::Known(list))
        }
        Some(other) => Err(mismatch(key, "list of string", other)),
    }
}

pub(crate) fn get_string_map(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<BTreeMap<String, String>>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::Map(entries)) => {
            let mut out = BTreeMap::new();
            for (k, v) in entries {
                match v {
                    Dynamic::String(s) => {
                        out.insert(k.clone(), s.clone());
                    }
                    other => return Err(mismatch(key, "map of string", other)),
                }
            }
            Ok(Value::Known(out))
        }
        Some(other) => Err(mismatch(key, "map of string", other)),
    }
}

pub(crate) fn get_object(
    map: &BTreeMap<String, Dynamic>,
    key: &str,
) -> Result<Value<BTreeMap<String, Dynamic>>, ProviderError> {
    match map.get(key) {
        None | Some(Dynamic::Null) => Ok(Value::Null),
        Some(Dynamic::Unknown) => Ok(Value::Unknown),
        Some(Dynamic::Map(entries)) => Ok(Value::Known(entries.clone())),
        Some(other) => Err(mismatch(key, "object", other)),
    }
}

pub(crate) fn dyn_string(value: &Value<String>) -> Dynamic {
    match value {
        Value::Known(s) => Dynamic::String(s.clone()),
        Value::Null => Dynamic::Null,
        Value::Unknown => Dynamic::Unknown,
    }
}

pub(crate) fn dyn_int(value: &Value<i64>) -> Dynamic {
    match value {
        Value::Known(i) => Dynamic::Int(*i),
        Value::Null => Dynamic::Null,
        Value::Unknown => Dynamic::Unknown,
    }
}

pub(crate) fn dyn_bool(value: &Value<bool>) -> Dynamic {
    match value {
        Value::Known(b) => Dynamic::Bool(*b),
        Value::Null => Dynamic::Null,
        Value::Unknown => Dynamic::Unknown,
    }
}

pub(crate) fn dyn_string_list(value: &Value<Vec<String>>) -> Dynamic {
    match value {
        Value::Known(items) => {
            Dynamic::List(items.iter().cloned().map(Dynamic::String).collect())
        }
        Value::Null => Dynamic::Null,
        Value::Unknown => Dynamic::Unknown,
    }
}

pub(crate) fn dyn_string_map(value: &Value<BTreeMap<String, String>>) -> Dynamic {
    match value {
        Value::Known(entries) => Dynamic::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), Dynamic::String(v.clone())))
                .collect(),
        ),
        Value::Null => Dynamic::Null,
        Value::Unknown => Dynamic::Unknown,
    }
}

/// Decode a protocol JSON value into a top-level attribute map.
pub(crate) fn json_to_map(
    value: &serde_json::Value,
) -> Result<BTreeMap<String, Dynamic>, ProviderError> {
    match Dynamic::from_json(value)? {
        Dynamic::Map(map) => Ok(map),
        other => Err(ProviderError::TypeMismatch {
            attribute: String::new(),
            expected: "object".to_string(),
            actual: other.kind().to_string(),
        }),
    }
}
