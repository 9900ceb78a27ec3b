//! Three-valued attribute values and the dynamic attribute representation.
//!
//! Every attribute in a plan or state is in exactly one of three conditions:
//! known, null, or unknown (a value the plan has not resolved yet). Typed
//! state models carry [`Value<T>`] per attribute; the protocol boundary
//! carries the schema-less [`Dynamic`] form, which is converted to and from
//! JSON with an explicit sentinel for unknown values so that unknowns can
//! never be mistaken for nulls.

use std::collections::{BTreeMap, HashMap};

use crate::error::ProviderError;
use crate::schema::AttributeType;

/// JSON object key marking an unknown value at the protocol boundary.
pub const UNKNOWN_SENTINEL: &str = "__unknown__";

/// A single attribute value in its three-valued form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value<T> {
    /// A concrete value.
    Known(T),
    /// Explicitly absent.
    Null,
    /// Not yet resolved by the plan.
    Unknown,
}

impl<T> Value<T> {
    pub fn is_known(&self) -> bool {
        matches!(self, Value::Known(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    /// Borrow the contained value, if known.
    pub fn as_known(&self) -> Option<&T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Known becomes `Some`, Null and Unknown both become `None`.
    ///
    /// This is the only bridge from state values to outbound request fields,
    /// which is what keeps unknowns out of request bodies.
    pub fn into_option(self) -> Option<T> {
        match self {
            Value::Known(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Value<U> {
        match self {
            Value::Known(v) => Value::Known(f(v)),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        }
    }
}

impl<T: Default> Value<T> {
    /// The contained value, or the type's default when Null or Unknown.
    ///
    /// Used for required request fields, mirroring the "value or empty"
    /// extraction on the write path.
    pub fn known_or_default(self) -> T {
        match self {
            Value::Known(v) => v,
            _ => T::default(),
        }
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Null
    }
}

/// `None` from the wire becomes Null, `Some` becomes Known.
impl<T> From<Option<T>> for Value<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Value::Known(v),
            None => Value::Null,
        }
    }
}

/// Schema-less attribute value used at the protocol boundary.
///
/// Objects and maps share the `Map` variant; the schema decides which one a
/// given attribute is.
#[derive(Debug, Clone, PartialEq)]
pub enum Dynamic {
    Null,
    Unknown,
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Dynamic>),
    Map(BTreeMap<String, Dynamic>),
}

impl Dynamic {
    /// Human-readable name of this value's shape, for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Dynamic::Null => "null",
            Dynamic::Unknown => "unknown",
            Dynamic::Bool(_) => "bool",
            Dynamic::Int(_) => "int64",
            Dynamic::String(_) => "string",
            Dynamic::List(_) => "list",
            Dynamic::Map(_) => "map",
        }
    }

    /// Decode a protocol JSON value.
    ///
    /// `{"__unknown__": true}` decodes to [`Dynamic::Unknown`]. Non-integral
    /// numbers are rejected since no attribute type carries them.
    pub fn from_json(value: &serde_json::Value) -> Result<Dynamic, ProviderError> {
        Self::from_json_at(value, "")
    }

    fn from_json_at(value: &serde_json::Value, path: &str) -> Result<Dynamic, ProviderError> {
        match value {
            serde_json::Value::Null => Ok(Dynamic::Null),
            serde_json::Value::Bool(b) => Ok(Dynamic::Bool(*b)),
            serde_json::Value::Number(n) => n.as_i64().map(Dynamic::Int).ok_or_else(|| {
                ProviderError::TypeMismatch {
                    attribute: path.to_string(),
                    expected: "int64".to_string(),
                    actual: format!("number {}", n),
                }
            }),
            serde_json::Value::String(s) => Ok(Dynamic::String(s.clone())),
            serde_json::Value::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    list.push(Dynamic::from_json_at(item, &format!("{}[{}]", path, i))?);
                }
                Ok(Dynamic::List(list))
            }
            serde_json::Value::Object(fields) => {
                if fields.len() == 1 {
                    if let Some(serde_json::Value::Bool(true)) = fields.get(UNKNOWN_SENTINEL) {
                        return Ok(Dynamic::Unknown);
                    }
                }
                let mut map = BTreeMap::new();
                for (key, field) in fields {
                    map.insert(
                        key.clone(),
                        Dynamic::from_json_at(field, &join_path(path, key))?,
                    );
                }
                Ok(Dynamic::Map(map))
            }
        }
    }

    /// Encode to protocol JSON. Unknown becomes the sentinel object.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Dynamic::Null => serde_json::Value::Null,
            Dynamic::Unknown => serde_json::json!({ UNKNOWN_SENTINEL: true }),
            Dynamic::Bool(b) => serde_json::Value::Bool(*b),
            Dynamic::Int(i) => serde_json::Value::from(*i),
            Dynamic::String(s) => serde_json::Value::String(s.clone()),
            Dynamic::List(items) => {
                serde_json::Value::Array(items.iter().map(Dynamic::to_json).collect())
            }
            Dynamic::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Validate a dynamic attribute map against its declared attribute types.
///
/// Every declared attribute must be present (Null and Unknown count as
/// present), every present value must match its declared shape, and no
/// undeclared key may appear. Violations are construction errors:
/// [`ProviderError::MissingAttribute`], [`ProviderError::TypeMismatch`] and
/// [`ProviderError::UnexpectedAttribute`].
pub fn from_attribute_map(
    types: &HashMap<String, AttributeType>,
    values: &BTreeMap<String, Dynamic>,
) -> Result<BTreeMap<String, Dynamic>, ProviderError> {
    check_attribute_map(types, values, "")?;
    Ok(values.clone())
}

fn check_attribute_map(
    types: &HashMap<String, AttributeType>,
    values: &BTreeMap<String, Dynamic>,
    prefix: &str,
) -> Result<(), ProviderError> {
    for (name, ty) in types {
        let path = join_path(prefix, name);
        match values.get(name) {
            None => return Err(ProviderError::MissingAttribute(path)),
            Some(value) => check_type(value, ty, &path)?,
        }
    }
    for name in values.keys() {
        if !types.contains_key(name) {
            return Err(ProviderError::UnexpectedAttribute(join_path(prefix, name)));
        }
    }
    Ok(())
}

fn check_type(value: &Dynamic, ty: &AttributeType, path: &str) -> Result<(), ProviderError> {
    // Null and Unknown are valid at any type.
    match (value, ty) {
        (Dynamic::Null | Dynamic::Unknown, _) => Ok(()),
        (Dynamic::String(_), AttributeType::String) => Ok(()),
        (Dynamic::Int(_), AttributeType::Int64) => Ok(()),
        (Dynamic::Bool(_), AttributeType::Bool) => Ok(()),
        (Dynamic::List(items), AttributeType::List(elem)) => {
            for (i, item) in items.iter().enumerate() {
                check_type(item, elem, &format!("{}[{}]", path, i))?;
            }
            Ok(())
        }
        (Dynamic::Map(map), AttributeType::Map(elem)) => {
            for (key, item) in map {
                check_type(item, elem, &join_path(path, key))?;
            }
            Ok(())
        }
        (Dynamic::Map(map), AttributeType::Object(attrs)) => check_attribute_map(attrs, map, path),
        (actual, expected) => Err(ProviderError::TypeMismatch {
            attribute: path.to_string(),
            expected: expected.name().to_string(),
            actual: actual.kind().to_string(),
        }),
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}
