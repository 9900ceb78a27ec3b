//! Typed state for the `zendesk_custom_status` resource.

use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::state::{dyn_bool, dyn_int, dyn_string, get_bool, get_int, get_object, get_string, json_to_map};
use crate::value::{Dynamic, Value};

/// Full state of one `zendesk_custom_status` resource.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomStatusState {
    pub custom_status_id: Value<i64>,
    pub custom_status: CustomStatusBody,
}

/// The nested `custom_status` attribute object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomStatusBody {
    pub id: Value<i64>,
    pub active: Value<bool>,
    /// Whether this is the account default status for its category. The
    /// state attribute is named `default`.
    pub default_status: Value<bool>,
    pub agent_label: Value<String>,
    pub description: Value<String>,
    pub end_user_label: Value<String>,
    pub end_user_description: Value<String>,
    pub status_category: Value<String>,
    pub raw_agent_label: Value<String>,
    pub raw_description: Value<String>,
    pub raw_end_user_label: Value<String>,
    pub raw_end_user_description: Value<String>,
    pub created_at: Value<String>,
    pub updated_at: Value<String>,
}

impl CustomStatusState {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ProviderError> {
        let map = json_to_map(value)?;
        let custom_status = match get_object(&map, "custom_status")? {
            Value::Known(body) => CustomStatusBody::from_dynamic(&body)?,
            _ => CustomStatusBody::default(),
        };
        Ok(Self {
            custom_status_id: get_int(&map, "custom_status_id")?,
            custom_status,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = BTreeMap::new();
        map.insert(
            "custom_status_id".to_string(),
            dyn_int(&self.custom_status_id),
        );
        map.insert("custom_status".to_string(), self.custom_status.to_dynamic());
        Dynamic::Map(map).to_json()
    }
}

impl CustomStatusBody {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        Ok(Self {
            id: get_int(map, "id")?,
            active: get_bool(map, "active")?,
            default_status: get_bool(map, "default")?,
            agent_label: get_string(map, "agent_label")?,
            description: get_string(map, "description")?,
            end_user_label: get_string(map, "end_user_label")?,
            end_user_description: get_string(map, "end_user_description")?,
            status_category: get_string(map, "status_category")?,
            raw_agent_label: get_string(map, "raw_agent_label")?,
            raw_description: get_string(map, "raw_description")?,
            raw_end_user_label: get_string(map, "raw_end_user_label")?,
            raw_end_user_description: get_string(map, "raw_end_user_description")?,
            created_at: get_string(map, "created_at")?,
            updated_at: get_string(map, "updated_at")?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), dyn_int(&self.id));
        map.insert("active".to_string(), dyn_bool(&self.active));
        map.insert("default".to_string(), dyn_bool(&self.default_status));
        map.insert("agent_label".to_string(), dyn_string(&self.agent_label));
        map.insert("description".to_string(), dyn_string(&self.description));
        map.insert(
            "end_user_label".to_string(),
            dyn_string(&self.end_user_label),
        );
        map.insert(
            "end_user_description".to_string(),
            dyn_string(&self.end_user_description),
        );
        map.insert(
            "status_category".to_string(),
            dyn_string(&self.status_category),
        );
        map.insert(
            "raw_agent_label".to_string(),
            dyn_string(&self.raw_agent_label),
        );
        map.insert(
            "raw_description".to_string(),
            dyn_string(&self.raw_description),
        );
        map.insert(
            "raw_end_user_label".to_string(),
            dyn_string(&self.raw_end_user_label),
        );
        map.insert(
            "raw_end_user_description".to_string(),
            dyn_string(&self.raw_end_user_description),
        );
        map.insert("created_at".to_string(), dyn_string(&self.created_at));
        map.insert("updated_at".to_string(), dyn_string(&self.updated_at));
        Dynamic::Map(map)
    }
}
