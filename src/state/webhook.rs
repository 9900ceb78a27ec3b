//! Typed state for the `zendesk_webhook` resource.

use std::collections::BTreeMap;

use crate::error::ProviderError;
use crate::state::{
    dyn_string, dyn_string_list, dyn_string_map, get_object, get_string, get_string_list,
    get_string_map, json_to_map,
};
use crate::value::{Dynamic, Value};

/// Full state of one `zendesk_webhook` resource.
///
/// `webhook_id` is the top-level computed identity; the nested object carries
/// everything else, including its own copy of the id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookState {
    pub webhook_id: Value<String>,
    pub webhook: WebhookBody,
}

/// The nested `webhook` attribute object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookBody {
    pub id: Value<String>,
    pub name: Value<String>,
    pub endpoint: Value<String>,
    pub http_method: Value<String>,
    pub request_format: Value<String>,
    pub status: Value<String>,
    pub description: Value<String>,
    pub custom_headers: Value<BTreeMap<String, String>>,
    pub subscriptions: Value<Vec<String>>,
    pub authentication: Value<AuthenticationState>,
    pub external_source: Value<ExternalSourceState>,
    pub signing_secret: Value<SigningSecretState>,
    pub created_at: Value<String>,
    pub created_by: Value<String>,
    pub updated_at: Value<String>,
    pub updated_by: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationState {
    pub auth_type: Value<String>,
    pub add_position: Value<String>,
    pub data: Value<AuthenticationDataState>,
}

/// Secret-bearing auth data. `password` and `token` only ever live in state;
/// the API never returns them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthenticationDataState {
    pub username: Value<String>,
    pub password: Value<String>,
    pub token: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSourceState {
    pub source_type: Value<String>,
    pub data: Value<ExternalSourceDataState>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalSourceDataState {
    pub app_id: Value<String>,
    pub installation_id: Value<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SigningSecretState {
    pub algorithm: Value<String>,
    pub secret: Value<String>,
}

impl WebhookState {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ProviderError> {
        let map = json_to_map(value)?;
        let webhook = match get_object(&map, "webhook")? {
            Value::Known(body) => WebhookBody::from_dynamic(&body)?,
            _ => WebhookBody::default(),
        };
        Ok(Self {
            webhook_id: get_string(&map, "webhook_id")?,
            webhook,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = BTreeMap::new();
        map.insert("webhook_id".to_string(), dyn_string(&self.webhook_id));
        map.insert("webhook".to_string(), self.webhook.to_dynamic());
        Dynamic::Map(map).to_json()
    }
}

impl WebhookBody {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        let authentication = match get_object(map, "authentication")? {
            Value::Known(obj) => Value::Known(AuthenticationState::from_dynamic(&obj)?),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        };
        let external_source = match get_object(map, "external_source")? {
            Value::Known(obj) => Value::Known(ExternalSourceState::from_dynamic(&obj)?),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        };
        let signing_secret = match get_object(map, "signing_secret")? {
            Value::Known(obj) => Value::Known(SigningSecretState::from_dynamic(&obj)?),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        };
        Ok(Self {
            id: get_string(map, "id")?,
            name: get_string(map, "name")?,
            endpoint: get_string(map, "endpoint")?,
            http_method: get_string(map, "http_method")?,
            request_format: get_string(map, "request_format")?,
            status: get_string(map, "status")?,
            description: get_string(map, "description")?,
            custom_headers: get_string_map(map, "custom_headers")?,
            subscriptions: get_string_list(map, "subscriptions")?,
            authentication,
            external_source,
            signing_secret,
            created_at: get_string(map, "created_at")?,
            created_by: get_string(map, "created_by")?,
            updated_at: get_string(map, "updated_at")?,
            updated_by: get_string(map, "updated_by")?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("id".to_string(), dyn_string(&self.id));
        map.insert("name".to_string(), dyn_string(&self.name));
        map.insert("endpoint".to_string(), dyn_string(&self.endpoint));
        map.insert("http_method".to_string(), dyn_string(&self.http_method));
        map.insert(
            "request_format".to_string(),
            dyn_string(&self.request_format),
        );
        map.insert("status".to_string(), dyn_string(&self.status));
        map.insert("description".to_string(), dyn_string(&self.description));
        map.insert(
            "custom_headers".to_string(),
            dyn_string_map(&self.custom_headers),
        );
        map.insert(
            "subscriptions".to_string(),
            dyn_string_list(&self.subscriptions),
        );
        map.insert(
            "authentication".to_string(),
            match &self.authentication {
                Value::Known(auth) => auth.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        map.insert(
            "external_source".to_string(),
            match &self.external_source {
                Value::Known(source) => source.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        map.insert(
            "signing_secret".to_string(),
            match &self.signing_secret {
                Value::Known(secret) => secret.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        map.insert("created_at".to_string(), dyn_string(&self.created_at));
        map.insert("created_by".to_string(), dyn_string(&self.created_by));
        map.insert("updated_at".to_string(), dyn_string(&self.updated_at));
        map.insert("updated_by".to_string(), dyn_string(&self.updated_by));
        Dynamic::Map(map)
    }
}

impl AuthenticationState {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        let data = match get_object(map, "data")? {
            Value::Known(obj) => Value::Known(AuthenticationDataState::from_dynamic(&obj)?),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        };
        Ok(Self {
            auth_type: get_string(map, "type")?,
            add_position: get_string(map, "add_position")?,
            data,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("type".to_string(), dyn_string(&self.auth_type));
        map.insert("add_position".to_string(), dyn_string(&self.add_position));
        map.insert(
            "data".to_string(),
            match &self.data {
                Value::Known(data) => data.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        Dynamic::Map(map)
    }
}

impl AuthenticationDataState {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        Ok(Self {
            username: get_string(map, "username")?,
            password: get_string(map, "password")?,
            token: get_string(map, "token")?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("username".to_string(), dyn_string(&self.username));
        map.insert("password".to_string(), dyn_string(&self.password));
        map.insert("token".to_string(), dyn_string(&self.token));
        Dynamic::Map(map)
    }
}

impl ExternalSourceState {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        let data = match get_object(map, "data")? {
            Value::Known(obj) => Value::Known(ExternalSourceDataState::from_dynamic(&obj)?),
            Value::Null => Value::Null,
            Value::Unknown => Value::Unknown,
        };
        Ok(Self {
            source_type: get_string(map, "type")?,
            data,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("type".to_string(), dyn_string(&self.source_type));
        map.insert(
            "data".to_string(),
            match &self.data {
                Value::Known(data) => data.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        Dynamic::Map(map)
    }
}

impl ExternalSourceDataState {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        Ok(Self {
            app_id: get_string(map, "app_id")?,
            installation_id: get_string(map, "installation_id")?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("app_id".to_string(), dyn_string(&self.app_id));
        map.insert(
            "installation_id".to_string(),
            dyn_string(&self.installation_id),
        );
        Dynamic::Map(map)
    }
}

impl SigningSecretState {
    pub fn from_dynamic(map: &BTreeMap<String, Dynamic>) -> Result<Self, ProviderError> {
        Ok(Self {
            algorithm: get_string(map, "algorithm")?,
            secret: get_string(map, "secret")?,
        })
    }

    pub fn to_dynamic(&self) -> Dynamic {
        let mut map = BTreeMap::new();
        map.insert("algorithm".to_string(), dyn_string(&self.algorithm));
        map.insert("secret".to_string(), dyn_string(&self.secret));
        Dynamic::Map(map)
    }
}
