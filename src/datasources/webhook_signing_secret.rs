//! Data source exposing a webhook's signing secret.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::api::ZendeskClient;
use crate::error::ProviderError;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::state::{dyn_string, get_string, json_to_map, SigningSecretState};
use crate::value::{Dynamic, Value};

/// Resolved state of one `zendesk_webhook_signing_secret` data source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SigningSecretData {
    pub webhook_id: Value<String>,
    pub signing_secret: Value<SigningSecretState>,
}

impl SigningSecretData {
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ProviderError> {
        let map = json_to_map(value)?;
        Ok(Self {
            webhook_id: get_string(&map, "webhook_id")?,
            signing_secret: Value::Null,
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut map = BTreeMap::new();
        map.insert("webhook_id".to_string(), dyn_string(&self.webhook_id));
        map.insert(
            "signing_secret".to_string(),
            match &self.signing_secret {
                Value::Known(secret) => secret.to_dynamic(),
                Value::Null => Dynamic::Null,
                Value::Unknown => Dynamic::Unknown,
            },
        );
        Dynamic::Map(map).to_json()
    }
}

pub struct WebhookSigningSecretDataSource {
    client: Arc<ZendeskClient>,
}

impl WebhookSigningSecretDataSource {
    pub fn new(client: Arc<ZendeskClient>) -> Self {
        Self { client }
    }

    pub async fn read(&self, mut data: SigningSecretData) -> Result<SigningSecretData, ProviderError> {
        let id = data.webhook_id.clone().known_or_default();
        if id.is_empty() {
            return Err(ProviderError::Validation(
                "webhook_id must be set to read a signing secret".to_string(),
            ));
        }
        let response = self.client.show_webhook_signing_secret(&id).await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let secret = response
            .into_value()?
            .signing_secret
            .unwrap_or_default();
        data.signing_secret = Value::Known(SigningSecretState {
            algorithm: Value::from(secret.algorithm),
            secret: Value::from(secret.secret),
        });
        Ok(data)
    }
}

/// Schema of the `zendesk_webhook_signing_secret` data source.
pub fn schema() -> Schema {
    let mut secret = HashMap::new();
    secret.insert("algorithm".to_string(), AttributeType::String);
    secret.insert("secret".to_string(), AttributeType::String);

    Schema::new(0)
        .with_description("Reads the signing secret of an existing webhook.")
        .with_attribute(
            Attribute::new("webhook_id", AttributeType::String)
                .required()
                .with_description("Identifier of the webhook to read."),
        )
        .with_attribute(
            Attribute::new("signing_secret", AttributeType::Object(secret))
                .computed()
                .sensitive(),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_round_trip() {
        let json = serde_json::json!({ "webhook_id": "01EJ..." });
        let data = SigningSecretData::from_json(&json).unwrap();
        assert_eq!(data.webhook_id, Value::Known("01EJ...".to_string()));
        assert!(data.signing_secret.is_null());
        let out = data.to_json();
        assert_eq!(out["webhook_id"], "01EJ...");
        assert_eq!(out["signing_secret"], serde_json::Value::Null);
    }

    #[test]
    fn test_schema_marks_secret_sensitive() {
        let schema = schema();
        assert!(schema.attribute("webhook_id").unwrap().required);
        let secret = schema.attribute("signing_secret").unwrap();
        assert!(secret.computed);
        assert!(secret.sensitive);
    }
}
