//! Controller for the `zendesk_webhook` resource.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::models::{SigningSecret, Webhook, WebhookWriteEnvelope};
use crate::api::ZendeskClient;
use crate::error::ProviderError;
use crate::mapper::webhook::{
    plan_to_request_body, show_response_to_state, write_response_to_state,
};
use crate::resources::ReadNotFoundPolicy;
use crate::schema::{Attribute, AttributeType, Schema};
use crate::state::WebhookState;
use crate::value::Value;

pub struct WebhookResource {
    client: Arc<ZendeskClient>,
    read_not_found: ReadNotFoundPolicy,
}

impl WebhookResource {
    pub fn new(client: Arc<ZendeskClient>, read_not_found: ReadNotFoundPolicy) -> Self {
        Self {
            client,
            read_not_found,
        }
    }

    pub async fn create(&self, mut planned: WebhookState) -> Result<WebhookState, ProviderError> {
        let body = WebhookWriteEnvelope {
            webhook: plan_to_request_body(&planned),
        };
        let response = self.client.create_webhook(&body).await?;
        if response.status != 201 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let mut webhook = response
            .into_value()?
            .webhook
            .ok_or(ProviderError::MissingIdentity("webhook"))?;
        let id = webhook
            .id
            .clone()
            .ok_or(ProviderError::MissingIdentity("webhook"))?;
        info!(webhook_id = %id, "created webhook");

        self.fetch_signing_secret(&id, &mut webhook).await;
        write_response_to_state(&webhook, &mut planned)?;
        Ok(planned)
    }

    /// Refresh state from the API. `Ok(None)` means the webhook is gone and
    /// the policy says to drop it from state.
    pub async fn read(
        &self,
        mut state: WebhookState,
    ) -> Result<Option<WebhookState>, ProviderError> {
        let id = state.webhook_id.clone().known_or_default();
        let response = self.client.show_webhook(&id).await?;
        if response.status == 404 && self.read_not_found == ReadNotFoundPolicy::RemoveFromState {
            warn!(webhook_id = %id, "webhook no longer exists, removing from state");
            return Ok(None);
        }
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let mut webhook = response
            .into_value()?
            .webhook
            .ok_or(ProviderError::MissingIdentity("webhook"))?;
        self.fetch_signing_secret(&id, &mut webhook).await;
        show_response_to_state(&webhook, &mut state)?;
        Ok(Some(state))
    }

    pub async fn update(
        &self,
        mut planned: WebhookState,
        prior: WebhookState,
    ) -> Result<WebhookState, ProviderError> {
        let id = prior.webhook_id.clone().known_or_default();
        let body = WebhookWriteEnvelope {
            webhook: plan_to_request_body(&planned),
        };
        let response = self.client.update_webhook(&id, &body).await?;
        match response.status {
            204 => {}
            404 => {
                return Err(ProviderError::NotFound(format!("Webhook {} not found", id)));
            }
            _ => {
                return Err(ProviderError::Api {
                    status: response.status,
                    detail: response.detail(),
                });
            }
        }

        // Update answers 204 with an empty body, so the server-assigned
        // fields have to come from a follow-up Show.
        let response = self.client.show_webhook(&id).await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let mut webhook = response
            .into_value()?
            .webhook
            .ok_or(ProviderError::MissingIdentity("webhook"))?;
        self.fetch_signing_secret(&id, &mut webhook).await;
        write_response_to_state(&webhook, &mut planned)?;
        info!(webhook_id = %id, "updated webhook");
        Ok(planned)
    }

    pub async fn delete(&self, state: WebhookState) -> Result<(), ProviderError> {
        let id = state.webhook_id.clone().known_or_default();
        let response = self.client.delete_webhook(&id).await?;
        match response.status {
            204 => {
                info!(webhook_id = %id, "deleted webhook");
                Ok(())
            }
            404 => Err(ProviderError::NotFound("Webhook not found".to_string())),
            _ => Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            }),
        }
    }

    /// Resolve an import id to a webhook. A non-existent id falls back to a
    /// scan of all webhooks by name.
    pub async fn import(&self, id: &str) -> Result<WebhookState, ProviderError> {
        let response = self.client.show_webhook(id).await?;
        let resolved = match response.status {
            200 => response
                .into_value()?
                .webhook
                .and_then(|w| w.id)
                .ok_or(ProviderError::MissingIdentity("webhook"))?,
            404 => {
                debug!(webhook_id = %id, "webhook id not found, matching by name");
                self.find_by_name(id).await?
            }
            _ => {
                return Err(ProviderError::Api {
                    status: response.status,
                    detail: response.detail(),
                });
            }
        };
        let mut state = WebhookState::default();
        state.webhook_id = Value::Known(resolved.clone());
        state.webhook.id = Value::Known(resolved);
        Ok(state)
    }

    async fn find_by_name(&self, name: &str) -> Result<String, ProviderError> {
        let response = self.client.list_webhooks().await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let webhooks = response.into_value()?.webhooks.unwrap_or_default();
        webhooks
            .into_iter()
            .find(|w| w.name.as_deref() == Some(name))
            .and_then(|w| w.id)
            .ok_or_else(|| {
                ProviderError::NotFound(format!("No webhook with id or name '{}'", name))
            })
    }

    /// Best-effort secondary fetch: the primary payload does not carry the
    /// secret value, only the dedicated endpoint does. A failure here is
    /// logged and the empty object kept, never an operation failure.
    async fn fetch_signing_secret(&self, id: &str, webhook: &mut Webhook) {
        if webhook.signing_secret.is_none() {
            webhook.signing_secret = Some(SigningSecret::default());
        }
        match self.client.show_webhook_signing_secret(id).await {
            Ok(response) if response.status == 200 => {
                if let Some(secret) = response.value.and_then(|e| e.signing_secret) {
                    webhook.signing_secret = Some(secret);
                }
            }
            Ok(response) => {
                warn!(
                    webhook_id = %id,
                    status = response.status,
                    "signing secret fetch answered unexpectedly"
                );
            }
            Err(err) => {
                error!(webhook_id = %id, error = %err, "signing secret fetch failed");
            }
        }
    }
}

/// Schema of the `zendesk_webhook` resource.
pub fn schema() -> Schema {
    Schema::new(0)
        .with_description("Manages a webhook that pushes ticket events to an external endpoint.")
        .with_attribute(
            Attribute::new("webhook_id", AttributeType::String)
                .computed()
                .with_description("Identifier assigned by the API."),
        )
        .with_attribute(
            Attribute::new("webhook", AttributeType::Object(webhook_object_types()))
                .required()
                .sensitive()
                .with_description("The webhook definition, including write-only auth secrets."),
        )
}

fn webhook_object_types() -> HashMap<String, AttributeType> {
    let mut auth_data = HashMap::new();
    auth_data.insert("username".to_string(), AttributeType::String);
    auth_data.insert("password".to_string(), AttributeType::String);
    auth_data.insert("token".to_string(), AttributeType::String);

    let mut auth = HashMap::new();
    auth.insert("type".to_string(), AttributeType::String);
    auth.insert("add_position".to_string(), AttributeType::String);
    auth.insert("data".to_string(), AttributeType::Object(auth_data));

    let mut source_data = HashMap::new();
    source_data.insert("app_id".to_string(), AttributeType::String);
    source_data.insert("installation_id".to_string(), AttributeType::String);

    let mut source = HashMap::new();
    source.insert("type".to_string(), AttributeType::String);
    source.insert("data".to_string(), AttributeType::Object(source_data));

    let mut secret = HashMap::new();
    secret.insert("algorithm".to_string(), AttributeType::String);
    secret.insert("secret".to_string(), AttributeType::String);

    let mut types = HashMap::new();
    types.insert("id".to_string(), AttributeType::String);
    types.insert("name".to_string(), AttributeType::String);
    types.insert("endpoint".to_string(), AttributeType::String);
    types.insert("http_method".to_string(), AttributeType::String);
    types.insert("request_format".to_string(), AttributeType::String);
    types.insert("status".to_string(), AttributeType::String);
    types.insert("description".to_string(), AttributeType::String);
    types.insert(
        "custom_headers".to_string(),
        AttributeType::Map(Box::new(AttributeType::String)),
    );
    types.insert(
        "subscriptions".to_string(),
        AttributeType::List(Box::new(AttributeType::String)),
    );
    types.insert("authentication".to_string(), AttributeType::Object(auth));
    types.insert("external_source".to_string(), AttributeType::Object(source));
    types.insert("signing_secret".to_string(), AttributeType::Object(secret));
    types.insert("created_at".to_string(), AttributeType::String);
    types.insert("created_by".to_string(), AttributeType::String);
    types.insert("updated_at".to_string(), AttributeType::String);
    types.insert("updated_by".to_string(), AttributeType::String);
    types
}
