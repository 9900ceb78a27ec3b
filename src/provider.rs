//! The Zendesk provider: schema surface, configuration, and dispatch of
//! resource operations to their controllers.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::api::ZendeskClient;
use crate::datasources::{self, WebhookSigningSecretDataSource};
use crate::datasources::webhook_signing_secret::SigningSecretData;
use crate::error::ProviderError;
use crate::resources::{self, CustomStatusResource, ReadNotFoundPolicy, WebhookResource};
use crate::schema::{Attribute, AttributeType, Diagnostic, ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::state::{get_string, json_to_map, CustomStatusState, WebhookState};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities};
use crate::validation::validate;
use crate::value::{Value, UNKNOWN_SENTINEL};

pub const RESOURCE_WEBHOOK: &str = "zendesk_webhook";
pub const RESOURCE_CUSTOM_STATUS: &str = "zendesk_custom_status";
pub const DATA_SOURCE_SIGNING_SECRET: &str = "zendesk_webhook_signing_secret";

pub struct ZendeskProvider {
    version: String,
    read_not_found: ReadNotFoundPolicy,
    client: RwLock<Option<Arc<ZendeskClient>>>,
}

impl ZendeskProvider {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            read_not_found: ReadNotFoundPolicy::default(),
            client: RwLock::new(None),
        }
    }

    /// Override what Read does when the API says a tracked resource is gone.
    pub fn with_read_not_found_policy(mut self, policy: ReadNotFoundPolicy) -> Self {
        self.read_not_found = policy;
        self
    }

    fn client(&self) -> Result<Arc<ZendeskClient>, ProviderError> {
        self.client
            .read()
            .map_err(|_| ProviderError::Configuration("client lock poisoned".to_string()))?
            .clone()
            .ok_or_else(|| {
                ProviderError::Configuration(
                    "the provider has not been configured yet".to_string(),
                )
            })
    }

    fn webhook_resource(&self) -> Result<WebhookResource, ProviderError> {
        Ok(WebhookResource::new(self.client()?, self.read_not_found))
    }

    fn custom_status_resource(&self) -> Result<CustomStatusResource, ProviderError> {
        Ok(CustomStatusResource::new(self.client()?, self.read_not_found))
    }
}

/// Schema of the provider configuration block.
fn provider_config_schema() -> Schema {
    Schema::new(0)
        .with_attribute(
            Attribute::new("account", AttributeType::String)
                .optional()
                .with_description("Account name of the Zendesk instance."),
        )
        .with_attribute(
            Attribute::new("email", AttributeType::String)
                .optional()
                .with_description("Email address of an agent with API access."),
        )
        .with_attribute(
            Attribute::new("token", AttributeType::String)
                .optional()
                .sensitive()
                .with_description("API token for the Zendesk instance."),
        )
}

struct ConfigAttribute {
    name: &'static str,
    display: &'static str,
    env_var: &'static str,
}

const CONFIG_ATTRIBUTES: [ConfigAttribute; 3] = [
    ConfigAttribute {
        name: "account",
        display: "Account",
        env_var: "ZENDESK_ACCOUNT",
    },
    ConfigAttribute {
        name: "email",
        display: "Email",
        env_var: "ZENDESK_EMAIL",
    },
    ConfigAttribute {
        name: "token",
        display: "Token",
        env_var: "ZENDESK_TOKEN",
    },
];

fn unknown_diagnostic(attribute: &ConfigAttribute) -> Diagnostic {
    Diagnostic::error(format!("Unknown Zendesk API {}", attribute.display))
        .with_detail(format!(
            "The provider cannot create the Zendesk API client as there is an unknown \
             configuration value for the Zendesk API {}. Either target apply the source of \
             the value first, set the value statically in the configuration, or use the {} \
             environment variable.",
            attribute.display.to_lowercase(),
            attribute.env_var
        ))
        .with_attribute(attribute.name)
}

fn missing_diagnostic(attribute: &ConfigAttribute) -> Diagnostic {
    Diagnostic::error(format!("Missing Zendesk API {}", attribute.display))
        .with_detail(format!(
            "The provider cannot create the Zendesk API client as there is a missing or \
             empty value for the Zendesk API {}. Set the {} value in the configuration or \
             use the {} environment variable. If either is already set, ensure the value \
             is not empty.",
            attribute.display.to_lowercase(),
            attribute.name,
            attribute.env_var
        ))
        .with_attribute(attribute.name)
}

/// Resolve one config attribute: an explicit value wins, a Null falls back
/// to the environment, anything left is empty.
fn resolve_config_value(value: Value<String>, env_var: &str) -> String {
    match value {
        Value::Known(value) => value,
        _ => std::env::var(env_var).unwrap_or_default(),
    }
}

/// Replace absent computed identity attributes with the unknown sentinel so
/// the plan says "assigned during apply" instead of "null".
fn mark_computed_unknown(resource_type: &str, mut state: serde_json::Value) -> serde_json::Value {
    let (id_key, object_key) = match resource_type {
        RESOURCE_WEBHOOK => ("webhook_id", "webhook"),
        _ => ("custom_status_id", "custom_status"),
    };
    let unknown = serde_json::json!({ UNKNOWN_SENTINEL: true });
    if let Some(top) = state.as_object_mut() {
        if top.get(id_key).map_or(true, |v| v.is_null()) {
            top.insert(id_key.to_string(), unknown.clone());
        }
        if let Some(nested) = top.get_mut(object_key).and_then(|v| v.as_object_mut()) {
            if nested.get("id").map_or(true, |v| v.is_null()) {
                nested.insert("id".to_string(), unknown);
            }
        }
    }
    state
}

#[async_trait]
impl ProviderService for ZendeskProvider {
    fn schema(&self) -> ProviderSchema {
        ProviderSchema::new(provider_config_schema())
            .with_resource(RESOURCE_WEBHOOK, resources::webhook::schema())
            .with_resource(RESOURCE_CUSTOM_STATUS, resources::custom_status::schema())
            .with_data_source(
                DATA_SOURCE_SIGNING_SECRET,
                datasources::webhook_signing_secret::schema(),
            )
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            type_name: "zendesk".to_string(),
            version: self.version.clone(),
            resources: vec![
                RESOURCE_WEBHOOK.to_string(),
                RESOURCE_CUSTOM_STATUS.to_string(),
            ],
            data_sources: vec![DATA_SOURCE_SIGNING_SECRET.to_string()],
            capabilities: ServerCapabilities::default(),
        }
    }

    async fn validate_provider_config(
        &self,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validate(&provider_config_schema(), &config))
    }

    async fn configure(
        &self,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        info!("configuring provider");
        let map = json_to_map(&config)?;

        let mut values = Vec::with_capacity(CONFIG_ATTRIBUTES.len());
        let mut diagnostics = Vec::new();
        for attribute in &CONFIG_ATTRIBUTES {
            let value = get_string(&map, attribute.name)?;
            if value.is_unknown() {
                diagnostics.push(unknown_diagnostic(attribute));
            }
            values.push(value);
        }
        if !diagnostics.is_empty() {
            return Ok(diagnostics);
        }

        let mut resolved = Vec::with_capacity(values.len());
        for (value, attribute) in values.into_iter().zip(&CONFIG_ATTRIBUTES) {
            let value = resolve_config_value(value, attribute.env_var);
            if value.is_empty() {
                diagnostics.push(missing_diagnostic(attribute));
            }
            resolved.push(value);
        }
        if !diagnostics.is_empty() {
            return Ok(diagnostics);
        }

        let [account, email, token]: [String; 3] = resolved
            .try_into()
            .map_err(|_| ProviderError::Configuration("config resolution failed".to_string()))?;
        let base_url = ZendeskClient::base_url_for_account(&account);
        debug!(%base_url, "creating API client");
        let client = ZendeskClient::new(base_url, email, token)?;
        *self
            .client
            .write()
            .map_err(|_| ProviderError::Configuration("client lock poisoned".to_string()))? =
            Some(Arc::new(client));
        info!("provider configured");
        Ok(diagnostics)
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self
            .schema()
            .resources
            .get(resource_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))?;
        Ok(validate(&schema, &config))
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let schema = self
            .schema()
            .data_sources
            .get(data_source_type)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))?;
        Ok(validate(&schema, &config))
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<serde_json::Value>,
        proposed_state: serde_json::Value,
    ) -> Result<PlanResult, ProviderError> {
        if resource_type != RESOURCE_WEBHOOK && resource_type != RESOURCE_CUSTOM_STATUS {
            return Err(ProviderError::UnknownResource(resource_type.to_string()));
        }
        // A null proposed state is a destroy plan.
        if proposed_state.is_null() {
            return Ok(PlanResult::in_place(serde_json::Value::Null));
        }

        // A category change cannot be applied in place, the status has to be
        // replaced.
        if resource_type == RESOURCE_CUSTOM_STATUS {
            if let Some(prior) = &prior_state {
                let prior = CustomStatusState::from_json(prior)?;
                let proposed = CustomStatusState::from_json(&proposed_state)?;
                if proposed.custom_status.status_category.is_known()
                    && proposed.custom_status.status_category
                        != prior.custom_status.status_category
                {
                    debug!(resource_type, "status_category changed, planning replacement");
                    return Ok(PlanResult::replacement(mark_computed_unknown(
                        resource_type,
                        proposed_state,
                    )));
                }
            }
        }

        if prior_state.is_none() {
            return Ok(PlanResult::in_place(mark_computed_unknown(
                resource_type,
                proposed_state,
            )));
        }
        Ok(PlanResult::in_place(proposed_state))
    }

    async fn create(
        &self,
        resource_type: &str,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        match resource_type {
            RESOURCE_WEBHOOK => {
                let planned = WebhookState::from_json(&planned_state)?;
                let state = self.webhook_resource()?.create(planned).await?;
                Ok(state.to_json())
            }
            RESOURCE_CUSTOM_STATUS => {
                let planned = CustomStatusState::from_json(&planned_state)?;
                let state = self.custom_status_resource()?.create(planned).await?;
                Ok(state.to_json())
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn read(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<Option<serde_json::Value>, ProviderError> {
        match resource_type {
            RESOURCE_WEBHOOK => {
                let current = WebhookState::from_json(&current_state)?;
                let state = self.webhook_resource()?.read(current).await?;
                Ok(state.map(|s| s.to_json()))
            }
            RESOURCE_CUSTOM_STATUS => {
                let current = CustomStatusState::from_json(&current_state)?;
                let state = self.custom_status_resource()?.read(current).await?;
                Ok(state.map(|s| s.to_json()))
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: serde_json::Value,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        match resource_type {
            RESOURCE_WEBHOOK => {
                let prior = WebhookState::from_json(&prior_state)?;
                let planned = WebhookState::from_json(&planned_state)?;
                let state = self.webhook_resource()?.update(planned, prior).await?;
                Ok(state.to_json())
            }
            RESOURCE_CUSTOM_STATUS => {
                let prior = CustomStatusState::from_json(&prior_state)?;
                let planned = CustomStatusState::from_json(&planned_state)?;
                let state = self
                    .custom_status_resource()?
                    .update(planned, prior)
                    .await?;
                Ok(state.to_json())
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn delete(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        match resource_type {
            RESOURCE_WEBHOOK => {
                let current = WebhookState::from_json(&current_state)?;
                self.webhook_resource()?.delete(current).await?;
                Ok(Vec::new())
            }
            RESOURCE_CUSTOM_STATUS => {
                let current = CustomStatusState::from_json(&current_state)?;
                self.custom_status_resource()?.delete(current).await
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let state = match resource_type {
            RESOURCE_WEBHOOK => self.webhook_resource()?.import(id).await?.to_json(),
            RESOURCE_CUSTOM_STATUS => {
                self.custom_status_resource()?.import(id).await?.to_json()
            }
            other => return Err(ProviderError::UnknownResource(other.to_string())),
        };
        Ok(vec![ImportedResource {
            type_name: resource_type.to_string(),
            state,
        }])
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        match data_source_type {
            DATA_SOURCE_SIGNING_SECRET => {
                let data = SigningSecretData::from_json(&config)?;
                let source = WebhookSigningSecretDataSource::new(self.client()?);
                Ok(source.read(data).await?.to_json())
            }
            other => Err(ProviderError::UnknownResource(other.to_string())),
        }
    }
}
