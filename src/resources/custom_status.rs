//! Controller for the `zendesk_custom_status` resource.
//!
//! The API has no delete for custom statuses; Delete is modeled as
//! deactivation. `status_category` is immutable after create, enforced here
//! before any API call is made.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::api::models::CustomStatusWriteEnvelope;
use crate::api::ZendeskClient;
use crate::error::ProviderError;
use crate::mapper::custom_status::{
    deactivation_request, plan_to_create_request, plan_to_update_request, response_to_state,
};
use crate::resources::ReadNotFoundPolicy;
use crate::schema::{Attribute, AttributeType, Diagnostic, Schema};
use crate::state::CustomStatusState;
use crate::value::Value;

pub struct CustomStatusResource {
    client: Arc<ZendeskClient>,
    read_not_found: ReadNotFoundPolicy,
}

impl CustomStatusResource {
    pub fn new(client: Arc<ZendeskClient>, read_not_found: ReadNotFoundPolicy) -> Self {
        Self {
            client,
            read_not_found,
        }
    }

    pub async fn create(
        &self,
        mut planned: CustomStatusState,
    ) -> Result<CustomStatusState, ProviderError> {
        let body = CustomStatusWriteEnvelope {
            custom_status: plan_to_create_request(&planned)?,
        };
        let response = self.client.create_custom_status(&body).await?;
        if response.status != 201 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let status = response
            .into_value()?
            .custom_status
            .ok_or(ProviderError::MissingIdentity("custom status"))?;
        response_to_state(&status, &mut planned)?;
        info!(custom_status_id = ?planned.custom_status_id.as_known(), "created custom status");
        Ok(planned)
    }

    pub async fn read(
        &self,
        mut state: CustomStatusState,
    ) -> Result<Option<CustomStatusState>, ProviderError> {
        let id = state.custom_status_id.clone().known_or_default();
        let response = self.client.show_custom_status(id).await?;
        if response.status == 404 && self.read_not_found == ReadNotFoundPolicy::RemoveFromState {
            warn!(custom_status_id = id, "custom status no longer exists, removing from state");
            return Ok(None);
        }
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let status = response
            .into_value()?
            .custom_status
            .ok_or(ProviderError::MissingIdentity("custom status"))?;
        response_to_state(&status, &mut state)?;
        Ok(Some(state))
    }

    pub async fn update(
        &self,
        mut planned: CustomStatusState,
        prior: CustomStatusState,
    ) -> Result<CustomStatusState, ProviderError> {
        if planned.custom_status.status_category != prior.custom_status.status_category {
            return Err(ProviderError::ImmutableField("Status Category"));
        }
        let id = prior.custom_status_id.clone().known_or_default();
        let body = CustomStatusWriteEnvelope {
            custom_status: plan_to_update_request(&planned),
        };
        let response = self.client.update_custom_status(id, &body).await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let status = response
            .into_value()?
            .custom_status
            .ok_or(ProviderError::MissingIdentity("custom status"))?;
        response_to_state(&status, &mut planned)?;
        info!(custom_status_id = id, "updated custom status");
        Ok(planned)
    }

    /// Deactivate the status. Already-inactive statuses short-circuit with a
    /// warning instead of an update call.
    pub async fn delete(
        &self,
        state: CustomStatusState,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let id = state.custom_status_id.clone().known_or_default();
        let response = self.client.show_custom_status(id).await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let current = response
            .into_value()?
            .custom_status
            .ok_or(ProviderError::MissingIdentity("custom status"))?;

        let state_active = state.custom_status.active.clone().known_or_default();
        if !state_active || current.active == Some(false) {
            warn!(custom_status_id = id, "custom status already deactivated");
            return Ok(vec![Diagnostic::warning(
                "Custom Status is already deactivated",
            )
            .with_detail(
                "Custom Statuses cannot be deleted through the API. Deleting this resource \
                 deactivates the status, and it is already inactive, so no request was sent.",
            )]);
        }

        let body = CustomStatusWriteEnvelope {
            custom_status: deactivation_request(&current),
        };
        let response = self.client.update_custom_status(id, &body).await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        info!(custom_status_id = id, "deactivated custom status");
        Ok(Vec::new())
    }

    /// Resolve an import id. Non-numeric ids fall back to a scan of all
    /// statuses by agent label.
    pub async fn import(&self, id: &str) -> Result<CustomStatusState, ProviderError> {
        let resolved = match id.parse::<i64>() {
            Ok(numeric) => numeric,
            Err(_) => {
                debug!(agent_label = %id, "import id is not numeric, matching by agent label");
                self.find_by_agent_label(id).await?
            }
        };
        if resolved == 0 {
            return Err(ProviderError::NotFound(format!(
                "No custom status with id or agent label '{}'",
                id
            )));
        }
        let mut state = CustomStatusState::default();
        state.custom_status_id = Value::Known(resolved);
        state.custom_status.id = Value::Known(resolved);
        Ok(state)
    }

    async fn find_by_agent_label(&self, label: &str) -> Result<i64, ProviderError> {
        let response = self.client.list_custom_statuses().await?;
        if response.status != 200 {
            return Err(ProviderError::Api {
                status: response.status,
                detail: response.detail(),
            });
        }
        let statuses = response.into_value()?.custom_statuses.unwrap_or_default();
        Ok(statuses
            .into_iter()
            .find(|s| s.agent_label.as_deref() == Some(label))
            .and_then(|s| s.id)
            .unwrap_or(0))
    }
}

/// Schema of the `zendesk_custom_status` resource.
pub fn schema() -> Schema {
    Schema::new(0)
        .with_description(
            "Manages a custom ticket status. Statuses cannot be deleted through the API; \
             destroying this resource deactivates the status instead.",
        )
        .with_attribute(
            Attribute::new("custom_status_id", AttributeType::Int64)
                .computed()
                .with_description("Identifier assigned by the API."),
        )
        .with_attribute(
            Attribute::new(
                "custom_status",
                AttributeType::Object(custom_status_object_types()),
            )
            .required(),
        )
}

fn custom_status_object_types() -> HashMap<String, AttributeType> {
    let mut types = HashMap::new();
    types.insert("id".to_string(), AttributeType::Int64);
    types.insert("active".to_string(), AttributeType::Bool);
    types.insert("default".to_string(), AttributeType::Bool);
    types.insert("agent_label".to_string(), AttributeType::String);
    types.insert("description".to_string(), AttributeType::String);
    types.insert("end_user_label".to_string(), AttributeType::String);
    types.insert("end_user_description".to_string(), AttributeType::String);
    types.insert("status_category".to_string(), AttributeType::String);
    types.insert("raw_agent_label".to_string(), AttributeType::String);
    types.insert("raw_description".to_string(), AttributeType::String);
    types.insert("raw_end_user_label".to_string(), AttributeType::String);
    types.insert(
        "raw_end_user_description".to_string(),
        AttributeType::String,
    );
    types.insert("created_at".to_string(), AttributeType::String);
    types.insert("updated_at".to_string(), AttributeType::String);
    types
}
