//! Custom ticket status state mapping.

use crate::api::models::{CustomStatus, CustomStatusWrite};
use crate::error::ProviderError;
use crate::state::CustomStatusState;
use crate::value::Value;

/// The closed set of categories a custom status can belong to.
pub const STATUS_CATEGORIES: [&str; 5] = ["new", "open", "pending", "hold", "solved"];

/// Map an API response into state, replacing every attribute.
pub fn response_to_state(
    status: &CustomStatus,
    state: &mut CustomStatusState,
) -> Result<(), ProviderError> {
    let id = status
        .id
        .ok_or(ProviderError::MissingIdentity("custom status"))?;
    state.custom_status_id = Value::Known(id);
    state.custom_status.id = Value::Known(id);
    state.custom_status.active = Value::from(status.active);
    state.custom_status.default_status = Value::from(status.default);
    state.custom_status.agent_label = Value::from(status.agent_label.clone());
    state.custom_status.description = Value::from(status.description.clone());
    state.custom_status.end_user_label = Value::from(status.end_user_label.clone());
    state.custom_status.end_user_description = Value::from(status.end_user_description.clone());
    state.custom_status.status_category = Value::from(status.status_category.clone());
    state.custom_status.raw_agent_label = Value::from(status.raw_agent_label.clone());
    state.custom_status.raw_description = Value::from(status.raw_description.clone());
    state.custom_status.raw_end_user_label = Value::from(status.raw_end_user_label.clone());
    state.custom_status.raw_end_user_description =
        Value::from(status.raw_end_user_description.clone());
    state.custom_status.created_at = Value::from(status.created_at.clone());
    state.custom_status.updated_at = Value::from(status.updated_at.clone());
    Ok(())
}

/// Build the create request. `status_category` is required here and must be
/// one of the closed set; it is never sent again after create.
pub fn plan_to_create_request(
    state: &CustomStatusState,
) -> Result<CustomStatusWrite, ProviderError> {
    let category = state
        .custom_status
        .status_category
        .clone()
        .known_or_default();
    validate_status_category(&category)?;
    Ok(CustomStatusWrite {
        active: Some(planned_active(state)),
        agent_label: state.custom_status.agent_label.clone().into_option(),
        status_category: Some(category),
        description: state.custom_status.description.clone().into_option(),
        end_user_label: state.custom_status.end_user_label.clone().into_option(),
        end_user_description: state
            .custom_status
            .end_user_description
            .clone()
            .into_option(),
    })
}

/// Build the update request. The category is immutable and omitted.
pub fn plan_to_update_request(state: &CustomStatusState) -> CustomStatusWrite {
    CustomStatusWrite {
        active: Some(planned_active(state)),
        agent_label: state.custom_status.agent_label.clone().into_option(),
        status_category: None,
        description: state.custom_status.description.clone().into_option(),
        end_user_label: state.custom_status.end_user_label.clone().into_option(),
        end_user_description: state
            .custom_status
            .end_user_description
            .clone()
            .into_option(),
    }
}

/// Build the deactivation update sent on delete, keeping the server's
/// current labels so nothing but `active` changes.
pub fn deactivation_request(current: &CustomStatus) -> CustomStatusWrite {
    CustomStatusWrite {
        active: Some(false),
        agent_label: current.agent_label.clone(),
        status_category: None,
        description: current.description.clone(),
        end_user_label: current.end_user_label.clone(),
        end_user_description: current.end_user_description.clone(),
    }
}

pub fn validate_status_category(category: &str) -> Result<(), ProviderError> {
    if STATUS_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        Err(ProviderError::Validation(format!(
            "status_category must be one of {}, got '{}'",
            STATUS_CATEGORIES.join(", "),
            category
        )))
    }
}

// A plan that has not resolved `active` yet means a fresh create, which the
// API treats as active.
fn planned_active(state: &CustomStatusState) -> bool {
    match state.custom_status.active {
        Value::Known(active) => active,
        Value::Unknown => true,
        Value::Null => false,
    }
}
