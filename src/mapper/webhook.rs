//! Webhook state mapping.
//!
//! The API never returns the auth secrets (`password`, `token`), so mapping
//! a read response into state is a merge, not a copy: secrets are carried
//! forward from prior state for as long as the response says they are still
//! in effect, and invalidated the moment it says otherwise.

use crate::api::models::{
    Authentication, AuthenticationData, AuthenticationDataRead, ExternalSource,
    ExternalSourceData, SigningSecret, Webhook, WebhookWrite,
};
use crate::error::ProviderError;
use crate::state::{
    AuthenticationDataState, AuthenticationState, ExternalSourceDataState, ExternalSourceState,
    SigningSecretState, WebhookState,
};
use crate::value::Value;

/// Map a Show response into state, replacing every attribute.
///
/// Absent response fields become Null. `authentication` is the exception:
/// its secret fields merge with the prior state via [`merge_auth_data`].
pub fn show_response_to_state(
    webhook: &Webhook,
    state: &mut WebhookState,
) -> Result<(), ProviderError> {
    let id = webhook
        .id
        .clone()
        .ok_or(ProviderError::MissingIdentity("webhook"))?;

    state.webhook.authentication = match &webhook.authentication {
        None => Value::Null,
        Some(auth) => {
            let prior = state
                .webhook
                .authentication
                .as_known()
                .cloned()
                .unwrap_or_default();
            Value::Known(AuthenticationState {
                auth_type: Value::from(auth.auth_type.clone()),
                add_position: Value::from(auth.add_position.clone()),
                data: merge_auth_data(auth.data.as_ref(), &prior.data),
            })
        }
    };

    state.webhook_id = Value::Known(id.clone());
    state.webhook.id = Value::Known(id);
    state.webhook.name = Value::from(webhook.name.clone());
    state.webhook.endpoint = Value::from(webhook.endpoint.clone());
    state.webhook.http_method = Value::from(webhook.http_method.clone());
    state.webhook.request_format = Value::from(webhook.request_format.clone());
    state.webhook.status = Value::from(webhook.status.clone());
    state.webhook.description = Value::from(webhook.description.clone());
    state.webhook.custom_headers = Value::from(webhook.custom_headers.clone());
    state.webhook.subscriptions = Value::from(webhook.subscriptions.clone());
    state.webhook.external_source = external_source_to_state(webhook.external_source.as_ref());
    state.webhook.signing_secret = signing_secret_to_state(webhook.signing_secret.as_ref());
    state.webhook.created_at = Value::from(webhook.created_at.clone());
    state.webhook.created_by = Value::from(webhook.created_by.clone());
    state.webhook.updated_at = Value::from(webhook.updated_at.clone());
    state.webhook.updated_by = Value::from(webhook.updated_by.clone());
    Ok(())
}

/// Refresh state after a Create or Update.
///
/// Only server-assigned fields are taken from the response: id, audit
/// fields, `external_source` and `signing_secret`. Everything the user
/// configured keeps the plan's values, so secrets are untouched. Absent
/// server fields become Null.
pub fn write_response_to_state(
    webhook: &Webhook,
    state: &mut WebhookState,
) -> Result<(), ProviderError> {
    let id = webhook
        .id
        .clone()
        .ok_or(ProviderError::MissingIdentity("webhook"))?;
    state.webhook_id = Value::Known(id.clone());
    state.webhook.id = Value::Known(id);
    state.webhook.created_at = Value::from(webhook.created_at.clone());
    state.webhook.created_by = Value::from(webhook.created_by.clone());
    state.webhook.updated_at = Value::from(webhook.updated_at.clone());
    state.webhook.updated_by = Value::from(webhook.updated_by.clone());
    state.webhook.external_source = external_source_to_state(webhook.external_source.as_ref());
    state.webhook.signing_secret = signing_secret_to_state(webhook.signing_secret.as_ref());
    Ok(())
}

/// Merge the response's auth data with the prior state's secrets.
///
/// The response carries at most a `username`; `password` and `token` exist
/// only in state. The rule:
/// - no data object in the response: prior data is kept verbatim;
/// - `username` absent: basic auth is gone. A prior `token` survives
///   (token auth does not use a username), everything else becomes Null;
/// - `username` present: basic auth is in effect. Keep the prior
///   `password`, take the username from the response, and null out `token`.
pub(crate) fn merge_auth_data(
    response: Option<&AuthenticationDataRead>,
    prior: &Value<AuthenticationDataState>,
) -> Value<AuthenticationDataState> {
    let Some(data) = response else {
        return prior.clone();
    };
    let old = prior.as_known().cloned().unwrap_or_default();
    match &data.username {
        None => {
            if old.token.is_null() {
                Value::Known(AuthenticationDataState::default())
            } else {
                Value::Known(AuthenticationDataState {
                    username: Value::Null,
                    password: Value::Null,
                    token: old.token,
                })
            }
        }
        Some(username) => Value::Known(AuthenticationDataState {
            username: Value::Known(username.clone()),
            password: old.password,
            token: Value::Null,
        }),
    }
}

/// Build the request body for Create and Update.
///
/// Both operations share this mapping: required scalars are extracted
/// value-or-empty, optional fields and containers are omitted when Null or
/// Unknown. Unknown can never reach the wire because the only bridge out of
/// a [`Value`] here is `into_option`.
pub fn plan_to_request_body(state: &WebhookState) -> WebhookWrite {
    let body = &state.webhook;
    WebhookWrite {
        name: body.name.clone().known_or_default(),
        endpoint: body.endpoint.clone().known_or_default(),
        http_method: body.http_method.clone().known_or_default(),
        request_format: body.request_format.clone().known_or_default(),
        status: body.status.clone().known_or_default(),
        description: body.description.clone().into_option(),
        custom_headers: body.custom_headers.clone().into_option(),
        subscriptions: body.subscriptions.clone().into_option(),
        authentication: body.authentication.as_known().map(|auth| Authentication {
            auth_type: auth.auth_type.clone().known_or_default(),
            add_position: auth.add_position.clone().known_or_default(),
            data: auth
                .data
                .as_known()
                .map(|data| AuthenticationData {
                    username: data.username.clone().into_option(),
                    password: data.password.clone().into_option(),
                    token: data.token.clone().into_option(),
                })
                .unwrap_or_default(),
        }),
        external_source: body.external_source.as_known().map(|source| ExternalSource {
            source_type: source.source_type.clone().into_option(),
            data: source.data.as_known().map(|data| ExternalSourceData {
                app_id: data.app_id.clone().into_option(),
                installation_id: data.installation_id.clone().into_option(),
            }),
        }),
        signing_secret: body.signing_secret.as_known().map(|secret| SigningSecret {
            algorithm: secret.algorithm.clone().into_option(),
            secret: secret.secret.clone().into_option(),
        }),
    }
}

fn external_source_to_state(source: Option<&ExternalSource>) -> Value<ExternalSourceState> {
    match source {
        None => Value::Null,
        Some(source) => Value::Known(ExternalSourceState {
            source_type: Value::from(source.source_type.clone()),
            data: match &source.data {
                None => Value::Null,
                Some(data) => Value::Known(ExternalSourceDataState {
                    app_id: Value::from(data.app_id.clone()),
                    installation_id: Value::from(data.installation_id.clone()),
                }),
            },
        }),
    }
}

fn signing_secret_to_state(secret: Option<&SigningSecret>) -> Value<SigningSecretState> {
    match secret {
        None => Value::Null,
        Some(secret) => Value::Known(SigningSecretState {
            algorithm: Value::from(secret.algorithm.clone()),
            secret: Value::from(secret.secret.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::AuthenticationRead;
    use crate::state::WebhookBody;
    use std::collections::BTreeMap;

    fn show_response() -> Webhook {
        serde_json::from_value(serde_json::json!({
            "id": "01EJFTSCC78X5V07NPY2MHR00M",
            "name": "Example Webhook",
            "endpoint": "https://example.com/status/200",
            "http_method": "GET",
            "request_format": "json",
            "status": "active",
            "subscriptions": ["conditional_ticket_events"],
            "authentication": {
                "type": "basic_auth",
                "add_position": "header",
                "data": { "username": "test_user" }
            },
            "signing_secret": { "algorithm": "SHA256", "secret": "some_secret_string" },
            "created_at": "2020-10-20T08:07:01Z",
            "created_by": "1234567890",
            "updated_at": "2020-10-20T08:07:01Z",
            "updated_by": "1234567890"
        }))
        .unwrap()
    }

    fn prior_state_with_secrets() -> WebhookState {
        WebhookState {
            webhook_id: Value::Known("01EJFTSCC78X5V07NPY2MHR00M".to_string()),
            webhook: WebhookBody {
                id: Value::Known("01EJFTSCC78X5V07NPY2MHR00M".to_string()),
                name: Value::Known("Example Webhook".to_string()),
                endpoint: Value::Known("https://example.com/status/200".to_string()),
                http_method: Value::Known("GET".to_string()),
                request_format: Value::Known("json".to_string()),
                status: Value::Known("active".to_string()),
                subscriptions: Value::Known(vec!["conditional_ticket_events".to_string()]),
                authentication: Value::Known(AuthenticationState {
                    auth_type: Value::Known("basic_auth".to_string()),
                    add_position: Value::Known("header".to_string()),
                    data: Value::Known(AuthenticationDataState {
                        username: Value::Known("test_user".to_string()),
                        password: Value::Known("hunter2".to_string()),
                        token: Value::Null,
                    }),
                }),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_show_preserves_password_and_nulls_token() {
        let mut state = prior_state_with_secrets();
        show_response_to_state(&show_response(), &mut state).unwrap();
        let auth = state.webhook.authentication.as_known().unwrap();
        let data = auth.data.as_known().unwrap();
        assert_eq!(data.username, Value::Known("test_user".to_string()));
        assert_eq!(data.password, Value::Known("hunter2".to_string()));
        assert_eq!(data.token, Value::Null);
    }

    #[test]
    fn test_show_invalidates_secrets_when_username_gone() {
        let mut state = prior_state_with_secrets();
        let mut response = show_response();
        response.authentication = Some(AuthenticationRead {
            auth_type: Some("api_header".to_string()),
            add_position: Some("header".to_string()),
            data: Some(AuthenticationDataRead { username: None }),
        });
        show_response_to_state(&response, &mut state).unwrap();
        let auth = state.webhook.authentication.as_known().unwrap();
        let data = auth.data.as_known().unwrap();
        assert_eq!(data.username, Value::Null);
        assert_eq!(data.password, Value::Null);
        assert_eq!(data.token, Value::Null);
    }

    #[test]
    fn test_show_keeps_token_when_username_gone_but_token_known() {
        let mut state = prior_state_with_secrets();
        if let Value::Known(auth) = &mut state.webhook.authentication {
            auth.data = Value::Known(AuthenticationDataState {
                username: Value::Null,
                password: Value::Null,
                token: Value::Known("bearer-123".to_string()),
            });
        }
        let mut response = show_response();
        response.authentication = Some(AuthenticationRead {
            auth_type: Some("bearer_token".to_string()),
            add_position: Some("header".to_string()),
            data: Some(AuthenticationDataRead { username: None }),
        });
        show_response_to_state(&response, &mut state).unwrap();
        let auth = state.webhook.authentication.as_known().unwrap();
        let data = auth.data.as_known().unwrap();
        assert_eq!(data.token, Value::Known("bearer-123".to_string()));
        assert_eq!(data.username, Value::Null);
        assert_eq!(data.password, Value::Null);
    }

    #[test]
    fn test_show_keeps_prior_data_when_response_has_no_data_object() {
        let mut state = prior_state_with_secrets();
        let mut response = show_response();
        response.authentication = Some(AuthenticationRead {
            auth_type: Some("basic_auth".to_string()),
            add_position: Some("header".to_string()),
            data: None,
        });
        show_response_to_state(&response, &mut state).unwrap();
        let auth = state.webhook.authentication.as_known().unwrap();
        let data = auth.data.as_known().unwrap();
        assert_eq!(data.username, Value::Known("test_user".to_string()));
        assert_eq!(data.password, Value::Known("hunter2".to_string()));
    }

    #[test]
    fn test_show_absent_auth_block_becomes_null() {
        let mut state = prior_state_with_secrets();
        let mut response = show_response();
        response.authentication = None;
        show_response_to_state(&response, &mut state).unwrap();
        assert!(state.webhook.authentication.is_null());
    }

    #[test]
    fn test_show_null_custom_headers_stay_null() {
        let mut state = prior_state_with_secrets();
        state.webhook.custom_headers =
            Value::Known(BTreeMap::from([("x-old".to_string(), "1".to_string())]));
        let response = show_response();
        assert!(response.custom_headers.is_none());
        show_response_to_state(&response, &mut state).unwrap();
        assert!(state.webhook.custom_headers.is_null());
    }

    #[test]
    fn test_show_external_source_without_data_maps_to_null_data() {
        let mut state = prior_state_with_secrets();
        let mut response = show_response();
        response.external_source = serde_json::from_value(serde_json::json!({
            "type": "zendesk_app"
        }))
        .ok();
        show_response_to_state(&response, &mut state).unwrap();
        let source = state.webhook.external_source.as_known().unwrap();
        assert_eq!(source.source_type, Value::Known("zendesk_app".to_string()));
        assert!(source.data.is_null());

        // And it never round-trips back into the request body as an empty
        // object.
        let json = serde_json::to_value(plan_to_request_body(&state)).unwrap();
        let source = json["external_source"].as_object().unwrap();
        assert!(!source.contains_key("data"));
    }

    #[test]
    fn test_show_missing_id_is_missing_identity() {
        let mut state = WebhookState::default();
        let mut response = show_response();
        response.id = None;
        let err = show_response_to_state(&response, &mut state).unwrap_err();
        assert!(matches!(err, ProviderError::MissingIdentity("webhook")));
    }

    #[test]
    fn test_show_round_trips_non_secret_fields() {
        let mut state = prior_state_with_secrets();
        show_response_to_state(&show_response(), &mut state).unwrap();
        let body = plan_to_request_body(&state);
        assert_eq!(body.name, "Example Webhook");
        assert_eq!(body.endpoint, "https://example.com/status/200");
        assert_eq!(body.http_method, "GET");
        assert_eq!(body.request_format, "json");
        assert_eq!(body.status, "active");
        assert_eq!(
            body.subscriptions,
            Some(vec!["conditional_ticket_events".to_string()])
        );
        let auth = body.authentication.unwrap();
        assert_eq!(auth.auth_type, "basic_auth");
        assert_eq!(auth.add_position, "header");
        assert_eq!(auth.data.username.as_deref(), Some("test_user"));
    }

    #[test]
    fn test_write_refresh_touches_only_server_assigned_fields() {
        let mut state = prior_state_with_secrets();
        state.webhook.signing_secret = Value::Unknown;
        let response: Webhook = serde_json::from_value(serde_json::json!({
            "id": "01EJFTSCC78X5V07NPY2MHR00M",
            "name": "server-renamed",
            "created_at": "2020-10-20T08:07:01Z",
            "created_by": "1234567890",
            "updated_at": "2020-10-21T09:00:00Z",
            "updated_by": "1234567890",
            "signing_secret": { "algorithm": "SHA256", "secret": "some_secret_string" }
        }))
        .unwrap();
        write_response_to_state(&response, &mut state).unwrap();

        // User-configured fields keep the plan's values.
        assert_eq!(state.webhook.name, Value::Known("Example Webhook".to_string()));
        let data = state
            .webhook
            .authentication
            .as_known()
            .unwrap()
            .data
            .as_known()
            .unwrap()
            .clone();
        assert_eq!(data.password, Value::Known("hunter2".to_string()));

        // Server-assigned fields are refreshed; absent ones become Null.
        assert_eq!(
            state.webhook.updated_at,
            Value::Known("2020-10-21T09:00:00Z".to_string())
        );
        assert!(state.webhook.external_source.is_null());
        let secret = state.webhook.signing_secret.as_known().unwrap();
        assert_eq!(secret.algorithm, Value::Known("SHA256".to_string()));
        assert_eq!(secret.secret, Value::Known("some_secret_string".to_string()));
    }

    #[test]
    fn test_request_body_omits_null_and_unknown_containers() {
        let mut state = prior_state_with_secrets();
        state.webhook.custom_headers = Value::Null;
        state.webhook.subscriptions = Value::Unknown;
        state.webhook.external_source = Value::Null;
        state.webhook.signing_secret = Value::Unknown;
        state.webhook.description = Value::Null;
        let body = plan_to_request_body(&state);
        assert!(body.custom_headers.is_none());
        assert!(body.subscriptions.is_none());
        assert!(body.external_source.is_none());
        assert!(body.signing_secret.is_none());
        assert!(body.description.is_none());

        let json = serde_json::to_value(&body).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("custom_headers"));
        assert!(!obj.contains_key("subscriptions"));
        assert!(!obj.contains_key("external_source"));
        assert!(!obj.contains_key("signing_secret"));
        assert!(!obj.contains_key("description"));
        assert!(!obj.contains_key("id"));
        assert!(!obj.contains_key("created_at"));
    }

    #[test]
    fn test_request_body_serialization_matches_wire_format() {
        let state = prior_state_with_secrets();
        let json = serde_json::to_value(plan_to_request_body(&state)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Example Webhook",
                "endpoint": "https://example.com/status/200",
                "http_method": "GET",
                "request_format": "json",
                "status": "active",
                "subscriptions": ["conditional_ticket_events"],
                "authentication": {
                    "type": "basic_auth",
                    "add_position": "header",
                    "data": { "username": "test_user", "password": "hunter2" }
                }
            })
        );
    }

    #[test]
    fn test_auth_with_null_data_serializes_empty_data_object() {
        let mut state = prior_state_with_secrets();
        if let Value::Known(auth) = &mut state.webhook.authentication {
            auth.data = Value::Null;
        }
        let json = serde_json::to_value(plan_to_request_body(&state)).unwrap();
        assert_eq!(json["authentication"]["data"], serde_json::json!({}));
    }
}
