mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{configured_provider, AUTH_HEADER};
use terraform_provider_zendesk::provider::{DATA_SOURCE_SIGNING_SECRET, RESOURCE_WEBHOOK};
use terraform_provider_zendesk::resources::ReadNotFoundPolicy;
use terraform_provider_zendesk::server::ProviderService;
use terraform_provider_zendesk::{ProviderError, ZendeskProvider};

const WEBHOOK_ID: &str = "01EJFTSCC78X5V07NPY2MHR00M";

fn planned_state() -> serde_json::Value {
    json!({
        "webhook_id": { "__unknown__": true },
        "webhook": {
            "id": { "__unknown__": true },
            "name": "Example Webhook",
            "endpoint": "https://example.com/status/200",
            "http_method": "GET",
            "request_format": "json",
            "status": "active",
            "subscriptions": ["conditional_ticket_events"],
            "authentication": {
                "type": "basic_auth",
                "add_position": "header",
                "data": {
                    "username": "test_user",
                    "password": "hunter2",
                    "token": null
                }
            },
            "signing_secret": { "__unknown__": true }
        }
    })
}

fn expected_request_body() -> serde_json::Value {
    json!({
        "webhook": {
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
        }
    })
}

fn show_response() -> serde_json::Value {
    json!({
        "webhook": {
            "id": WEBHOOK_ID,
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
            "created_at": "2020-10-20T08:07:01Z",
            "created_by": "1234567890",
            "updated_at": "2020-10-20T08:07:01Z",
            "updated_by": "1234567890"
        }
    })
}

async fn mount_signing_secret(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}/signing_secret", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "signing_secret": { "algorithm": "SHA256", "secret": "some_secret_string" }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn create_fills_server_assigned_fields_and_keeps_secrets() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/webhooks"))
        .and(header("authorization", AUTH_HEADER))
        .and(body_json(expected_request_body()))
        .respond_with(ResponseTemplate::new(201).set_body_json(show_response()))
        .expect(1)
        .mount(&server)
        .await;
    mount_signing_secret(&server).await;

    let provider = configured_provider(&server).await;
    let state = provider
        .create(RESOURCE_WEBHOOK, planned_state())
        .await
        .unwrap();

    assert_eq!(state["webhook_id"], WEBHOOK_ID);
    assert_eq!(state["webhook"]["id"], WEBHOOK_ID);
    assert_eq!(state["webhook"]["created_at"], "2020-10-20T08:07:01Z");
    assert_eq!(state["webhook"]["signing_secret"]["secret"], "some_secret_string");
    // User-configured fields, secrets included, keep the plan's values.
    assert_eq!(state["webhook"]["name"], "Example Webhook");
    assert_eq!(
        state["webhook"]["authentication"]["data"]["password"],
        "hunter2"
    );
}

#[tokio::test]
async fn create_succeeds_even_when_secret_fetch_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/webhooks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(show_response()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}/signing_secret", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let state = provider
        .create(RESOURCE_WEBHOOK, planned_state())
        .await
        .unwrap();
    assert_eq!(state["webhook_id"], WEBHOOK_ID);
    // An empty object stands in for the secret the fetch could not provide.
    assert_eq!(state["webhook"]["signing_secret"]["secret"], serde_json::Value::Null);
}

#[tokio::test]
async fn create_surfaces_structured_400_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/webhooks"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "errors": [
                { "code": "InvalidValue", "title": "Invalid attribute", "detail": "endpoint must be a valid URL" }
            ]
        })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .create(RESOURCE_WEBHOOK, planned_state())
        .await
        .unwrap_err();
    match err {
        ProviderError::Api { status, detail } => {
            assert_eq!(status, 400);
            assert!(detail.contains("InvalidValue"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn read_merges_secrets_from_prior_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(show_response()))
        .mount(&server)
        .await;
    mount_signing_secret(&server).await;

    let prior = json!({
        "webhook_id": WEBHOOK_ID,
        "webhook": {
            "id": WEBHOOK_ID,
            "name": "stale name",
            "authentication": {
                "type": "basic_auth",
                "add_position": "header",
                "data": {
                    "username": "test_user",
                    "password": "hunter2",
                    "token": null
                }
            }
        }
    });

    let provider = configured_provider(&server).await;
    let state = provider
        .read(RESOURCE_WEBHOOK, prior)
        .await
        .unwrap()
        .expect("state dropped unexpectedly");

    // Refreshed from the API.
    assert_eq!(state["webhook"]["name"], "Example Webhook");
    // Merged from prior state; the API never returns the password.
    assert_eq!(
        state["webhook"]["authentication"]["data"]["password"],
        "hunter2"
    );
    assert_eq!(
        state["webhook"]["authentication"]["data"]["token"],
        serde_json::Value::Null
    );
}

#[tokio::test]
async fn read_404_is_an_error_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .read(RESOURCE_WEBHOOK, json!({ "webhook_id": WEBHOOK_ID }))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Api { status: 404, .. }));
}

#[tokio::test]
async fn read_404_drops_state_under_remove_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = ZendeskProvider::new("test")
        .with_read_not_found_policy(ReadNotFoundPolicy::RemoveFromState);
    provider
        .configure(json!({
            "account": server.uri(),
            "email": "agent@example.com",
            "token": "secret"
        }))
        .await
        .unwrap();

    let state = provider
        .read(RESOURCE_WEBHOOK, json!({ "webhook_id": WEBHOOK_ID }))
        .await
        .unwrap();
    assert!(state.is_none());
}

#[tokio::test]
async fn update_follows_204_with_a_show() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .and(body_json(expected_request_body()))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let mut refreshed = show_response();
    refreshed["webhook"]["updated_at"] = json!("2020-10-21T09:00:00Z");
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(refreshed))
        .expect(1)
        .mount(&server)
        .await;
    mount_signing_secret(&server).await;

    let mut planned = planned_state();
    planned["webhook_id"] = json!(WEBHOOK_ID);
    planned["webhook"]["id"] = json!(WEBHOOK_ID);
    let prior = json!({ "webhook_id": WEBHOOK_ID });

    let provider = configured_provider(&server).await;
    let state = provider
        .update(RESOURCE_WEBHOOK, prior, planned)
        .await
        .unwrap();
    assert_eq!(state["webhook"]["updated_at"], "2020-10-21T09:00:00Z");
    assert_eq!(
        state["webhook"]["authentication"]["data"]["password"],
        "hunter2"
    );
    assert_eq!(state["webhook"]["signing_secret"]["algorithm"], "SHA256");
}

#[tokio::test]
async fn delete_accepts_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let diagnostics = provider
        .delete(RESOURCE_WEBHOOK, json!({ "webhook_id": WEBHOOK_ID }))
        .await
        .unwrap();
    assert!(diagnostics.is_empty());
}

#[tokio::test]
async fn delete_404_reports_webhook_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/api/v2/webhooks/{}", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .delete(RESOURCE_WEBHOOK, json!({ "webhook_id": WEBHOOK_ID }))
        .await
        .unwrap_err();
    match err {
        ProviderError::NotFound(message) => assert_eq!(message, "Webhook not found"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn import_by_name_falls_back_to_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/webhooks/imported-hook"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "webhooks": [
                { "id": "other", "name": "something else" },
                { "id": WEBHOOK_ID, "name": "imported-hook" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let imported = provider
        .import_resource(RESOURCE_WEBHOOK, "imported-hook")
        .await
        .unwrap();
    assert_eq!(imported.len(), 1);
    assert_eq!(imported[0].type_name, RESOURCE_WEBHOOK);
    assert_eq!(imported[0].state["webhook_id"], WEBHOOK_ID);
    assert_eq!(imported[0].state["webhook"]["id"], WEBHOOK_ID);
}

#[tokio::test]
async fn import_of_unmatched_name_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/webhooks/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/webhooks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "webhooks": [] })))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .import_resource(RESOURCE_WEBHOOK, "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::NotFound(_)));
}

#[tokio::test]
async fn signing_secret_data_source_reads_the_secret() {
    let server = MockServer::start().await;
    mount_signing_secret(&server).await;

    let provider = configured_provider(&server).await;
    let state = provider
        .read_data_source(
            DATA_SOURCE_SIGNING_SECRET,
            json!({ "webhook_id": WEBHOOK_ID }),
        )
        .await
        .unwrap();
    assert_eq!(state["webhook_id"], WEBHOOK_ID);
    assert_eq!(state["signing_secret"]["algorithm"], "SHA256");
    assert_eq!(state["signing_secret"]["secret"], "some_secret_string");
}

#[tokio::test]
async fn signing_secret_data_source_propagates_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/v2/webhooks/{}/signing_secret", WEBHOOK_ID)))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let provider = configured_provider(&server).await;
    let err = provider
        .read_data_source(
            DATA_SOURCE_SIGNING_SECRET,
            json!({ "webhook_id": WEBHOOK_ID }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Api { status: 403, .. }));
}
