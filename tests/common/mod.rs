use serde_json::json;
use wiremock::MockServer;

use terraform_provider_zendesk::server::ProviderService;
use terraform_provider_zendesk::ZendeskProvider;

/// Basic auth for agent@example.com with token "secret", in the
/// `{email}/token` username convention.
#[allow(dead_code)]
pub const AUTH_HEADER: &str = "Basic YWdlbnRAZXhhbXBsZS5jb20vdG9rZW46c2VjcmV0";

/// Provider configured against the mock server.
pub async fn configured_provider(server: &MockServer) -> ZendeskProvider {
    let provider = ZendeskProvider::new("test");
    let diagnostics = provider
        .configure(json!({
            "account": server.uri(),
            "email": "agent@example.com",
            "token": "secret"
        }))
        .await
        .expect("configure failed");
    assert!(diagnostics.is_empty(), "unexpected diagnostics: {:?}", diagnostics);
    provider
}
