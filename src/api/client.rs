//! Thin HTTP client for the Zendesk REST API.
//!
//! The client performs no retries and no response interpretation beyond
//! decoding: every call returns the status code, the raw body, and the
//! decoded payload when one was present. Deciding which status codes are
//! acceptable for an operation is the resource controllers' job.

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::api::models::{
    ApiErrorList, CustomStatusEnvelope, CustomStatusListEnvelope, CustomStatusWriteEnvelope,
    SigningSecretEnvelope, WebhookEnvelope, WebhookListEnvelope, WebhookWriteEnvelope,
};
use crate::error::ProviderError;

/// Decoded API response. `value` is present only when the status code was a
/// success and the body decoded as `T`; `errors` only when the API attached
/// a structured error list.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: String,
    pub value: Option<T>,
    pub errors: Option<ApiErrorList>,
}

impl<T> ApiResponse<T> {
    /// Status code plus raw body, for diagnostics about unexpected responses.
    pub fn detail(&self) -> String {
        if let Some(errors) = &self.errors {
            if let Ok(encoded) = serde_json::to_string(errors) {
                return format!("Code: {}, Errors: {}", self.status, encoded);
            }
        }
        format!("Code: {}, Body: {}", self.status, self.body)
    }

    /// The decoded payload, or an API error built from the raw response.
    pub fn into_value(self) -> Result<T, ProviderError> {
        let detail = self.detail();
        self.value.ok_or(ProviderError::Api {
            status: self.status,
            detail,
        })
    }
}

/// Client for one configured Zendesk instance.
#[derive(Debug)]
pub struct ZendeskClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    token: String,
}

impl ZendeskClient {
    /// Build a client from the resolved provider configuration.
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            email: email.into(),
            token: token.into(),
        })
    }

    /// Resolve the account setting to a base URL.
    ///
    /// Accounts that are already URLs are used verbatim, which is how test
    /// harnesses point the provider at a local server. Anything else is a
    /// subdomain of zendesk.com.
    pub fn base_url_for_account(account: &str) -> String {
        if account.starts_with("http://") || account.starts_with("https://") {
            account.to_string()
        } else {
            format!("https://{}.zendesk.com", account)
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Token-based Basic auth: username is `{email}/token`, password is the
    /// API token.
    fn authenticated(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.basic_auth(format!("{}/token", self.email), Some(&self.token))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<ApiResponse<T>, ProviderError> {
        let response = self.authenticated(builder).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(status, body_len = body.len(), "api response");

        let value = if (200..300).contains(&status) && !body.is_empty() {
            serde_json::from_str(&body).ok()
        } else {
            None
        };
        let errors = if status == 400 {
            serde_json::from_str(&body).ok()
        } else {
            None
        };
        Ok(ApiResponse {
            status,
            body,
            value,
            errors,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ProviderError> {
        self.send(self.http.get(self.url(path))).await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ProviderError> {
        self.send(self.http.post(self.url(path)).json(body)).await
    }

    async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<ApiResponse<T>, ProviderError> {
        self.send(self.http.put(self.url(path)).json(body)).await
    }

    // Webhooks.

    pub async fn show_webhook(&self, id: &str) -> Result<ApiResponse<WebhookEnvelope>, ProviderError> {
        self.get(&format!("/api/v2/webhooks/{}", id)).await
    }

    pub async fn list_webhooks(&self) -> Result<ApiResponse<WebhookListEnvelope>, ProviderError> {
        self.get("/api/v2/webhooks").await
    }

    pub async fn create_webhook(
        &self,
        body: &WebhookWriteEnvelope,
    ) -> Result<ApiResponse<WebhookEnvelope>, ProviderError> {
        self.post("/api/v2/webhooks", body).await
    }

    /// Update answers 204 with an empty body on success.
    pub async fn update_webhook(
        &self,
        id: &str,
        body: &WebhookWriteEnvelope,
    ) -> Result<ApiResponse<WebhookEnvelope>, ProviderError> {
        self.put(&format!("/api/v2/webhooks/{}", id), body).await
    }

    pub async fn delete_webhook(
        &self,
        id: &str,
    ) -> Result<ApiResponse<WebhookEnvelope>, ProviderError> {
        self.send(self.http.delete(self.url(&format!("/api/v2/webhooks/{}", id))))
            .await
    }

    pub async fn show_webhook_signing_secret(
        &self,
        id: &str,
    ) -> Result<ApiResponse<SigningSecretEnvelope>, ProviderError> {
        self.get(&format!("/api/v2/webhooks/{}/signing_secret", id))
            .await
    }

    // Custom ticket statuses. The API has no delete; statuses are
    // deactivated through update.

    pub async fn show_custom_status(
        &self,
        id: i64,
    ) -> Result<ApiResponse<CustomStatusEnvelope>, ProviderError> {
        self.get(&format!("/api/v2/custom_statuses/{}", id)).await
    }

    pub async fn list_custom_statuses(
        &self,
    ) -> Result<ApiResponse<CustomStatusListEnvelope>, ProviderError> {
        self.get("/api/v2/custom_statuses").await
    }

    pub async fn create_custom_status(
        &self,
        body: &CustomStatusWriteEnvelope,
    ) -> Result<ApiResponse<CustomStatusEnvelope>, ProviderError> {
        self.post("/api/v2/custom_statuses", body).await
    }

    pub async fn update_custom_status(
        &self,
        id: i64,
        body: &CustomStatusWriteEnvelope,
    ) -> Result<ApiResponse<CustomStatusEnvelope>, ProviderError> {
        self.put(&format!("/api/v2/custom_statuses/{}", id), body)
            .await
    }
}
