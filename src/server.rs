//! Plugin server.
//!
//! The host launches the provider as a subprocess. The provider binds an
//! ephemeral local TCP port, prints a single handshake line on stdout
//! (`ZENDESK_PROVIDER|1|<addr>`), then serves newline-delimited JSON frames
//! on that socket until it is told to stop or receives SIGTERM/SIGINT.
//! Stdout carries nothing but the handshake; all logging goes to stderr.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::types::{ImportedResource, PlanResult, ProviderMetadata, HANDSHAKE_PREFIX, PROTOCOL_VERSION};

/// The operations a provider implementation answers.
///
/// State values cross this trait as protocol JSON (dynamic attribute maps
/// with the unknown sentinel); implementations convert to their typed models
/// internally.
#[async_trait]
pub trait ProviderService: Send + Sync + 'static {
    /// Full schema surface of the provider.
    fn schema(&self) -> ProviderSchema;

    /// Identity and capabilities.
    fn metadata(&self) -> ProviderMetadata;

    async fn validate_provider_config(
        &self,
        _config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(Vec::new())
    }

    /// Resolve configuration and construct the API client. Called once
    /// before any resource operation.
    async fn configure(&self, config: serde_json::Value)
        -> Result<Vec<Diagnostic>, ProviderError>;

    async fn validate_resource_config(
        &self,
        _resource_type: &str,
        _config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(Vec::new())
    }

    async fn validate_data_source_config(
        &self,
        _data_source_type: &str,
        _config: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(Vec::new())
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<serde_json::Value>,
        proposed_state: serde_json::Value,
    ) -> Result<PlanResult, ProviderError>;

    async fn create(
        &self,
        resource_type: &str,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// `Ok(None)` drops the resource from state.
    async fn read(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<Option<serde_json::Value>, ProviderError>;

    async fn update(
        &self,
        resource_type: &str,
        prior_state: serde_json::Value,
        planned_state: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Warnings (for deletes modeled as something weaker than a delete) come
    /// back as diagnostics.
    async fn delete(
        &self,
        resource_type: &str,
        current_state: serde_json::Value,
    ) -> Result<Vec<Diagnostic>, ProviderError>;

    async fn import_resource(
        &self,
        resource_type: &str,
        _id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        Err(ProviderError::Validation(format!(
            "resource type '{}' does not support import",
            resource_type
        )))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        _config: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        Err(ProviderError::UnknownResource(data_source_type.to_string()))
    }

    /// Last call before shutdown.
    async fn stop(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// One request frame.
#[derive(Debug, Deserialize)]
pub struct Request {
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// One response frame. Errors travel as diagnostics, never as a broken
/// connection.
#[derive(Debug, Serialize)]
pub struct Response {
    pub id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Response {
    fn ok(id: u64, result: serde_json::Value) -> Self {
        Self {
            id,
            result: Some(result),
            diagnostics: Vec::new(),
        }
    }

    fn diagnostics(id: u64, diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            id,
            result: None,
            diagnostics,
        }
    }
}

/// Map a provider error to the diagnostic sent over the wire.
pub fn error_to_diagnostic(error: &ProviderError) -> Diagnostic {
    let diagnostic = Diagnostic::error(error.summary()).with_detail(error.to_string());
    match error {
        ProviderError::MissingAttribute(attribute)
        | ProviderError::UnexpectedAttribute(attribute) => {
            diagnostic.with_attribute(attribute.clone())
        }
        ProviderError::TypeMismatch { attribute, .. } => {
            diagnostic.with_attribute(attribute.clone())
        }
        _ => diagnostic,
    }
}

/// Server options.
#[derive(Debug, Clone)]
pub struct ServeOptions {
    /// How long to wait for the provider's stop hook after a shutdown
    /// signal.
    pub shutdown_timeout: Duration,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

/// Bind an ephemeral local port, print the handshake, serve until shutdown.
pub async fn serve<P: ProviderService>(provider: P) -> Result<(), ProviderError> {
    serve_with_options(provider, ServeOptions::default()).await
}

pub async fn serve_with_options<P: ProviderService>(
    provider: P,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    // The handshake is the only line ever written to stdout.
    println!("{}|{}|{}", HANDSHAKE_PREFIX, PROTOCOL_VERSION, addr);
    serve_on(provider, listener, options).await
}

/// Serve on an already-bound listener. Split out so tests can connect
/// without a handshake on stdout.
pub async fn serve_on<P: ProviderService>(
    provider: P,
    listener: TcpListener,
    options: ServeOptions,
) -> Result<(), ProviderError> {
    let provider = Arc::new(provider);
    info!(addr = %listener.local_addr()?, "provider server listening");

    let shutdown = wait_for_shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        debug!(%peer, "connection accepted");
                        tokio::spawn(handle_connection(Arc::clone(&provider), stream));
                    }
                    Err(err) => {
                        error!(error = %err, "accept failed");
                    }
                }
            }
        }
    }

    match tokio::time::timeout(options.shutdown_timeout, provider.stop()).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "stop hook failed"),
        Err(_) => warn!(
            timeout_secs = options.shutdown_timeout.as_secs(),
            "stop hook timed out"
        ),
    }
    Ok(())
}

async fn handle_connection<P: ProviderService>(provider: Arc<P>, stream: TcpStream) {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(err) => {
                warn!(error = %err, "connection read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => handle_request(provider.as_ref(), request).await,
            Err(err) => Response::diagnostics(
                0,
                vec![Diagnostic::error("Malformed request").with_detail(err.to_string())],
            ),
        };
        let mut encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(err) => {
                error!(error = %err, "response encoding failed");
                continue;
            }
        };
        encoded.push('\n');
        if writer.write_all(encoded.as_bytes()).await.is_err() {
            break;
        }
    }
}

/// Dispatch one request frame.
pub async fn handle_request<P: ProviderService>(provider: &P, request: Request) -> Response {
    let id = request.id;
    debug!(id, method = %request.method, "dispatching request");
    let params = request.params;
    let outcome: Result<Response, ProviderError> = match request.method.as_str() {
        "get_metadata" => serde_json::to_value(provider.metadata())
            .map(|v| Response::ok(id, v))
            .map_err(Into::into),
        "get_schema" => serde_json::to_value(provider.schema())
            .map(|v| Response::ok(id, v))
            .map_err(Into::into),
        "validate_provider_config" => provider
            .validate_provider_config(param(&params, "config"))
            .await
            .map(|diags| Response::diagnostics(id, diags)),
        "configure" => provider
            .configure(param(&params, "config"))
            .await
            .map(|diags| Response::diagnostics(id, diags)),
        "validate_resource_config" => match param_str(&params, "resource_type") {
            Ok(resource_type) => provider
                .validate_resource_config(&resource_type, param(&params, "config"))
                .await
                .map(|diags| Response::diagnostics(id, diags)),
            Err(err) => Err(err),
        },
        "validate_data_source_config" => match param_str(&params, "data_source_type") {
            Ok(data_source_type) => provider
                .validate_data_source_config(&data_source_type, param(&params, "config"))
                .await
                .map(|diags| Response::diagnostics(id, diags)),
            Err(err) => Err(err),
        },
        "plan" => match param_str(&params, "resource_type") {
            Ok(resource_type) => {
                let prior = params
                    .get("prior_state")
                    .filter(|v| !v.is_null())
                    .cloned();
                provider
                    .plan(&resource_type, prior, param(&params, "proposed_state"))
                    .await
                    .and_then(|plan| Ok(Response::ok(id, serde_json::to_value(plan)?)))
            }
            Err(err) => Err(err),
        },
        "create" => match param_str(&params, "resource_type") {
            Ok(resource_type) => provider
                .create(&resource_type, param(&params, "planned_state"))
                .await
                .map(|state| Response::ok(id, serde_json::json!({ "state": state }))),
            Err(err) => Err(err),
        },
        "read" => match param_str(&params, "resource_type") {
            Ok(resource_type) => provider
                .read(&resource_type, param(&params, "current_state"))
                .await
                .map(|state| Response::ok(id, serde_json::json!({ "state": state }))),
            Err(err) => Err(err),
        },
        "update" => match param_str(&params, "resource_type") {
            Ok(resource_type) => provider
                .update(
                    &resource_type,
                    param(&params, "prior_state"),
                    param(&params, "planned_state"),
                )
                .await
                .map(|state| Response::ok(id, serde_json::json!({ "state": state }))),
            Err(err) => Err(err),
        },
        "delete" => match param_str(&params, "resource_type") {
            Ok(resource_type) => provider
                .delete(&resource_type, param(&params, "current_state"))
                .await
                .map(|diags| Response::diagnostics(id, diags)),
            Err(err) => Err(err),
        },
        "import" => match (param_str(&params, "resource_type"), param_str(&params, "id")) {
            (Ok(resource_type), Ok(import_id)) => provider
                .import_resource(&resource_type, &import_id)
                .await
                .and_then(|imported| {
                    Ok(Response::ok(
                        id,
                        serde_json::json!({ "imported": serde_json::to_value(imported)? }),
                    ))
                }),
            (Err(err), _) | (_, Err(err)) => Err(err),
        },
        "read_data_source" => match param_str(&params, "data_source_type") {
            Ok(data_source_type) => provider
                .read_data_source(&data_source_type, param(&params, "config"))
                .await
                .map(|state| Response::ok(id, serde_json::json!({ "state": state }))),
            Err(err) => Err(err),
        },
        "stop" => provider
            .stop()
            .await
            .map(|()| Response::ok(id, serde_json::Value::Null)),
        other => Err(ProviderError::Validation(format!(
            "unknown method '{}'",
            other
        ))),
    };

    match outcome {
        Ok(response) => response,
        Err(err) => {
            warn!(id, error = %err, "request failed");
            Response::diagnostics(id, vec![error_to_diagnostic(&err)])
        }
    }
}

fn param(params: &serde_json::Value, key: &str) -> serde_json::Value {
    params.get(key).cloned().unwrap_or(serde_json::Value::Null)
}

fn param_str(params: &serde_json::Value, key: &str) -> Result<String, ProviderError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| ProviderError::Validation(format!("request is missing '{}'", key)))
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = tokio::signal::ctrl_c() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
