//! Terraform provider for Zendesk.
//!
//! Manages webhooks and custom ticket statuses through the Zendesk REST API
//! and exposes webhook signing secrets as a data source. The provider runs
//! as a plugin subprocess: it prints a handshake line on stdout and then
//! serves the plugin protocol on a local TCP socket.
//!
//! The heart of the crate is the mapping layer between the three-valued
//! typed state model ([`value::Value`]) and the API's JSON shapes, including
//! the merge-preserving treatment of auth secrets the API never returns.

pub mod api;
pub mod datasources;
pub mod error;
pub mod logging;
pub mod mapper;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod server;
pub mod state;
pub mod types;
pub mod validation;
pub mod value;

pub use error::ProviderError;
pub use provider::ZendeskProvider;
pub use schema::{Attribute, AttributeType, Diagnostic, DiagnosticSeverity, ProviderSchema, Schema};
pub use server::{serve, serve_with_options, ProviderService, ServeOptions};
pub use types::{ImportedResource, PlanResult, ProviderMetadata, ServerCapabilities};
pub use value::{Dynamic, Value};
