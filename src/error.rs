//! Error types for the Zendesk provider.

use thiserror::Error;

/// Errors produced by the provider.
///
/// The first four variants are construction errors: they signal a provider
/// bug (state and schema out of sync) rather than a user mistake. They are
/// surfaced as diagnostics, never panics.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A declared attribute had no corresponding value.
    #[error("Missing attribute: {0}")]
    MissingAttribute(String),

    /// A supplied value did not match its declared attribute type.
    #[error("Type mismatch for attribute '{attribute}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Dotted path of the offending attribute.
        attribute: String,
        /// The declared type.
        expected: String,
        /// The type actually supplied.
        actual: String,
    },

    /// A value was supplied for an attribute the schema does not declare.
    #[error("Unexpected attribute: {0}")]
    UnexpectedAttribute(String),

    /// An API response carried no identity field.
    #[error("API response is missing the {0} id")]
    MissingIdentity(&'static str),

    /// An immutable attribute was changed in the plan.
    #[error("{0} cannot be updated, replace the resource instead")]
    ImmutableField(&'static str),

    /// Provider configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource or data source configuration failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested remote object does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The requested resource type is not served by this provider.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// The API answered with an unexpected status code.
    #[error("API error (status {status}): {detail}")]
    Api {
        /// HTTP status code of the response.
        status: u16,
        /// Status line plus raw or parsed response body.
        detail: String,
    },

    /// The HTTP client failed before a response was received.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Socket-level failure in the plugin server.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// Short headline for the diagnostic built from this error.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::MissingAttribute(_)
            | Self::TypeMismatch { .. }
            | Self::UnexpectedAttribute(_)
            | Self::MissingIdentity(_) => "Provider state mapping error",
            Self::ImmutableField(_) => "Immutable attribute changed",
            Self::Configuration(_) => "Provider configuration error",
            Self::Validation(_) => "Invalid configuration",
            Self::NotFound(_) => "Resource not found",
            Self::UnknownResource(_) => "Unknown resource type",
            Self::Api { .. } => "Unexpected API response",
            Self::Transport(_) => "API request failed",
            Self::Io(_) => "I/O error",
            Self::Serialization(_) => "Serialization error",
        }
    }
}
