//! Data sources.

pub mod webhook_signing_secret;

pub use webhook_signing_secret::WebhookSigningSecretDataSource;
