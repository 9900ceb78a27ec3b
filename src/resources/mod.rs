//! Resource controllers: orchestration between the mapper and the client.

pub mod custom_status;
pub mod webhook;

pub use custom_status::CustomStatusResource;
pub use webhook::WebhookResource;

/// What Read does when the API answers 404 for a tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadNotFoundPolicy {
    /// Fail the refresh with an error. The default.
    #[default]
    Error,
    /// Drop the resource from state so the next plan recreates it.
    RemoveFromState,
}
