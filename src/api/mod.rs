//! Zendesk REST API surface: wire shapes and the HTTP client.

pub mod client;
pub mod models;

pub use client::{ApiResponse, ZendeskClient};
