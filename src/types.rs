//! Shared types of the plugin protocol.

use serde::{Deserialize, Serialize};

/// Version of the wire protocol spoken after the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// First field of the handshake line printed on stdout.
pub const HANDSHAKE_PREFIX: &str = "ZENDESK_PROVIDER";

/// Outcome of planning a change for one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the apply is expected to produce.
    pub planned_state: serde_json::Value,
    /// True when the change cannot be applied in place.
    pub requires_replace: bool,
}

impl PlanResult {
    /// Plan that applies in place.
    pub fn in_place(planned_state: serde_json::Value) -> Self {
        Self {
            planned_state,
            requires_replace: false,
        }
    }

    /// Plan that destroys and recreates the resource.
    pub fn replacement(planned_state: serde_json::Value) -> Self {
        Self {
            planned_state,
            requires_replace: true,
        }
    }
}

/// One resource produced by an import operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub type_name: String,
    pub state: serde_json::Value,
}

/// Provider identity and surface, answered to the metadata request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderMetadata {
    /// Prefix of every resource and data source name.
    pub type_name: String,
    pub version: String,
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Whether destroy operations are planned before being applied.
    pub plan_destroy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_result_constructors() {
        let state = serde_json::json!({"webhook_id": "abc"});
        let plan = PlanResult::in_place(state.clone());
        assert!(!plan.requires_replace);
        assert_eq!(plan.planned_state, state);

        let plan = PlanResult::replacement(state.clone());
        assert!(plan.requires_replace);
    }

    #[test]
    fn test_metadata_serializes() {
        let metadata = ProviderMetadata {
            type_name: "zendesk".to_string(),
            version: "0.1.0".to_string(),
            resources: vec!["zendesk_webhook".to_string()],
            data_sources: vec!["zendesk_webhook_signing_secret".to_string()],
            capabilities: ServerCapabilities::default(),
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type_name"], "zendesk");
        assert_eq!(json["capabilities"]["plan_destroy"], false);
    }
}
