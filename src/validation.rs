//! Config validation against a schema.

use crate::error::ProviderError;
use crate::schema::{Diagnostic, Schema};
use crate::server::error_to_diagnostic;
use crate::state::json_to_map;
use crate::value::{from_attribute_map, Dynamic};

/// Validate a config value, returning diagnostics.
pub fn validate(schema: &Schema, config: &serde_json::Value) -> Vec<Diagnostic> {
    match validate_result(schema, config) {
        Ok(()) => Vec::new(),
        Err(err) => vec![error_to_diagnostic(&err)],
    }
}

/// Validate a config value, returning the first violation.
///
/// Checks shape first (every declared attribute present, types match, no
/// undeclared keys), then that required attributes are not Null.
pub fn validate_result(schema: &Schema, config: &serde_json::Value) -> Result<(), ProviderError> {
    let values = json_to_map(config)?;
    let values = from_attribute_map(&schema.attribute_types(), &values)?;
    for attribute in &schema.attributes {
        if attribute.required && matches!(values.get(&attribute.name), Some(Dynamic::Null)) {
            return Err(ProviderError::Validation(format!(
                "required attribute '{}' must not be null",
                attribute.name
            )));
        }
    }
    Ok(())
}

pub fn is_valid(schema: &Schema, config: &serde_json::Value) -> bool {
    validate_result(schema, config).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Attribute, AttributeType};

    fn test_schema() -> Schema {
        Schema::new(0)
            .with_attribute(Attribute::new("webhook_id", AttributeType::String).computed())
            .with_attribute(
                Attribute::new(
                    "subscriptions",
                    AttributeType::List(Box::new(AttributeType::String)),
                )
                .required(),
            )
    }

    #[test]
    fn test_valid_config() {
        let config = serde_json::json!({
            "webhook_id": null,
            "subscriptions": ["conditional_ticket_events"]
        });
        assert!(is_valid(&test_schema(), &config));
        assert!(validate(&test_schema(), &config).is_empty());
    }

    #[test]
    fn test_missing_attribute_is_flagged() {
        let config = serde_json::json!({ "webhook_id": null });
        let diagnostics = validate(&test_schema(), &config);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].attribute.as_deref(), Some("subscriptions"));
    }

    #[test]
    fn test_null_required_attribute_is_flagged() {
        let config = serde_json::json!({
            "webhook_id": null,
            "subscriptions": null
        });
        let err = validate_result(&test_schema(), &config).unwrap_err();
        assert!(matches!(err, ProviderError::Validation(_)));
    }

    #[test]
    fn test_undeclared_key_is_flagged() {
        let config = serde_json::json!({
            "webhook_id": null,
            "subscriptions": [],
            "bogus": 1
        });
        assert!(!is_valid(&test_schema(), &config));
    }

    #[test]
    fn test_unknown_satisfies_required() {
        let config = serde_json::json!({
            "webhook_id": null,
            "subscriptions": { "__unknown__": true }
        });
        assert!(is_valid(&test_schema(), &config));
    }
}
