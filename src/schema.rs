//! Schema and diagnostic types describing the provider's surface.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The type of a schema attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Int64,
    Bool,
    /// Ordered collection with a single element type.
    List(Box<AttributeType>),
    /// String-keyed collection with a single element type.
    Map(Box<AttributeType>),
    /// Fixed set of named, individually typed attributes.
    Object(HashMap<String, AttributeType>),
}

impl AttributeType {
    /// Human-readable name, used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            AttributeType::String => "string",
            AttributeType::Int64 => "int64",
            AttributeType::Bool => "bool",
            AttributeType::List(_) => "list",
            AttributeType::Map(_) => "map",
            AttributeType::Object(_) => "object",
        }
    }
}

/// A single attribute in a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: AttributeType,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub computed: bool,
    #[serde(default)]
    pub sensitive: bool,
}

impl Attribute {
    pub fn new(name: impl Into<String>, attribute_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
            description: String::new(),
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Schema for one resource, data source, or the provider config block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema version, bumped when state layout changes incompatibly.
    pub version: i64,
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub description: String,
}

impl Schema {
    pub fn new(version: i64) -> Self {
        Self {
            version,
            attributes: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    /// Attribute name to type map, as consumed by dynamic-value validation.
    pub fn attribute_types(&self) -> HashMap<String, AttributeType> {
        self.attributes
            .iter()
            .map(|a| (a.name.clone(), a.attribute_type.clone()))
            .collect()
    }
}

/// Complete schema surface of the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderSchema {
    /// Schema of the provider configuration block.
    pub provider: Schema,
    /// Resource type name to schema.
    pub resources: HashMap<String, Schema>,
    /// Data source type name to schema.
    pub data_sources: HashMap<String, Schema>,
}

impl ProviderSchema {
    pub fn new(provider: Schema) -> Self {
        Self {
            provider,
            resources: HashMap::new(),
            data_sources: HashMap::new(),
        }
    }

    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A user-facing message attached to an operation's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub summary: String,
    #[serde(default)]
    pub detail: String,
    /// Dotted attribute path the diagnostic applies to, when attributable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

impl Diagnostic {
    pub fn error(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            summary: summary.into(),
            detail: String::new(),
            attribute: None,
        }
    }

    pub fn warning(summary: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            summary: summary.into(),
            detail: String::new(),
            attribute: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }

    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }
}

/// True if any diagnostic in the slice is an error.
pub fn has_error(diagnostics: &[Diagnostic]) -> bool {
    diagnostics.iter().any(Diagnostic::is_error)
}
