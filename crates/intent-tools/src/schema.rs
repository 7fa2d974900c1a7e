//! Tool schema construction and the governance argument fragments.

use intent_core::mutation::MutationClass;
use intent_core::tools::{Tool, ToolParameterSchema};
use serde_json::{Value, json};

/// Fluent builder for [`Tool`] schemas.
///
/// ```ignore
/// ToolSchemaBuilder::new("select_active_intent", "Load intent context")
///     .required_property("intent_id", intent_id_property())
///     .additional_properties(false)
///     .build()
/// ```
pub struct ToolSchemaBuilder {
    name: String,
    description: String,
    properties: serde_json::Map<String, Value>,
    required: Vec<String>,
    extra: serde_json::Map<String, Value>,
}

impl ToolSchemaBuilder {
    /// Create a new builder with the given tool name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            properties: serde_json::Map::new(),
            required: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Add an optional property.
    pub fn property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self
    }

    /// Add a required property.
    pub fn required_property(mut self, name: &str, schema: Value) -> Self {
        let _ = self.properties.insert(name.into(), schema);
        self.required.push(name.into());
        self
    }

    /// Set `additionalProperties`.
    pub fn additional_properties(mut self, allowed: bool) -> Self {
        let _ = self
            .extra
            .insert("additionalProperties".into(), Value::Bool(allowed));
        self
    }

    /// Build the final [`Tool`] definition.
    pub fn build(self) -> Tool {
        Tool {
            name: self.name,
            description: self.description,
            parameters: ToolParameterSchema {
                schema_type: "object".into(),
                properties: if self.properties.is_empty() {
                    None
                } else {
                    Some(self.properties)
                },
                required: if self.required.is_empty() {
                    None
                } else {
                    Some(self.required)
                },
                extra: self.extra,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Governance argument fragments
// ─────────────────────────────────────────────────────────────────────────────

/// Schema of the `intent_id` argument.
#[must_use]
pub fn intent_id_property() -> Value {
    json!({
        "type": "string",
        "description": "The ID of the active intent (must exist in .orchestration/active_intents.yaml)"
    })
}

/// Schema of the `mutation_class` argument.
#[must_use]
pub fn mutation_class_property() -> Value {
    let values: Vec<&str> = MutationClass::all().iter().map(|c| c.as_str()).collect();
    json!({
        "type": "string",
        "enum": values,
        "description": "AST_REFACTOR for a syntax change that keeps the same intent, INTENT_EVOLUTION for new behavior"
    })
}

/// Merge the governance arguments into a host tool's definition.
///
/// `intent_id` is always optional. `mutation_class` is added as required when
/// `require_mutation_class` is set (whole-file writes), optional otherwise.
/// Properties the host already defines are left untouched.
#[must_use]
pub fn with_governance_args(mut tool: Tool, require_mutation_class: bool) -> Tool {
    let properties = tool.parameters.properties.get_or_insert_with(serde_json::Map::new);
    let _ = properties
        .entry("intent_id")
        .or_insert_with(intent_id_property);
    let _ = properties
        .entry("mutation_class")
        .or_insert_with(mutation_class_property);

    if require_mutation_class {
        let required = tool.parameters.required.get_or_insert_with(Vec::new);
        if !required.iter().any(|r| r == "mutation_class") {
            required.push("mutation_class".into());
        }
    }
    tool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_schema() {
        let tool = ToolSchemaBuilder::new("Empty", "No params").build();
        assert_eq!(tool.name, "Empty");
        assert_eq!(tool.parameters.schema_type, "object");
        assert!(tool.parameters.properties.is_none());
        assert!(tool.parameters.required.is_none());
        assert!(tool.parameters.extra.is_empty());
    }

    #[test]
    fn required_property_in_both_properties_and_required() {
        let tool = ToolSchemaBuilder::new("T", "D")
            .required_property("name", json!({"type": "string"}))
            .property("limit", json!({"type": "number"}))
            .build();
        let props = tool.parameters.properties.unwrap();
        assert_eq!(props.len(), 2);
        assert_eq!(tool.parameters.required.unwrap(), vec!["name"]);
    }

    #[test]
    fn additional_properties_is_flattened_into_schema() {
        let tool = ToolSchemaBuilder::new("T", "D")
            .additional_properties(false)
            .build();
        let json = serde_json::to_value(&tool.parameters).unwrap();
        assert_eq!(json["additionalProperties"], false);
        assert_eq!(json["type"], "object");
    }

    #[test]
    fn mutation_class_enum_lists_wire_values() {
        let schema = mutation_class_property();
        assert_eq!(schema["enum"], json!(["AST_REFACTOR", "INTENT_EVOLUTION"]));
    }

    #[test]
    fn governance_args_merge_into_host_tool() {
        let host = ToolSchemaBuilder::new("write_to_file", "Write a file")
            .required_property("path", json!({"type": "string"}))
            .required_property("content", json!({"type": "string"}))
            .build();
        let tool = with_governance_args(host, true);

        let props = tool.parameters.properties.as_ref().unwrap();
        assert!(props.contains_key("intent_id"));
        assert!(props.contains_key("mutation_class"));
        assert_eq!(
            tool.parameters.required.unwrap(),
            vec!["path", "content", "mutation_class"]
        );
    }

    #[test]
    fn governance_args_optional_for_edits() {
        let host = ToolSchemaBuilder::new("edit", "Edit").build();
        let tool = with_governance_args(host, false);
        assert_eq!(tool.parameters.properties.unwrap().len(), 2);
        assert!(tool.parameters.required.is_none());
    }

    #[test]
    fn governance_args_are_idempotent() {
        let host = ToolSchemaBuilder::new("write_to_file", "Write")
            .property("intent_id", json!({"type": "string", "description": "host's own"}))
            .build();
        let once = with_governance_args(host, true);
        let twice = with_governance_args(once.clone(), true);
        assert_eq!(once, twice);
        let props = twice.parameters.properties.unwrap();
        assert_eq!(props["intent_id"]["description"], "host's own");
    }
}
