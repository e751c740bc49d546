//! Tool definition types shared by the tool layer and the MCP server.

use std::collections::HashMap;

use log::warn;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Represents an object schema used as array items or nested objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSchema {
    /// The JSON type, always "object".
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Map of property names to their definitions.
    pub properties: HashMap<String, Property>,
    /// List of required property names.
    pub required: Vec<String>,
}

impl ObjectSchema {
    /// Creates a new `ObjectSchema` with the given properties and required fields.
    #[must_use]
    pub fn new(properties: HashMap<String, Property>, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties,
            required,
        }
    }
}

/// Describes a single property in a tool's input schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    /// The JSON type (e.g., "string", "boolean", "array").
    #[serde(rename = "type")]
    pub prop_type: String,
    /// Human-readable description of this property.
    pub description: String,
    /// Default value advertised to the host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    /// Schema for array items, when the items are objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<ItemSchema>>,
    /// Nested object properties.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<HashMap<String, Self>>,
    /// Required fields for nested objects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Item schema of an array property.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ItemSchema {
    /// Array of objects.
    Object(ObjectSchema),
    /// Array of scalars, e.g. `{"type": "string"}`.
    Scalar {
        /// The scalar JSON type.
        #[serde(rename = "type")]
        item_type: String,
    },
}

impl Property {
    fn of_type(prop_type: &str, description: impl Into<String>) -> Self {
        Self {
            prop_type: prop_type.to_string(),
            description: description.into(),
            default: None,
            items: None,
            properties: None,
            required: None,
        }
    }

    /// Creates a string property.
    #[must_use]
    pub fn string(description: impl Into<String>) -> Self {
        Self::of_type("string", description)
    }

    /// Creates a boolean property.
    #[must_use]
    pub fn boolean(description: impl Into<String>) -> Self {
        Self::of_type("boolean", description)
    }

    /// Creates an array of strings.
    #[must_use]
    pub fn string_array(description: impl Into<String>) -> Self {
        Self {
            items: Some(Box::new(ItemSchema::Scalar {
                item_type: "string".to_string(),
            })),
            ..Self::of_type("array", description)
        }
    }

    /// Creates an array property with the given object item schema.
    #[must_use]
    pub fn array(description: impl Into<String>, items: ObjectSchema) -> Self {
        Self {
            items: Some(Box::new(ItemSchema::Object(items))),
            ..Self::of_type("array", description)
        }
    }

    /// Creates an object property with nested properties.
    #[must_use]
    pub fn object(
        description: impl Into<String>,
        properties: HashMap<String, Self>,
        required: Vec<String>,
    ) -> Self {
        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::of_type("object", description)
        }
    }

    /// Attaches a default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<serde_json::Value>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Defines the input schema for a tool using JSON Schema conventions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Parameters {
    /// The JSON type, typically "object".
    #[serde(rename = "type")]
    pub param_type: String,
    /// Map of parameter names to their property definitions.
    pub properties: HashMap<String, Property>,
    /// List of required parameter names.
    pub required: Vec<String>,
}

impl Parameters {
    /// Creates a new `Parameters` with type "object".
    #[must_use]
    pub fn new(properties: HashMap<String, Property>, required: Vec<String>) -> Self {
        Self {
            param_type: "object".to_string(),
            properties,
            required,
        }
    }

    /// Parameters for a tool that takes no arguments.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(HashMap::new(), Vec::new())
    }
}

impl From<Parameters> for serde_json::Value {
    fn from(params: Parameters) -> Self {
        // Strings, maps and vectors only; serialization cannot fail.
        match serde_json::to_value(params) {
            Ok(value) => value,
            Err(e) => {
                warn!("Parameters serialization unexpectedly failed: {e}");
                Self::Null
            }
        }
    }
}

/// Describes a function exposed as a tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    /// The name of the function.
    pub name: String,
    /// Human-readable description of what the function does.
    pub description: String,
    /// JSON Schema definition of the function's parameters.
    pub parameters: serde_json::Value,
}

/// A tool advertised to the host, wrapping a function.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder, PartialEq)]
pub struct Tool {
    /// The type of tool (defaults to "function").
    #[serde(rename = "type")]
    #[builder(default = "function".to_string())]
    pub r#type: String,
    /// The function definition.
    pub function: Function,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_property_serialization_skips_empty_fields() {
        let prop = Property::string("Account identifier");

        let json = serde_json::to_value(&prop).expect("Failed to serialize");
        assert_eq!(json["type"], "string");
        assert_eq!(json["description"], "Account identifier");
        assert!(json.get("default").is_none());
        assert!(json.get("items").is_none());
        assert!(json.get("properties").is_none());
        assert!(json.get("required").is_none());
    }

    #[test]
    fn test_property_with_default() {
        let prop = Property::boolean("Use environment credentials").with_default(true);

        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["type"], "boolean");
        assert_eq!(json["default"], true);
    }

    #[test]
    fn test_string_array_items() {
        let prop = Property::string_array("Supported transfer types");

        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["type"], "array");
        assert_eq!(json["items"], serde_json::json!({"type": "string"}));
    }

    #[test]
    fn test_nested_object_property() {
        let mut nested = HashMap::new();
        nested.insert("city".to_string(), Property::string("City"));
        let prop = Property::object("Mailing address", nested, vec!["city".to_string()]);

        let json = serde_json::to_value(&prop).unwrap();
        assert_eq!(json["type"], "object");
        assert!(json["properties"]["city"].is_object());
        assert_eq!(json["required"], serde_json::json!(["city"]));

        let back: Property = serde_json::from_value(json).unwrap();
        assert_eq!(back, prop);
    }

    #[test]
    fn test_parameters_into_value() {
        let mut props = HashMap::new();
        props.insert("account_id".to_string(), Property::string("Account"));
        let value: serde_json::Value =
            Parameters::new(props, vec!["account_id".to_string()]).into();

        assert_eq!(value["type"], "object");
        assert_eq!(value["required"], serde_json::json!(["account_id"]));
        assert_eq!(value["properties"]["account_id"]["type"], "string");
    }

    #[test]
    fn test_empty_parameters() {
        let value: serde_json::Value = Parameters::empty().into();
        assert_eq!(
            value,
            serde_json::json!({"type": "object", "properties": {}, "required": []})
        );
    }

    #[test]
    fn test_tool_builder_defaults_type() {
        let tool = Tool::builder()
            .function(Function {
                name: "brale_get_accounts".to_string(),
                description: "List accounts".to_string(),
                parameters: Parameters::empty().into(),
            })
            .build();

        assert_eq!(tool.r#type, "function");
        assert_eq!(tool.function.name, "brale_get_accounts");
    }
}
