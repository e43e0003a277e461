// supportbot-core/src/models/tools.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::{BTreeMap, HashMap};

// --- Structs for model tool interaction ---

/// Represents a tool call requested by the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub call_type: String, // Usually "function"
    pub function: ToolFunction,
}

impl ToolCall {
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            call_type: "function".to_string(),
            function: ToolFunction {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// Represents the function call details within a ToolCall.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolFunction {
    pub name: String,
    /// Arguments are sent by the model as a JSON object encoded in a string.
    pub arguments: String,
}

// --- Tool definitions presented to the model ---

/// Defines the schema for a tool that can be presented to the model.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: ToolParametersDefinition,
}

/// Defines the parameters structure for a tool.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParametersDefinition {
    #[serde(rename = "type")]
    pub param_type: String,
    pub properties: BTreeMap<String, ToolParameter>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
}

/// Defines a single parameter within a tool's schema.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToolParameter {
    #[serde(rename = "type")]
    pub param_type: ToolParameterType,
    pub description: String,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ToolParameter {
    pub fn string(description: impl Into<String>) -> Self {
        Self {
            param_type: ToolParameterType::String,
            description: description.into(),
            enum_values: None,
        }
    }

    pub fn one_of(description: impl Into<String>, values: &[&str]) -> Self {
        Self {
            param_type: ToolParameterType::String,
            description: description.into(),
            enum_values: Some(values.iter().map(|v| v.to_string()).collect()),
        }
    }
}

/// Represents the type of a tool parameter.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ToolParameterType {
    String,
}

/// Represents the input arguments provided for a tool execution at runtime.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ToolInput {
    pub arguments: HashMap<String, JsonValue>,
}

impl ToolInput {
    /// Decodes the raw argument string of a [`ToolCall`].
    ///
    /// An empty string is treated as an empty object, since some models send
    /// that for tools without parameters.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let arguments: HashMap<String, JsonValue> = serde_json::from_str(raw)
            .with_context(|| format!("arguments are not a JSON object: {}", raw))?;
        Ok(Self { arguments })
    }

    /// Returns the argument as text. Numbers are accepted and stringified, so an
    /// order number sent as `123456` still works.
    pub fn optional_str(&self, name: &str) -> Option<String> {
        match self.arguments.get(name)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn required_str(&self, name: &str) -> Result<String> {
        self.optional_str(name)
            .ok_or_else(|| anyhow!("missing required argument '{}'", name))
    }
}
