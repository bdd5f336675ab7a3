//! Prompt registration and dispatch.

use serde_json::Value;

use crate::types::{McpError, McpResult, PromptArgument, PromptDefinition, PromptGetResult};

use super::{new_sketch, revise_sketch};

pub struct PromptRegistry;

impl PromptRegistry {
    pub fn list_prompts() -> Vec<PromptDefinition> {
        vec![
            PromptDefinition {
                name: "new_sketch".to_string(),
                description: Some("Write a new Processing sketch and run it".to_string()),
                arguments: vec![
                    PromptArgument {
                        name: "idea".to_string(),
                        description: Some("What the sketch should draw or do".to_string()),
                        required: true,
                    },
                    PromptArgument {
                        name: "sketch_name".to_string(),
                        description: Some("Name to save it under".to_string()),
                        required: false,
                    },
                ],
            },
            PromptDefinition {
                name: "revise_sketch".to_string(),
                description: Some("Change an existing sketch and re-run it".to_string()),
                arguments: vec![
                    PromptArgument {
                        name: "sketch_name".to_string(),
                        description: Some("Sketch to change".to_string()),
                        required: true,
                    },
                    PromptArgument {
                        name: "change".to_string(),
                        description: Some("What should change".to_string()),
                        required: true,
                    },
                ],
            },
        ]
    }

    pub async fn get(name: &str, arguments: Option<Value>) -> McpResult<PromptGetResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));

        match name {
            "new_sketch" => new_sketch::expand(args),
            "revise_sketch" => revise_sketch::expand(args),
            _ => Err(McpError::PromptNotFound(name.to_string())),
        }
    }
}

/// Fetch a required string argument.
pub(crate) fn required_arg<'a>(args: &'a Value, name: &str) -> McpResult<&'a str> {
    args.get(name)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| McpError::InvalidParams(format!("'{name}' is required")))
}
