//! Tool: create_sketch — Create a sketch directory and write its source.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sketch_bridge::SketchBridge;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct CreateParams {
    sketch_name: String,
    code: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "create_sketch".to_string(),
        description: Some(
            "Create a new Processing sketch with the given code (overwrites without backup)"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sketch_name": {
                    "type": "string",
                    "description": "Name for the new sketch (without .pde)"
                },
                "code": { "type": "string", "description": "Processing source code" }
            },
            "required": ["sketch_name", "code"]
        }),
    }
}

pub async fn execute(args: Value, bridge: &Arc<SketchBridge>) -> McpResult<ToolCallResult> {
    let CreateParams { sketch_name, code } =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let name = sketch_name.clone();
    let created = super::blocking(bridge, move |b| b.create(&name, &code)).await?;

    Ok(match created {
        Ok(dir) => ToolCallResult::text(format!(
            "Sketch {sketch_name} created in {}",
            dir.display()
        )),
        Err(e) => ToolCallResult::error(e),
    })
}
