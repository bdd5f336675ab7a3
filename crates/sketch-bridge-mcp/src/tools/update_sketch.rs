//! Tool: update_sketch — Replace a sketch's source, keeping one backup.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Value};

use sketch_bridge::SketchBridge;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct UpdateParams {
    sketch_name: String,
    code: String,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "update_sketch".to_string(),
        description: Some(
            "Replace the code of an existing sketch; the previous version is kept as .pde.bak"
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sketch_name": {
                    "type": "string",
                    "description": "Sketch to update (without .pde)"
                },
                "code": { "type": "string", "description": "New Processing source code" }
            },
            "required": ["sketch_name", "code"]
        }),
    }
}

pub async fn execute(args: Value, bridge: &Arc<SketchBridge>) -> McpResult<ToolCallResult> {
    let UpdateParams { sketch_name, code } =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;

    let name = sketch_name.clone();
    let updated = super::blocking(bridge, move |b| b.update(&name, &code)).await?;

    Ok(match updated {
        Ok(_) => ToolCallResult::text(format!("Sketch {sketch_name} updated")),
        Err(e) => ToolCallResult::error(e),
    })
}
