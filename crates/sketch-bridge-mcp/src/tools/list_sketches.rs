//! Tool: list_sketches — List runnable sketches under the sketch root.

use std::sync::Arc;

use serde_json::{json, Value};

use sketch_bridge::SketchBridge;

use crate::types::{McpResult, ToolCallResult, ToolDefinition};

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "list_sketches".to_string(),
        description: Some("List the sketches available in the sketch directory".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub async fn execute(_args: Value, bridge: &Arc<SketchBridge>) -> McpResult<ToolCallResult> {
    let listed = super::blocking(bridge, |b| b.list()).await?;

    Ok(match listed {
        Ok(names) if names.is_empty() => ToolCallResult::text(format!(
            "No sketches found in {}.",
            bridge.config().sketch_root.display()
        )),
        Ok(names) => ToolCallResult::text(format!("Available sketches:\n{}", names.join("\n"))),
        Err(e) => ToolCallResult::error(e),
    })
}
