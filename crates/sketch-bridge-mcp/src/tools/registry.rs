//! Tool registration and dispatch.

use std::sync::Arc;

use serde_json::Value;

use sketch_bridge::SketchBridge;

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

use super::{create_sketch, list_sketches, run_sketch, update_sketch};

pub struct ToolRegistry;

impl ToolRegistry {
    pub fn list_tools() -> Vec<ToolDefinition> {
        vec![
            run_sketch::definition(),
            list_sketches::definition(),
            create_sketch::definition(),
            update_sketch::definition(),
        ]
    }

    pub async fn call(
        name: &str,
        arguments: Option<Value>,
        bridge: &Arc<SketchBridge>,
    ) -> McpResult<ToolCallResult> {
        let args = arguments.unwrap_or(Value::Object(serde_json::Map::new()));
        tracing::debug!("Tool call: {name}");

        match name {
            "run_sketch" => run_sketch::execute(args, bridge).await,
            "list_sketches" => list_sketches::execute(args, bridge).await,
            "create_sketch" => create_sketch::execute(args, bridge).await,
            "update_sketch" => update_sketch::execute(args, bridge).await,
            _ => Err(McpError::ToolNotFound(name.to_string())),
        }
    }
}
