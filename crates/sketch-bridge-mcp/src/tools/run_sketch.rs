//! Tool: run_sketch — Launch a sketch with the Processing runner.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};

use sketch_bridge::{LaunchOutcome, SketchBridge};

use crate::types::{McpError, McpResult, ToolCallResult, ToolDefinition};

#[derive(Debug, Deserialize)]
struct RunParams {
    sketch_name: String,
    #[serde(default)]
    params: Option<Map<String, Value>>,
}

pub fn definition() -> ToolDefinition {
    ToolDefinition {
        name: "run_sketch".to_string(),
        description: Some(
            "Run a Processing sketch in its own window, optionally passing parameters".to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "sketch_name": {
                    "type": "string",
                    "description": "Sketch to run (directory name, without .pde)"
                },
                "params": {
                    "type": "object",
                    "description": "Parameters passed to the sketch as one JSON argument",
                    "additionalProperties": true,
                    "default": {}
                }
            },
            "required": ["sketch_name"]
        }),
    }
}

pub async fn execute(args: Value, bridge: &Arc<SketchBridge>) -> McpResult<ToolCallResult> {
    let params: RunParams =
        serde_json::from_value(args).map_err(|e| McpError::InvalidParams(e.to_string()))?;
    let sketch_params = params.params.unwrap_or_default();

    let outcome = match bridge.run(&params.sketch_name, &sketch_params).await {
        Ok(outcome) => outcome,
        Err(e) => return Ok(ToolCallResult::error(e)),
    };

    Ok(match outcome {
        LaunchOutcome::Started => ToolCallResult::text(format!(
            "Sketch {} started with parameters: {}",
            params.sketch_name,
            Value::Object(sketch_params)
        )),
        LaunchOutcome::StartedWithWarning(detail) | LaunchOutcome::FailedToStart(detail) => {
            ToolCallResult::error_text(format!("Error running sketch: {detail}"))
        }
    })
}
