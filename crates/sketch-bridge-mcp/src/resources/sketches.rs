//! Resource: sketch://sketches

use std::sync::Arc;

use serde_json::json;

use sketch_bridge::SketchBridge;

use crate::tools::blocking;
use crate::types::{McpResult, ReadResourceResult};

pub async fn read_index(bridge: &Arc<SketchBridge>) -> McpResult<ReadResourceResult> {
    let infos = blocking(bridge, |b| {
        let names = b.list()?;
        Ok::<_, sketch_bridge::SketchError>(
            names
                .iter()
                .filter_map(|name| b.store().info(name).ok())
                .collect::<Vec<_>>(),
        )
    })
    .await??;

    let sketches: Vec<_> = infos
        .iter()
        .map(|info| {
            json!({
                "name": info.name,
                "source_path": info.source_path.display().to_string(),
                "size": info.size,
                "modified": info.modified.map(|t| t.to_rfc3339()),
                "has_backup": info.has_backup,
            })
        })
        .collect();

    let content = json!({
        "root": bridge.config().sketch_root.display().to_string(),
        "count": sketches.len(),
        "sketches": sketches,
    });

    Ok(ReadResourceResult::text(
        "sketch://sketches",
        "application/json",
        serde_json::to_string_pretty(&content).unwrap_or_default(),
    ))
}
