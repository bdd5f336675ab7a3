//! Resources: sketch://{name} and sketch://{name}/backup

use std::sync::Arc;

use sketch_bridge::SketchBridge;

use crate::tools::blocking;
use crate::types::{McpResult, ReadResourceResult};

pub async fn read_source(name: &str, bridge: &Arc<SketchBridge>) -> McpResult<ReadResourceResult> {
    let owned = name.to_string();
    let code = blocking(bridge, move |b| b.read(&owned)).await??;
    Ok(ReadResourceResult::text(
        format!("sketch://{name}"),
        "text/plain",
        code,
    ))
}

pub async fn read_backup(name: &str, bridge: &Arc<SketchBridge>) -> McpResult<ReadResourceResult> {
    let owned = name.to_string();
    let code = blocking(bridge, move |b| b.store().read_backup(&owned)).await??;
    Ok(ReadResourceResult::text(
        format!("sketch://{name}/backup"),
        "text/plain",
        code,
    ))
}
