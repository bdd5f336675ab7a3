//! MCP tool implementations.

pub mod create_sketch;
pub mod list_sketches;
pub mod registry;
pub mod run_sketch;
pub mod update_sketch;

pub use registry::ToolRegistry;

use std::sync::Arc;

use sketch_bridge::SketchBridge;

use crate::types::{McpError, McpResult};

/// Run a blocking file-system operation off the async workers.
pub(crate) async fn blocking<T, F>(bridge: &Arc<SketchBridge>, op: F) -> McpResult<T>
where
    T: Send + 'static,
    F: FnOnce(&SketchBridge) -> T + Send + 'static,
{
    let bridge = Arc::clone(bridge);
    tokio::task::spawn_blocking(move || op(&bridge))
        .await
        .map_err(|e| McpError::InternalError(format!("Worker task failed: {e}")))
}
