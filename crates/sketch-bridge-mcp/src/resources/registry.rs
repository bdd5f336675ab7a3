//! Resource registration and dispatch.

use std::sync::Arc;

use sketch_bridge::SketchBridge;

use crate::tools::blocking;
use crate::types::{
    McpError, McpResult, ReadResourceResult, ResourceDefinition, ResourceTemplateDefinition,
};

use super::{sketches, source, templates, SCHEME};

pub struct ResourceRegistry;

impl ResourceRegistry {
    pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
        templates::list_templates()
    }

    /// Static resources plus one entry per sketch currently on disk.
    pub async fn list_resources(bridge: &Arc<SketchBridge>) -> Vec<ResourceDefinition> {
        let mut resources = templates::list_static();
        match blocking(bridge, |b| b.list()).await {
            Ok(Ok(names)) => resources.extend(names.into_iter().map(|name| ResourceDefinition {
                uri: format!("{SCHEME}{name}"),
                description: Some(format!("Source of sketch {name}")),
                mime_type: Some("text/plain".to_string()),
                name,
            })),
            Ok(Err(e)) => tracing::debug!("Not listing sketch resources: {e}"),
            Err(e) => tracing::warn!("Sketch listing failed: {e}"),
        }
        resources
    }

    pub async fn read(uri: &str, bridge: &Arc<SketchBridge>) -> McpResult<ReadResourceResult> {
        let rest = uri
            .strip_prefix(SCHEME)
            .ok_or_else(|| McpError::ResourceNotFound(uri.to_string()))?;

        match rest.split_once('/') {
            None if rest == "sketches" => sketches::read_index(bridge).await,
            None if !rest.is_empty() => source::read_source(rest, bridge).await,
            Some((name, "backup")) if !name.is_empty() => source::read_backup(name, bridge).await,
            _ => Err(McpError::ResourceNotFound(uri.to_string())),
        }
    }
}
