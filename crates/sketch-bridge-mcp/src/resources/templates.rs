//! Resource URI templates and static resource definitions.

use crate::types::{ResourceDefinition, ResourceTemplateDefinition};

pub fn list_templates() -> Vec<ResourceTemplateDefinition> {
    vec![
        ResourceTemplateDefinition {
            uri_template: "sketch://{name}".to_string(),
            name: "Sketch Source".to_string(),
            description: Some("Current source code of a sketch".to_string()),
            mime_type: Some("text/plain".to_string()),
        },
        ResourceTemplateDefinition {
            uri_template: "sketch://{name}/backup".to_string(),
            name: "Sketch Backup".to_string(),
            description: Some("Source as it was before the last update".to_string()),
            mime_type: Some("text/plain".to_string()),
        },
    ]
}

pub fn list_static() -> Vec<ResourceDefinition> {
    vec![ResourceDefinition {
        uri: "sketch://sketches".to_string(),
        name: "Sketch Index".to_string(),
        description: Some("All runnable sketches with size and modification time".to_string()),
        mime_type: Some("application/json".to_string()),
    }]
}
