//! The `initialize` handshake.

use serde::{Deserialize, Serialize};

pub const MCP_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "sketch-bridge-mcp";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

const INSTRUCTIONS: &str = "Sketch Bridge manages Processing sketches on this machine. \
     Use list_sketches to see what exists, create_sketch and update_sketch \
     to write code, and run_sketch to open a sketch window. \
     Read sketch://{name} resources to see current source before editing.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implementation {
    pub name: String,
    pub version: String,
}

/// Client side of the handshake. Client capabilities are ignored: the
/// server never calls back into the client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub client_info: Implementation,
}

/// Tools, resources and prompts are fixed sets, so nothing is ever
/// announced as changed.
#[derive(Debug, Clone, Serialize)]
pub struct ServerCapabilities {
    pub tools: ListChanged,
    pub resources: ResourcesCapability,
    pub prompts: ListChanged,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChanged {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    pub subscribe: bool,
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: Implementation,
    pub instructions: &'static str,
}

impl InitializeResult {
    pub fn default_result() -> Self {
        let unchanging = ListChanged {
            list_changed: false,
        };
        Self {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: unchanging.clone(),
                resources: ResourcesCapability {
                    subscribe: false,
                    list_changed: false,
                },
                prompts: unchanging,
            },
            server_info: Implementation {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
            instructions: INSTRUCTIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_wire_shape() {
        let v = serde_json::to_value(InitializeResult::default_result()).unwrap();
        assert_eq!(v["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(v["capabilities"]["resources"]["subscribe"], false);
        assert!(v["capabilities"].get("logging").is_none());
        assert_eq!(v["serverInfo"]["name"], SERVER_NAME);
    }
}
