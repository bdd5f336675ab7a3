//! Request dispatcher — routes JSON-RPC methods to tools, resources, and prompts.

use std::sync::Arc;
use tokio::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use sketch_bridge::SketchBridge;

use crate::prompts::PromptRegistry;
use crate::resources::ResourceRegistry;
use crate::tools::ToolRegistry;
use crate::types::*;

use super::negotiation::Handshake;
use super::validator::validate_request;

/// Dispatches incoming JSON-RPC messages. Cheap to share across tasks.
pub struct ProtocolHandler {
    bridge: Arc<SketchBridge>,
    handshake: Mutex<Handshake>,
}

impl ProtocolHandler {
    pub fn new(bridge: Arc<SketchBridge>) -> Self {
        Self {
            bridge,
            handshake: Mutex::new(Handshake::default()),
        }
    }

    pub async fn handle_message(&self, msg: JsonRpcMessage) -> Option<Value> {
        match msg {
            JsonRpcMessage::Request(req) => Some(self.handle_request(req).await),
            JsonRpcMessage::Notification(notif) => {
                self.handle_notification(notif).await;
                None
            }
            JsonRpcMessage::Reply { id, .. } => {
                tracing::debug!("Dropping stray reply {id}: this server sends no requests");
                None
            }
        }
    }

    async fn handle_request(&self, request: JsonRpcRequest) -> Value {
        if let Err(e) = validate_request(&request) {
            return e.to_json_rpc_error(request.id).into_value();
        }

        let id = request.id.clone();
        tracing::debug!("Request {id}: {}", request.method);
        let result = self.dispatch_request(&request).await;

        match result {
            Ok(value) => JsonRpcReply::result(id, value).into_value(),
            Err(e) => e.to_json_rpc_error(id).into_value(),
        }
    }

    async fn dispatch_request(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.params.clone()).await,
            "shutdown" => self.handle_shutdown().await,

            "tools/list" => self.handle_tools_list().await,
            "tools/call" => self.handle_tools_call(request.params.clone()).await,

            "resources/list" => self.handle_resources_list().await,
            "resources/templates/list" => self.handle_resource_templates_list().await,
            "resources/read" => self.handle_resources_read(request.params.clone()).await,

            "prompts/list" => self.handle_prompts_list().await,
            "prompts/get" => self.handle_prompts_get(request.params.clone()).await,

            "ping" => Ok(Value::Object(serde_json::Map::new())),

            _ => Err(McpError::MethodNotFound(request.method.clone())),
        }
    }

    async fn handle_notification(&self, notification: JsonRpcNotification) {
        match notification.method.as_str() {
            "initialized" => {
                self.handshake.lock().await.mark_initialized();
            }
            "notifications/cancelled" | "$/cancelRequest" => {
                tracing::debug!("Ignoring cancellation: sketch operations run to completion");
            }
            _ => {
                tracing::debug!("Unknown notification: {}", notification.method);
            }
        }
    }

    async fn handle_initialize(&self, params: Option<Value>) -> McpResult<Value> {
        let init_params: InitializeParams = parse_params(params, "Initialize")?;
        let result = self.handshake.lock().await.negotiate(init_params);
        to_result(result)
    }

    async fn handle_shutdown(&self) -> McpResult<Value> {
        // Nothing to flush: every operation writes through to disk.
        tracing::info!("Shutdown requested");
        Ok(Value::Object(serde_json::Map::new()))
    }

    async fn handle_tools_list(&self) -> McpResult<Value> {
        to_result(ToolListResult {
            tools: ToolRegistry::list_tools(),
        })
    }

    async fn handle_tools_call(&self, params: Option<Value>) -> McpResult<Value> {
        let call: ToolCallParams = parse_params(params, "Tool call")?;
        if !self.handshake.lock().await.is_ready() {
            tracing::debug!("Tool {} called before the handshake completed", call.name);
        }
        let result = ToolRegistry::call(&call.name, call.arguments, &self.bridge).await?;
        to_result(result)
    }

    async fn handle_resources_list(&self) -> McpResult<Value> {
        to_result(ResourceListResult {
            resources: ResourceRegistry::list_resources(&self.bridge).await,
        })
    }

    async fn handle_resource_templates_list(&self) -> McpResult<Value> {
        to_result(ResourceTemplateListResult {
            resource_templates: ResourceRegistry::list_templates(),
        })
    }

    async fn handle_resources_read(&self, params: Option<Value>) -> McpResult<Value> {
        let read: ResourceReadParams = parse_params(params, "Resource read")?;
        to_result(ResourceRegistry::read(&read.uri, &self.bridge).await?)
    }

    async fn handle_prompts_list(&self) -> McpResult<Value> {
        to_result(PromptListResult {
            prompts: PromptRegistry::list_prompts(),
        })
    }

    async fn handle_prompts_get(&self, params: Option<Value>) -> McpResult<Value> {
        let get: PromptGetParams = parse_params(params, "Prompt get")?;
        to_result(PromptRegistry::get(&get.name, get.arguments).await?)
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>, what: &str) -> McpResult<T> {
    let params = params.ok_or_else(|| McpError::InvalidParams(format!("{what} params required")))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_result(value: impl Serialize) -> McpResult<Value> {
    serde_json::to_value(value).map_err(|e| McpError::InternalError(e.to_string()))
}
