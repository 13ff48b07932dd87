//! Agent-protocol method handlers.
//!
//! One `McpServer` serves every transport. Domain failures from a tool call
//! come back inside a successful `tools/call` result with `isError: true`
//! and a structured `{error, message}` payload: they are terminal for that
//! call, and the caller re-resolves state before retrying. JSON-RPC error
//! responses are reserved for protocol-level faults (parse, unknown method,
//! unknown tool, malformed params).

use serde::Deserialize;
use serde_json::{json, Value};

use rentaldesk_core::ToolError;
use rentaldesk_tools::ToolRegistry;

use crate::rpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "rentaldesk";

/// Protocol front-end over the tool registry.
pub struct McpServer {
    registry: ToolRegistry,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl McpServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// Parse and handle one raw message. `None` means nothing should be
    /// written back (the message was a notification).
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };
        self.handle(request).await
    }

    /// Handle one decoded request.
    pub async fn handle(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id,
                JsonRpcError::invalid_request("jsonrpc must be \"2.0\""),
            ));
        }

        let method = request.method.as_str();

        // Notifications get no response regardless of method.
        if request.is_notification() {
            if !method.starts_with("notifications/") {
                tracing::debug!(method, "ignoring notification");
            }
            return None;
        }
        let id = request.id.clone()?;

        let response = match method {
            "initialize" => self.initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.list_tools(id),
            "tools/call" => self.call_tool(id, request.params).await,
            _ => JsonRpcResponse::error(Some(id), JsonRpcError::method_not_found(method)),
        };
        Some(response)
    }

    fn initialize(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            }),
        )
    }

    fn list_tools(&self, id: RequestId) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.registry.descriptors() }))
    }

    async fn call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value).transpose() {
            Ok(Some(p)) => p,
            Ok(None) => {
                return JsonRpcResponse::error(
                    Some(id),
                    JsonRpcError::invalid_params("missing params"),
                );
            }
            Err(e) => {
                return JsonRpcResponse::error(Some(id), JsonRpcError::invalid_params(e.to_string()));
            }
        };

        if self.registry.get(&params.name).is_none() {
            return JsonRpcResponse::error(
                Some(id),
                JsonRpcError::invalid_params(format!("unknown tool '{}'", params.name)),
            );
        }

        let arguments = if params.arguments.is_null() {
            json!({})
        } else {
            params.arguments
        };

        match self.registry.call(&params.name, arguments).await {
            Ok(value) => JsonRpcResponse::success(id, tool_result(&value)),
            Err(err) => {
                tracing::warn!(tool = %params.name, code = err.code(), "tool call failed");
                JsonRpcResponse::success(id, tool_failure(&err))
            }
        }
    }
}

fn tool_result(value: &Value) -> Value {
    json!({
        "content": [{ "type": "text", "text": value.to_string() }],
        "isError": false,
    })
}

fn tool_failure(err: &ToolError) -> Value {
    let payload = json!({
        "error": err.code(),
        "message": err.to_string(),
    });
    json!({
        "content": [{ "type": "text", "text": payload.to_string() }],
        "isError": true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use rentaldesk_core::StaffId;
    use rentaldesk_store::InMemoryStore;
    use rentaldesk_tools::create_registry;

    fn server() -> McpServer {
        let store = InMemoryStore::new();
        store.add_film(1, "ACADEMY DINOSAUR", "Documentary", Some(2006));
        store.add_customer(35, "Virginia", "Green", "virginia.green@example.net");
        store.add_staff(1, 1);
        store.add_inventory(402, 1, 1);
        McpServer::new(create_registry(Arc::new(store), StaffId::new(1)))
    }

    async fn roundtrip(server: &McpServer, raw: Value) -> JsonRpcResponse {
        server
            .handle_line(&raw.to_string())
            .await
            .expect("expected a response")
    }

    #[tokio::test]
    async fn initialize_reports_protocol_and_server_info() {
        let server = server();
        let resp = roundtrip(
            &server,
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "rentaldesk");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn tools_list_exposes_the_registry() {
        let server = server();
        let resp = roundtrip(&server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
            .await;

        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 10);
        assert!(tools.iter().any(|t| t["name"] == "rent_movie"));
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn tools_call_wraps_results_in_content_blocks() {
        let server = server();
        let resp = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0", "id": 3, "method": "tools/call",
                "params": {"name": "rent_movie",
                           "arguments": {"customer_id": 35, "inventory_id": 402}}
            }),
        )
        .await;

        let result = resp.result.unwrap();
        assert_eq!(result["isError"], false);
        let text = result["content"][0]["text"].as_str().unwrap();
        let receipt: Value = serde_json::from_str(text).unwrap();
        assert_eq!(receipt["inventory_id"], 402);
    }

    #[tokio::test]
    async fn domain_failures_surface_as_is_error_results() {
        let server = server();
        let rent = json!({
            "jsonrpc": "2.0", "id": 4, "method": "tools/call",
            "params": {"name": "rent_movie",
                       "arguments": {"customer_id": 35, "inventory_id": 402}}
        });
        roundtrip(&server, rent.clone()).await;

        let resp = roundtrip(&server, rent).await;
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        let failure: Value = serde_json::from_str(text).unwrap();
        assert_eq!(failure["error"], "already_rented");
    }

    #[tokio::test]
    async fn unknown_tool_is_a_protocol_error() {
        let server = server();
        let resp = roundtrip(
            &server,
            json!({
                "jsonrpc": "2.0", "id": 5, "method": "tools/call",
                "params": {"name": "drop_database", "arguments": {}}
            }),
        )
        .await;

        assert!(resp.result.is_none());
        assert_eq!(resp.error.unwrap().code, crate::rpc::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let server = server();
        let resp = roundtrip(
            &server,
            json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}),
        )
        .await;
        assert_eq!(resp.error.unwrap().code, crate::rpc::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn notifications_get_no_response() {
        let server = server();
        let none = server
            .handle_line(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string())
            .await;
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let server = server();
        let resp = server.handle_line("{not json").await.unwrap();
        assert_eq!(resp.error.unwrap().code, crate::rpc::PARSE_ERROR);
        assert!(resp.id.is_none());
    }
}
