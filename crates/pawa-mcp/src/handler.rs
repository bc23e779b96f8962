//! Transport-agnostic MCP request handling
//!
//! One `McpHandler` serves every client. The caller resolves which credential
//! applies to a request and passes it in; the handler never looks at sessions.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use pawa_core::{Catalog, CatalogError, Credential};

use crate::protocol::*;

pub struct McpHandler {
    catalog: Arc<Catalog>,
    server_info: ServerInfo,
}

impl McpHandler {
    pub fn new(catalog: Arc<Catalog>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            catalog,
            server_info: ServerInfo {
                name: name.into(),
                version: version.into(),
            },
        }
    }

    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Handle a single JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_request(
        &self,
        request: JsonRpcRequest,
        credential: Option<&Credential>,
    ) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            self.handle_notification(&request);
            return None;
        };

        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Unsupported jsonrpc version '{}'", request.jsonrpc),
            ));
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: ListChangedCapability {
                            list_changed: false,
                        },
                        resources: ResourcesCapability {
                            subscribe: false,
                            list_changed: false,
                        },
                        prompts: ListChangedCapability {
                            list_changed: false,
                        },
                    },
                    server_info: self.server_info.clone(),
                };
                success(id, &result)
            }

            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),

            "tools/list" => {
                let tools: Vec<McpTool> = self
                    .catalog
                    .list_tools()
                    .into_iter()
                    .map(Into::into)
                    .collect();
                info!("MCP tools/list: returning {} tools", tools.len());
                JsonRpcResponse::success(id, serde_json::json!({ "tools": tools }))
            }

            "tools/call" => self.call_tool(id, &request.params, credential).await,

            // Templates have no enumerable instances
            "resources/list" => JsonRpcResponse::success(id, serde_json::json!({ "resources": [] })),

            "resources/templates/list" => {
                let templates: Vec<McpResourceTemplate> = self
                    .catalog
                    .list_resource_templates()
                    .into_iter()
                    .map(Into::into)
                    .collect();
                JsonRpcResponse::success(
                    id,
                    serde_json::json!({ "resourceTemplates": templates }),
                )
            }

            "resources/read" => self.read_resource(id, &request.params, credential).await,

            "prompts/list" => {
                let prompts: Vec<McpPrompt> = self
                    .catalog
                    .list_prompts()
                    .into_iter()
                    .map(Into::into)
                    .collect();
                JsonRpcResponse::success(id, serde_json::json!({ "prompts": prompts }))
            }

            "prompts/get" => self.get_prompt(id, &request.params),

            _ => {
                warn!("MCP unknown method: {}", request.method);
                JsonRpcResponse::error(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Unknown method: {}", request.method),
                )
            }
        };

        Some(response)
    }

    fn handle_notification(&self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            "notifications/initialized" => info!("MCP client initialized"),
            "notifications/cancelled" => debug!("MCP client cancelled a request"),
            other => debug!("Ignoring MCP notification: {}", other),
        }
    }

    async fn call_tool(
        &self,
        id: Value,
        params: &Value,
        credential: Option<&Credential>,
    ) -> JsonRpcResponse {
        let name = params.get("name").and_then(|v| v.as_str()).unwrap_or("");
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        if name.is_empty() {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                "Missing 'name' parameter".to_string(),
            );
        }

        info!("MCP tools/call: {}", name);
        let result = match self.catalog.call_tool(name, arguments, credential).await {
            Ok(text) => ToolCallResult {
                content: vec![ToolContent::text(text)],
                is_error: None,
            },
            Err(CatalogError::InvalidInput(msg)) => {
                return JsonRpcResponse::error(
                    id,
                    INVALID_PARAMS,
                    format!("Invalid arguments for tool {}: {}", name, msg),
                );
            }
            Err(e) => ToolCallResult {
                content: vec![ToolContent::text(format!("Error: {}", e))],
                is_error: Some(true),
            },
        };
        success(id, &result)
    }

    async fn read_resource(
        &self,
        id: Value,
        params: &Value,
        credential: Option<&Credential>,
    ) -> JsonRpcResponse {
        let Some(uri) = params.get("uri").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'uri' parameter".to_string());
        };

        info!("MCP resources/read: {}", uri);
        match self.catalog.read_resource(uri, credential).await {
            Ok(contents) => {
                let contents: McpResourceContents = contents.into();
                JsonRpcResponse::success(id, serde_json::json!({ "contents": [contents] }))
            }
            Err(e) => catalog_error(id, e),
        }
    }

    fn get_prompt(&self, id: Value, params: &Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "Missing 'name' parameter".to_string());
        };
        let arguments = params
            .get("arguments")
            .cloned()
            .unwrap_or(serde_json::json!({}));

        match self.catalog.get_prompt(name, &arguments) {
            Ok(messages) => {
                let messages: Vec<McpPromptMessage> = messages.into_iter().map(Into::into).collect();
                JsonRpcResponse::success(id, serde_json::json!({ "messages": messages }))
            }
            Err(e) => catalog_error(id, e),
        }
    }
}

fn success<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Serialization error: {}", e)),
    }
}

fn catalog_error(id: Value, err: CatalogError) -> JsonRpcResponse {
    let code = match err {
        CatalogError::UnknownTool(_)
        | CatalogError::UnknownResource(_)
        | CatalogError::UnknownPrompt(_)
        | CatalogError::InvalidInput(_) => INVALID_PARAMS,
        CatalogError::Downstream(_) | CatalogError::Encode(_) => INTERNAL_ERROR,
    };
    JsonRpcResponse::error(id, code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawa_core::catalog;
    use pawa_core::pawapay::PawaPayClient;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request(id: Option<i64>, method: &str, params: Value) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id: id.map(|i| serde_json::json!(i)),
            method: method.to_string(),
            params,
        }
    }

    fn make_handler(base_url: &str) -> McpHandler {
        let catalog = catalog::pawapay::catalog(PawaPayClient::new(base_url));
        McpHandler::new(Arc::new(catalog), "pawaPay MCP Transactions", "1.0.0")
    }

    #[tokio::test]
    async fn test_handle_initialize() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(request(Some(1), "initialize", serde_json::json!({})), None)
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "pawaPay MCP Transactions");
        assert_eq!(result["serverInfo"]["version"], "1.0.0");
    }

    #[tokio::test]
    async fn test_handle_tools_list() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(request(Some(2), "tools/list", serde_json::json!({})), None)
            .await
            .unwrap();
        let tools = resp.result.unwrap()["tools"].as_array().unwrap().clone();
        assert_eq!(tools.len(), 5);
        assert!(tools.iter().any(|t| t["name"] == "deposit"));
    }

    #[tokio::test]
    async fn test_handle_tools_call_missing_name() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(request(Some(3), "tools/call", serde_json::json!({})), None)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_handle_tools_call_invalid_arguments() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(
                request(
                    Some(3),
                    "tools/call",
                    serde_json::json!({"name": "correspondentPredict", "arguments": {}}),
                ),
                None,
            )
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_handle_tools_call_unknown_tool() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(
                request(Some(4), "tools/call", serde_json::json!({"name": "nope"})),
                None,
            )
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert!(result["content"][0]["text"].as_str().unwrap().contains("Unknown tool"));
    }

    #[tokio::test]
    async fn test_tools_call_uses_credential() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/active-conf"))
            .and(header("authorization", "Bearer session-key"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"merchantId": "m1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let handler = make_handler(&server.uri());
        let cred = Credential::new("session-key");
        let resp = handler
            .handle_request(
                request(Some(5), "tools/call", serde_json::json!({"name": "activeConf"})),
                Some(&cred),
            )
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert!(result.get("isError").is_none());
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("\"merchantId\":\"m1\""));
    }

    #[tokio::test]
    async fn test_tools_call_downstream_error_is_tool_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/active-conf"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let handler = make_handler(&server.uri());
        let resp = handler
            .handle_request(
                request(Some(6), "tools/call", serde_json::json!({"name": "activeConf"})),
                None,
            )
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(
            result["content"][0]["text"],
            "Error: HTTP error! status: 401 Unauthorized"
        );
    }

    #[tokio::test]
    async fn test_resources_templates_list() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(
                request(Some(7), "resources/templates/list", serde_json::json!({})),
                None,
            )
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(
            result["resourceTemplates"][0]["uriTemplate"],
            "deposit://{depositId}"
        );
    }

    #[tokio::test]
    async fn test_resources_read_unknown_uri() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(
                request(
                    Some(8),
                    "resources/read",
                    serde_json::json!({"uri": "nothing://here"}),
                ),
                None,
            )
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_prompts_get() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(
                request(
                    Some(9),
                    "prompts/get",
                    serde_json::json!({"name": "echo", "arguments": {"message": "hi"}}),
                ),
                None,
            )
            .await
            .unwrap();
        let result = resp.result.unwrap();
        assert_eq!(
            result["messages"][0]["content"]["text"],
            "Please process this message: hi"
        );
    }

    #[tokio::test]
    async fn test_handle_ping() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(request(Some(10), "ping", serde_json::json!({})), None)
            .await
            .unwrap();
        assert!(resp.result.is_some());
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let handler = make_handler("http://localhost");
        let resp = handler
            .handle_request(request(Some(11), "unknown/method", serde_json::json!({})), None)
            .await
            .unwrap();
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_notification_no_response() {
        let handler = make_handler("http://localhost");
        assert!(
            handler
                .handle_request(request(None, "notifications/initialized", Value::Null), None)
                .await
                .is_none()
        );
        assert!(
            handler
                .handle_request(request(None, "unknown/method", Value::Null), None)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let handler = make_handler("http://localhost");
        let mut req = request(Some(12), "ping", Value::Null);
        req.jsonrpc = "1.0".to_string();
        let resp = handler.handle_request(req, None).await.unwrap();
        assert_eq!(resp.error.unwrap().code, INVALID_REQUEST);
    }
}
