//! LettsCore tools

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{ToolHandler, ToolRegistry, echo::EchoTool, json_schema, to_text};
use crate::credential::Credential;
use crate::error::CatalogError;
use crate::lettscore::LettsCoreClient;

pub fn register_all(registry: &mut ToolRegistry, client: Arc<LettsCoreClient>) {
    registry.register(Arc::new(EchoTool));
    registry.register(Arc::new(ListContentsTool::new(client)));
}

/// `listContents`: every content item visible to the credential
pub struct ListContentsTool {
    client: Arc<LettsCoreClient>,
}

impl ListContentsTool {
    pub fn new(client: Arc<LettsCoreClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ToolHandler for ListContentsTool {
    fn name(&self) -> &str {
        "listContents"
    }

    fn description(&self) -> &str {
        "List all content published on LettsCore."
    }

    fn input_schema(&self) -> Value {
        json_schema(serde_json::json!({}), vec![])
    }

    async fn execute(
        &self,
        _input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let items = self.client.list_content(credential).await?;
        if items.is_empty() {
            return Ok("No Content".to_string());
        }
        to_text(&items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn tool_with(body: Value) -> (MockServer, ListContentsTool) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;
        let tool = ListContentsTool::new(Arc::new(LettsCoreClient::new(server.uri())));
        (server, tool)
    }

    #[tokio::test]
    async fn test_list_contents_empty() {
        let (_server, tool) = tool_with(serde_json::json!({"data": []})).await;
        let out = tool.execute(serde_json::json!({}), None).await.unwrap();
        assert_eq!(out, "No Content");
    }

    #[tokio::test]
    async fn test_list_contents_json() {
        let (_server, tool) = tool_with(serde_json::json!([{"guid": "g1", "title": "T"}])).await;
        let out = tool.execute(serde_json::json!({}), None).await.unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed[0]["guid"], "g1");
        assert_eq!(parsed[0]["title"], "T");
    }

    #[test]
    fn test_register_all() {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry, Arc::new(LettsCoreClient::new("http://localhost")));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("listContents").is_some());
    }
}
