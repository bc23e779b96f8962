//! Echo tool, handy for checking a client round-trip without touching an API

use async_trait::async_trait;
use serde_json::Value;

use super::{ToolHandler, json_schema, required_str};
use crate::credential::Credential;
use crate::error::CatalogError;

pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo a message back to the caller."
    }

    fn input_schema(&self) -> Value {
        json_schema(
            serde_json::json!({
                "message": {"type": "string", "description": "Text to echo"}
            }),
            vec!["message"],
        )
    }

    async fn execute(
        &self,
        input: Value,
        _credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let message = required_str(&input, "message")?;
        Ok(format!("Tool echo: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_echo() {
        let out = EchoTool
            .execute(serde_json::json!({"message": "hi"}), None)
            .await
            .unwrap();
        assert_eq!(out, "Tool echo: hi");
    }

    #[tokio::test]
    async fn test_echo_requires_message() {
        let err = EchoTool.execute(serde_json::json!({}), None).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidInput(_)));
    }
}
