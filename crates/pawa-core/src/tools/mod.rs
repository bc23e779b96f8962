//! Tool registry and handler trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::CatalogError;

pub mod echo;
pub mod lettscore;
pub mod pawapay;

/// Tool metadata advertised to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Individual tool handler
///
/// `credential` is whatever the caller resolved for this invocation: the
/// session's own credential if it supplied one, otherwise the process default.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    async fn execute(
        &self,
        input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError>;
}

/// Registry of available tools
pub struct ToolRegistry {
    tools: HashMap<Arc<str>, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool handler; a later registration with the same name wins
    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        let name: Arc<str> = Arc::from(handler.name());
        debug!("Registering tool: {}", name);
        self.tools.insert(name, handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tool definitions, sorted by name
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self
            .tools
            .values()
            .map(|handler| ToolDefinition {
                name: handler.name().to_string(),
                description: handler.description().to_string(),
                input_schema: handler.input_schema(),
            })
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub async fn execute(
        &self,
        tool_name: &str,
        input: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        debug!(
            has_credential = credential.is_some(),
            "Executing tool: {}", tool_name
        );

        let handler = self
            .tools
            .get(tool_name)
            .ok_or_else(|| CatalogError::UnknownTool(tool_name.to_string()))?;

        match handler.execute(input, credential).await {
            Ok(result) => {
                debug!("Tool {} succeeded", tool_name);
                Ok(result)
            }
            Err(e) => {
                warn!("Tool {} failed: {}", tool_name, e);
                Err(e)
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a JSON schema for tool input
pub fn json_schema(properties: Value, required: Vec<&str>) -> Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Fetch a required string argument
pub fn required_str<'a>(input: &'a Value, key: &str) -> Result<&'a str, CatalogError> {
    input
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| CatalogError::InvalidInput(format!("missing string parameter '{}'", key)))
}

/// Fetch a required string argument that will be spliced into a URL path
pub fn required_segment<'a>(input: &'a Value, key: &str) -> Result<&'a str, CatalogError> {
    let value = required_str(input, key)?;
    if value.is_empty() || value.contains(['/', '?', '#']) {
        return Err(CatalogError::InvalidInput(format!(
            "'{}' must be a single path segment",
            key
        )));
    }
    Ok(value)
}

/// Serialize a downstream response as the text body of a tool result
pub fn to_text<T: Serialize>(value: &T) -> Result<String, CatalogError> {
    Ok(serde_json::to_string(value)?)
}
