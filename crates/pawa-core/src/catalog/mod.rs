//! A catalog bundles the tools, resource templates and prompts one MCP server exposes

use serde_json::Value;

use crate::credential::Credential;
use crate::error::CatalogError;
use crate::prompts::{PromptDefinition, PromptMessage, PromptRegistry};
use crate::resources::{ResourceContents, ResourceRegistry, ResourceTemplateDefinition};
use crate::tools::{ToolDefinition, ToolRegistry};

pub mod lettscore;
pub mod pawapay;

/// Everything a server can do on behalf of a client
#[derive(Default)]
pub struct Catalog {
    pub tools: ToolRegistry,
    pub resources: ResourceRegistry,
    pub prompts: PromptRegistry,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools.list_tools()
    }

    pub async fn call_tool(
        &self,
        name: &str,
        arguments: Value,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        self.tools.execute(name, arguments, credential).await
    }

    pub fn list_resource_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.resources.list_templates()
    }

    pub async fn read_resource(
        &self,
        uri: &str,
        credential: Option<&Credential>,
    ) -> Result<ResourceContents, CatalogError> {
        self.resources.read(uri, credential).await
    }

    pub fn list_prompts(&self) -> Vec<PromptDefinition> {
        self.prompts.list_prompts()
    }

    pub fn get_prompt(&self, name: &str, arguments: &Value) -> Result<Vec<PromptMessage>, CatalogError> {
        self.prompts.render(name, arguments)
    }
}
