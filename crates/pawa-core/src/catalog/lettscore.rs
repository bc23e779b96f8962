//! The LettsCore catalog served over STDIO

use async_trait::async_trait;
use std::sync::Arc;

use super::Catalog;
use crate::credential::Credential;
use crate::error::CatalogError;
use crate::lettscore::LettsCoreClient;
use crate::prompts::EchoPrompt;
use crate::resources::{ResourceHandler, UriTemplate};
use crate::tools::{self, to_text};

pub fn catalog(client: LettsCoreClient) -> Catalog {
    let client = Arc::new(client);
    let mut catalog = Catalog::new();
    tools::lettscore::register_all(&mut catalog.tools, client.clone());
    catalog.resources.register(Arc::new(EchoResource::new()));
    catalog
        .resources
        .register(Arc::new(ContentResource::new(client.clone())));
    catalog
        .resources
        .register(Arc::new(ContentsResource::new(client)));
    catalog.prompts.register(Arc::new(EchoPrompt));
    catalog
}

/// `echo://{message}`
pub struct EchoResource {
    template: UriTemplate,
}

impl EchoResource {
    pub fn new() -> Self {
        Self {
            template: UriTemplate::new("echo://{message}"),
        }
    }
}

impl Default for EchoResource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResourceHandler for EchoResource {
    fn name(&self) -> &str {
        "echo"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn description(&self) -> &str {
        "Echo the message back as a resource"
    }

    async fn read(
        &self,
        _uri: &str,
        value: &str,
        _credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        Ok(format!("Resource echo: {}", value))
    }
}

/// `content://{guid}`
pub struct ContentResource {
    client: Arc<LettsCoreClient>,
    template: UriTemplate,
}

impl ContentResource {
    pub fn new(client: Arc<LettsCoreClient>) -> Self {
        Self {
            client,
            template: UriTemplate::new("content://{guid}"),
        }
    }
}

#[async_trait]
impl ResourceHandler for ContentResource {
    fn name(&self) -> &str {
        "content"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn description(&self) -> &str {
        "A single LettsCore content item by guid"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    async fn read(
        &self,
        _uri: &str,
        value: &str,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        match self.client.find_content(value, credential).await? {
            Some(item) => to_text(&item),
            None => Ok("No content".to_string()),
        }
    }
}

/// `contents://{all}`: the whole listing; the variable is ignored
pub struct ContentsResource {
    client: Arc<LettsCoreClient>,
    template: UriTemplate,
}

impl ContentsResource {
    pub fn new(client: Arc<LettsCoreClient>) -> Self {
        Self {
            client,
            template: UriTemplate::new("contents://{all}"),
        }
    }
}

#[async_trait]
impl ResourceHandler for ContentsResource {
    fn name(&self) -> &str {
        "contents"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn description(&self) -> &str {
        "Every LettsCore content item"
    }

    fn mime_type(&self) -> &str {
        "application/json"
    }

    async fn read(
        &self,
        _uri: &str,
        _value: &str,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError> {
        let items = self.client.list_content(credential).await?;
        if items.is_empty() {
            return Ok("No content".to_string());
        }
        to_text(&items)
    }
}
