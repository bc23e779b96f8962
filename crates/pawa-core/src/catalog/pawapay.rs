//! The pawaPay catalog served over SSE

use async_trait::async_trait;
use std::sync::Arc;

use super::Catalog;
use crate::credential::Credential;
use crate::error::CatalogError;
use crate::pawapay::PawaPayClient;
use crate::prompts::EchoPrompt;
use crate::resources::{ResourceHandler, UriTemplate};
use crate::tools::{self, to_text};

pub fn catalog(client: PawaPayClient) -> Catalog {
    let client = Arc::new(client);
    let mut catalog = Catalog::new();
    tools::pawapay::register_all(&mut catalog.tools, client.clone());
    catalog.resources.register(Arc::new(DepositResource::new(client)));
    catalog.prompts.register(Arc::new(EchoPrompt));
    catalog
}

/// `deposit://{depositId}`; a comma-separated list looks up several deposits
pub struct DepositResource {
    client: Arc<PawaPayClient>,
    template: UriTemplate,
}

impl DepositResource {
    pub fn new(client: Arc<PawaPayClient>) -> Self {
        Self {
            client,
            template: UriTemplate::new("deposit://{depositId}"),
        }
    }
}

#[async_trait]
impl ResourceHandler for DepositResource {
    fn name(&self) -> &str {
        "deposit"
    }

    fn template(&self) -> &UriTemplate {
        &self.template
    }

    fn description(&self) -> &str {
        "Deposit details by depositId"
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
        let mut results = Vec::new();
        for id in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let lookup = self.client.get_deposit(id, credential).await?;
            results.extend(lookup.into_vec());
        }
        to_text(&results)
    }
}
