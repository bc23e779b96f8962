//! LettsCore content API client

use serde::Deserialize;
use serde_json::Value;

use crate::credential::Credential;
use crate::error::DownstreamError;
use crate::http::JsonApi;

/// Authenticated calls wrap the list in `{"data": [...]}`; anonymous ones
/// return the bare array. Items are passed through untouched: their fields
/// vary between accounts and API versions.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum ContentListing {
    Envelope { data: Vec<Value> },
    Bare(Vec<Value>),
}

/// Client for the LettsCore content API
#[derive(Clone, Debug)]
pub struct LettsCoreClient {
    api: JsonApi,
}

impl LettsCoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: JsonApi::new("lettscore", base_url),
        }
    }

    /// List all content visible to the credential
    pub async fn list_content(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Vec<Value>, DownstreamError> {
        let listing: ContentListing = self.api.get("/content", credential).await?;
        Ok(match listing {
            ContentListing::Envelope { data } => data,
            ContentListing::Bare(items) => items,
        })
    }

    /// Find a single item by guid
    pub async fn find_content(
        &self,
        guid: &str,
        credential: Option<&Credential>,
    ) -> Result<Option<Value>, DownstreamError> {
        let items = self.list_content(credential).await?;
        Ok(items
            .into_iter()
            .find(|item| item.get("guid").and_then(Value::as_str) == Some(guid)))
    }
}
