//! Thin JSON-over-HTTP helper shared by the pawaPay and LettsCore clients

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::DownstreamError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Base URL plus a pooled reqwest client
#[derive(Clone, Debug)]
pub(crate) struct JsonApi {
    http: Client,
    base_url: String,
    label: &'static str,
}

impl JsonApi {
    pub(crate) fn new(label: &'static str, base_url: impl Into<String>) -> Self {
        // Builder only fails if the TLS backend cannot initialise; fall back to defaults.
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            label,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: Option<&Credential>,
    ) -> Result<T, DownstreamError> {
        let url = self.url(path);
        let request = self.http.get(&url);
        self.send(url, request, credential).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        credential: Option<&Credential>,
    ) -> Result<T, DownstreamError> {
        let url = self.url(path);
        let request = self.http.post(&url).json(body);
        self.send(url, request, credential).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: String,
        request: RequestBuilder,
        credential: Option<&Credential>,
    ) -> Result<T, DownstreamError> {
        let mut request = request.header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(cred) = credential {
            request = request.bearer_auth(cred.expose());
        }

        debug!(
            api = self.label,
            url = %url,
            has_credential = credential.is_some(),
            "Downstream request"
        );

        let response = request.send().await.map_err(|source| {
            warn!(api = self.label, "Request to {} failed: {}", url, source);
            DownstreamError::Network {
                url: url.clone(),
                source,
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| DownstreamError::Network {
                url: url.clone(),
                source,
            })?;

        if !status.is_success() {
            warn!(api = self.label, status = %status, "Downstream call to {} rejected", url);
            return Err(DownstreamError::HttpStatus { status, body });
        }

        serde_json::from_str(&body).map_err(|source| DownstreamError::Decode { url, source })
    }
}
