//! Resource templates (`scheme://{variable}`) and their registry

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::CatalogError;

const RESERVED: [char; 3] = ['/', '?', '#'];

/// A URI template with at most one `{variable}` segment, e.g. `deposit://{depositId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriTemplate {
    raw: String,
    prefix: String,
    variable: Option<String>,
    suffix: String,
}

impl UriTemplate {
    pub fn new(raw: &str) -> Self {
        let parsed = raw.find('{').and_then(|open| {
            let close = open + raw[open..].find('}')?;
            Some((open, close))
        });
        match parsed {
            Some((open, close)) => Self {
                raw: raw.to_string(),
                prefix: raw[..open].to_string(),
                variable: Some(raw[open + 1..close].to_string()),
                suffix: raw[close + 1..].to_string(),
            },
            None => Self {
                raw: raw.to_string(),
                prefix: raw.to_string(),
                variable: None,
                suffix: String::new(),
            },
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn variable(&self) -> Option<&str> {
        self.variable.as_deref()
    }

    /// Match a concrete URI, returning the variable's value ("" for literal templates).
    ///
    /// A variable spans a single path segment: values containing `/`, `?` or
    /// `#` do not match.
    pub fn match_uri<'a>(&self, uri: &'a str) -> Option<&'a str> {
        if self.variable.is_none() {
            return (uri == self.raw).then_some("");
        }
        let value = uri
            .strip_prefix(self.prefix.as_str())?
            .strip_suffix(self.suffix.as_str())?;
        let single_segment = !value.contains(RESERVED);
        (!value.is_empty() && single_segment).then_some(value)
    }
}

/// Template metadata advertised by `resources/templates/list`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceTemplateDefinition {
    pub uri_template: String,
    pub name: String,
    pub description: String,
    pub mime_type: String,
}

/// Contents returned for one `resources/read`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

#[async_trait]
pub trait ResourceHandler: Send + Sync {
    fn name(&self) -> &str;
    fn template(&self) -> &UriTemplate;
    fn description(&self) -> &str;
    fn mime_type(&self) -> &str {
        "text/plain"
    }
    /// Produce the text for `uri`; `value` is the template variable extracted from it.
    async fn read(
        &self,
        uri: &str,
        value: &str,
        credential: Option<&Credential>,
    ) -> Result<String, CatalogError>;
}

/// Registry of resource templates, matched in registration order
#[derive(Default)]
pub struct ResourceRegistry {
    handlers: Vec<Arc<dyn ResourceHandler>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ResourceHandler>) {
        debug!("Registering resource template: {}", handler.template().as_str());
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn list_templates(&self) -> Vec<ResourceTemplateDefinition> {
        self.handlers
            .iter()
            .map(|h| ResourceTemplateDefinition {
                uri_template: h.template().as_str().to_string(),
                name: h.name().to_string(),
                description: h.description().to_string(),
                mime_type: h.mime_type().to_string(),
            })
            .collect()
    }

    pub async fn read(
        &self,
        uri: &str,
        credential: Option<&Credential>,
    ) -> Result<ResourceContents, CatalogError> {
        for handler in &self.handlers {
            if let Some(value) = handler.template().match_uri(uri) {
                debug!(
                    has_credential = credential.is_some(),
                    "Reading resource {} via {}",
                    uri,
                    handler.name()
                );
                let text = handler.read(uri, value, credential).await.map_err(|e| {
                    warn!("Resource {} failed: {}", uri, e);
                    e
                })?;
                return Ok(ResourceContents {
                    uri: uri.to_string(),
                    mime_type: handler.mime_type().to_string(),
                    text,
                });
            }
        }
        Err(CatalogError::UnknownResource(uri.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_with_variable() {
        let t = UriTemplate::new("deposit://{depositId}");
        assert_eq!(t.variable(), Some("depositId"));
        assert_eq!(t.match_uri("deposit://abc-123"), Some("abc-123"));
        assert_eq!(t.match_uri("deposit://"), None);
        assert_eq!(t.match_uri("content://abc"), None);
    }

    #[test]
    fn test_template_with_suffix() {
        let t = UriTemplate::new("users://{id}/profile");
        assert_eq!(t.match_uri("users://42/profile"), Some("42"));
        assert_eq!(t.match_uri("users://42"), None);
    }

    #[test]
    fn test_variable_is_a_single_segment() {
        let t = UriTemplate::new("deposit://{depositId}");
        assert_eq!(t.match_uri("deposit://x/../active-conf"), None);
        assert_eq!(t.match_uri("deposit://x?limit=1"), None);
        assert_eq!(t.match_uri("deposit://x#frag"), None);
        assert_eq!(t.match_uri("deposit://a,b"), Some("a,b"));
    }

    #[test]
    fn test_literal_template() {
        let t = UriTemplate::new("config://app");
        assert_eq!(t.variable(), None);
        assert_eq!(t.match_uri("config://app"), Some(""));
        assert_eq!(t.match_uri("config://other"), None);
    }

    struct Upper {
        template: UriTemplate,
    }

    #[async_trait]
    impl ResourceHandler for Upper {
        fn name(&self) -> &str {
            "upper"
        }
        fn template(&self) -> &UriTemplate {
            &self.template
        }
        fn description(&self) -> &str {
            "Uppercases the variable"
        }
        async fn read(
            &self,
            _uri: &str,
            value: &str,
            credential: Option<&Credential>,
        ) -> Result<String, CatalogError> {
            Ok(format!(
                "{}:{}",
                value.to_uppercase(),
                credential.map(|c| c.expose()).unwrap_or("-")
            ))
        }
    }

    fn registry() -> ResourceRegistry {
        let mut registry = ResourceRegistry::new();
        registry.register(Arc::new(Upper {
            template: UriTemplate::new("upper://{text}"),
        }));
        registry
    }

    #[tokio::test]
    async fn test_registry_read() {
        let cred = Credential::new("k");
        let contents = registry().read("upper://abc", Some(&cred)).await.unwrap();
        assert_eq!(contents.uri, "upper://abc");
        assert_eq!(contents.text, "ABC:k");
        assert_eq!(contents.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_registry_unknown_uri() {
        let err = registry().read("lower://abc", None).await.unwrap_err();
        assert!(matches!(err, CatalogError::UnknownResource(_)));
    }

    #[test]
    fn test_list_templates() {
        let templates = registry().list_templates();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].uri_template, "upper://{text}");
        assert_eq!(templates[0].name, "upper");
    }
}
