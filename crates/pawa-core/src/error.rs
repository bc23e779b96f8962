//! Error types shared by the clients, the catalog and configuration

use reqwest::StatusCode;

/// Failure of an outbound call to pawaPay or LettsCore.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    /// The API answered with a non-2xx status.
    #[error("HTTP error! status: {status}")]
    HttpStatus { status: StatusCode, body: String },

    /// The request never produced a response (DNS, connect, timeout, ...).
    #[error("network error calling {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered 2xx but the body was not the JSON we expected.
    #[error("unexpected response body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl DownstreamError {
    /// HTTP status of the failed call, if the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failure while invoking a tool, reading a resource or rendering a prompt.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Resource not found: {0}")]
    UnknownResource(String),

    #[error("Unknown prompt: {0}")]
    UnknownPrompt(String),

    #[error("Invalid arguments: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Downstream(#[from] DownstreamError),

    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failure while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} is required")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_message() {
        let err = DownstreamError::HttpStatus {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 401 Unauthorized");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_catalog_error_is_transparent_over_downstream() {
        let err: CatalogError = DownstreamError::HttpStatus {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP error! status: 502 Bad Gateway");
    }

    #[test]
    fn test_config_error_messages() {
        let err = ConfigError::Missing("LETTS_CORE_API_TOKEN");
        assert_eq!(err.to_string(), "LETTS_CORE_API_TOKEN is required");

        let err = ConfigError::Invalid {
            key: "PORT",
            reason: "not a number".to_string(),
        };
        assert!(err.to_string().contains("PORT"));
    }
}
