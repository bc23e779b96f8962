//! Process configuration: optional TOML file overlaid with environment variables

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::credential::Credential;
use crate::error::ConfigError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVER_VERSION: &str = "1.0.0";
pub const DEFAULT_PAWAPAY_API_URL: &str = "https://api.sandbox.pawapay.cloud";
pub const DEFAULT_PAWAPAY_SERVER_NAME: &str = "pawaPay MCP Transactions";
pub const DEFAULT_LETTSCORE_SERVER_NAME: &str = "LettsCore MCP Server";

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub pawapay: PawaPayConfig,
    pub lettscore: LettsCoreConfig,
}

/// HTTP listener and MCP identity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Overrides the per-catalog server name reported in `initialize`
    pub name: Option<String>,
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            name: None,
            version: DEFAULT_SERVER_VERSION.to_string(),
        }
    }
}

/// pawaPay merchant API
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PawaPayConfig {
    pub api_url: String,
    /// Process-wide default credential, used when a session supplies none
    pub api_key: Option<String>,
}

impl Default for PawaPayConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_PAWAPAY_API_URL.to_string(),
            api_key: None,
        }
    }
}

impl fmt::Debug for PawaPayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PawaPayConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// LettsCore content API
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LettsCoreConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
}

impl fmt::Debug for LettsCoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LettsCoreConfig")
            .field("api_url", &self.api_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Config {
    /// Load from an optional TOML file, then apply environment overrides.
    ///
    /// Variables from a `.env` file (current directory or a parent) fill in
    /// whatever the process environment leaves unset.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        let dotenv = env_file_values(dotenvy::dotenv_iter());
        base.with_env(layered(|key| std::env::var(key).ok(), dotenv))
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;
        let config: Config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: shown.clone(),
            source,
        })?;
        debug!("Loaded config from {}", shown);
        Ok(config)
    }

    /// Overlay values from an environment lookup. Empty values count as unset.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                reason: format!("'{}' is not a valid port", port),
            })?;
        }
        if let Some(name) = get("MCP_SERVER_NAME") {
            self.server.name = Some(name);
        }
        if let Some(version) = get("MCP_SERVER_VERSION") {
            self.server.version = version;
        }
        if let Some(url) = get("PAWAPAY_API_URL") {
            self.pawapay.api_url = url;
        }
        if let Some(key) = get("PAWAPAY_API_KEY") {
            self.pawapay.api_key = Some(key);
        }
        if let Some(url) = get("LETTS_CORE_API_URL") {
            self.lettscore.api_url = Some(url);
        }
        if let Some(token) = get("LETTS_CORE_API_TOKEN") {
            self.lettscore.api_token = Some(token);
        }
        Ok(self)
    }

    /// `host:port` for the SSE listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Server name for a catalog, honoring the configured override
    pub fn server_name(&self, fallback: &str) -> String {
        self.server
            .name
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Validated pawaPay base URL
    pub fn pawapay_api_url(&self) -> Result<String, ConfigError> {
        validate_url("PAWAPAY_API_URL", &self.pawapay.api_url)
    }

    /// Default pawaPay credential for sessions that bring none
    pub fn pawapay_credential(&self) -> Option<Credential> {
        Credential::from_optional(self.pawapay.api_key.clone())
    }

    /// LettsCore URL and token; both are mandatory for the STDIO server.
    pub fn lettscore_settings(&self) -> Result<(String, Credential), ConfigError> {
        let url = self
            .lettscore
            .api_url
            .as_deref()
            .ok_or(ConfigError::Missing("LETTS_CORE_API_URL"))?;
        let url = validate_url("LETTS_CORE_API_URL", url)?;
        let token = Credential::from_optional(self.lettscore.api_token.clone())
            .ok_or(ConfigError::Missing("LETTS_CORE_API_TOKEN"))?;
        Ok((url, token))
    }
}

/// Collect a `.env` file's entries; a missing file yields none.
fn env_file_values<R: std::io::Read>(
    iter: dotenvy::Result<dotenvy::Iter<R>>,
) -> HashMap<String, String> {
    let iter = match iter {
        Ok(iter) => iter,
        Err(e) => {
            if !e.not_found() {
                warn!("Ignoring unreadable .env file: {}", e);
            }
            return HashMap::new();
        }
    };
    let values: HashMap<String, String> = iter
        .filter_map(|entry| match entry {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!("Skipping malformed .env line: {}", e);
                None
            }
        })
        .collect();
    debug!("Loaded {} variables from .env", values.len());
    values
}

/// Process environment first, `.env` values second
fn layered<F>(primary: F, fallback: HashMap<String, String>) -> impl Fn(&str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    move |key| primary(key).or_else(|| fallback.get(key).cloned())
}

fn validate_url(key: &'static str, raw: &str) -> Result<String, ConfigError> {
    let parsed = url::Url::parse(raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: format!("'{}': {}", raw, e),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default().with_env(env(&[])).unwrap();
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.version, "1.0.0");
        assert_eq!(config.pawapay.api_url, DEFAULT_PAWAPAY_API_URL);
        assert!(config.pawapay_credential().is_none());
        assert_eq!(
            config.server_name(DEFAULT_PAWAPAY_SERVER_NAME),
            "pawaPay MCP Transactions"
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env(env(&[
                ("HOST", "0.0.0.0"),
                ("PORT", "8080"),
                ("MCP_SERVER_NAME", "Custom"),
                ("PAWAPAY_API_KEY", "default-key"),
                ("PAWAPAY_API_URL", "https://api.pawapay.cloud/"),
            ]))
            .unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server_name(DEFAULT_PAWAPAY_SERVER_NAME), "Custom");
        assert_eq!(
            config.pawapay_credential(),
            Some(Credential::new("default-key"))
        );
        assert_eq!(config.pawapay_api_url().unwrap(), "https://api.pawapay.cloud");
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let config = Config::default()
            .with_env(env(&[("PORT", ""), ("PAWAPAY_API_KEY", "  ")]))
            .unwrap();
        assert_eq!(config.server.port, 3000);
        assert!(config.pawapay_credential().is_none());
    }

    #[test]
    fn test_invalid_port_rejected() {
        let result = Config::default().with_env(env(&[("PORT", "not-a-port")]));
        assert!(matches!(result, Err(ConfigError::Invalid { key: "PORT", .. })));
    }

    #[test]
    fn test_lettscore_settings_required() {
        let config = Config::default();
        assert!(matches!(
            config.lettscore_settings(),
            Err(ConfigError::Missing("LETTS_CORE_API_URL"))
        ));

        let config = Config::default()
            .with_env(env(&[("LETTS_CORE_API_URL", "https://core.example.com")]))
            .unwrap();
        assert!(matches!(
            config.lettscore_settings(),
            Err(ConfigError::Missing("LETTS_CORE_API_TOKEN"))
        ));

        let config = Config::default()
            .with_env(env(&[
                ("LETTS_CORE_API_URL", "https://core.example.com/"),
                ("LETTS_CORE_API_TOKEN", "tok"),
            ]))
            .unwrap();
        let (url, token) = config.lettscore_settings().unwrap();
        assert_eq!(url, "https://core.example.com");
        assert_eq!(token.expose(), "tok");
    }

    #[test]
    fn test_lettscore_url_must_be_valid() {
        let config = Config::default()
            .with_env(env(&[
                ("LETTS_CORE_API_URL", "not a url"),
                ("LETTS_CORE_API_TOKEN", "tok"),
            ]))
            .unwrap();
        assert!(matches!(
            config.lettscore_settings(),
            Err(ConfigError::Invalid {
                key: "LETTS_CORE_API_URL",
                ..
            })
        ));
    }

    #[test]
    fn test_from_file_then_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 4000

[pawapay]
api_url = "https://file.example.com"
api_key = "file-key"
"#
        )
        .unwrap();

        let config = Config::from_file(file.path())
            .unwrap()
            .with_env(env(&[("PAWAPAY_API_KEY", "env-key")]))
            .unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.host, "localhost");
        assert_eq!(config.pawapay.api_url, "https://file.example.com");
        assert_eq!(config.pawapay_credential().unwrap().expose(), "env-key");
    }

    #[test]
    fn test_env_file_fills_unset_variables() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "PAWAPAY_API_KEY=from-dotenv").unwrap();
        writeln!(file, "PORT=5000").unwrap();
        writeln!(file, "MCP_SERVER_NAME=\"Dotenv Name\"").unwrap();

        let values = env_file_values(dotenvy::from_path_iter(file.path()));
        assert_eq!(values.get("PORT").map(String::as_str), Some("5000"));

        // Real environment wins over the file
        let config = Config::default()
            .with_env(layered(env(&[("PORT", "6000")]), values))
            .unwrap();
        assert_eq!(config.server.port, 6000);
        assert_eq!(config.pawapay_credential().unwrap().expose(), "from-dotenv");
        assert_eq!(config.server_name("fallback"), "Dotenv Name");
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let values = env_file_values(dotenvy::from_path_iter("/nonexistent/.env"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file(Path::new("/nonexistent/pawa.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = Config::default()
            .with_env(env(&[("PAWAPAY_API_KEY", "very-secret")]))
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
