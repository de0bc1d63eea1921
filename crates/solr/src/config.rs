//! Client configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, SolrResult};

/// Authentication configuration for Solr.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SolrAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the HTTP Solr clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Solr base URLs, including the context path
    /// (e.g., `["http://localhost:8983/solr"]`).
    ///
    /// A standalone client uses the first URL; a cloud client sends requests
    /// to the first URL and reads cluster state from it.
    pub urls: Vec<String>,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Connect timeout in milliseconds (default: 5000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<SolrAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_request_timeout_ms() -> u64 {
    30000
}

fn default_connect_timeout_ms() -> u64 {
    5000
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            urls: vec!["http://localhost:8983/solr".to_string()],
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

impl SolrConfig {
    /// Creates a configuration for a single base URL with default settings.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            ..Default::default()
        }
    }

    /// Parses and returns every configured base URL, without trailing slashes.
    pub fn base_urls(&self) -> SolrResult<Vec<url::Url>> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoUrls.into());
        }
        self.urls.iter().map(|raw| parse_base_url(raw)).collect()
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.urls.is_empty() {
            errors.push("At least one Solr URL is required".to_string());
        }

        for raw in &self.urls {
            if let Err(e) = parse_base_url(raw) {
                errors.push(e.to_string());
            }
        }

        if self.request_timeout_ms == 0 {
            errors.push("Request timeout cannot be 0".to_string());
        }

        if self.connect_timeout_ms == 0 {
            errors.push("Connect timeout cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Parses a Solr base URL, stripping a trailing slash from its path.
pub(crate) fn parse_base_url(raw: &str) -> SolrResult<url::Url> {
    let mut url = url::Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        message: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: raw.to_string(),
            message: format!("unsupported scheme '{}'", url.scheme()),
        }
        .into());
    }

    let trimmed = url.path().trim_end_matches('/').to_string();
    url.set_path(&trimmed);
    Ok(url)
}
