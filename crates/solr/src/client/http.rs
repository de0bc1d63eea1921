//! Single-node HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::io::ReaderStream;

use crate::config::{SolrAuth, SolrConfig};
use crate::error::{ConfigError, SolrError, SolrResult};

use super::{Method, SolrClient, SolrRequest};

/// A client for one Solr node, e.g. `http://localhost:8983/solr`.
///
/// Every request asks for a JSON response (`wt=json`). Non-success statuses
/// are turned into [`SolrError::Server`] carrying Solr's `error.msg` when the
/// body has one.
#[derive(Debug, Clone)]
pub struct HttpSolrClient {
    http: reqwest::Client,
    base_url: url::Url,
    auth: Option<SolrAuth>,
}

impl HttpSolrClient {
    /// Creates a client for the first URL in `config`.
    pub fn new(config: &SolrConfig) -> SolrResult<Self> {
        let base_url = config
            .base_urls()?
            .into_iter()
            .next()
            .ok_or(ConfigError::NoUrls)?;
        Self::with_base_url(config, base_url)
    }

    /// Creates a client for `base_url`, taking timeouts and auth from `config`.
    pub(crate) fn with_base_url(config: &SolrConfig, base_url: url::Url) -> SolrResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            auth: config.auth.clone(),
        })
    }

    /// Returns the node's base URL.
    pub fn base_url(&self) -> &url::Url {
        &self.base_url
    }

    /// Builds the URL for `path` under `collection`. An empty collection
    /// addresses node-level handlers such as `/admin/collections`.
    fn handler_url(&self, collection: &str, path: &str) -> SolrResult<url::Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let raw = if collection.is_empty() {
            format!("{}/{}", base, path)
        } else {
            format!("{}/{}/{}", base, collection, path)
        };
        url::Url::parse(&raw).map_err(|e| {
            ConfigError::InvalidUrl {
                url: raw.clone(),
                message: e.to_string(),
            }
            .into()
        })
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            Some(SolrAuth::Basic {
                ref username,
                ref password,
            }) => builder.basic_auth(username, Some(password)),
            Some(SolrAuth::Bearer { ref token }) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

#[async_trait]
impl SolrClient for HttpSolrClient {
    async fn request(&self, collection: &str, request: SolrRequest) -> SolrResult<Value> {
        let (method, path, mut params, body) = request.into_parts();
        params.set("wt", "json");

        let mut url = self.handler_url(collection, &path)?;
        url.set_query(Some(&params.to_string()));

        tracing::debug!(
            collection = %collection,
            path = %path,
            method = ?method,
            params = %params,
            "Sending Solr request"
        );

        let mut builder = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
        };
        builder = self.apply_auth(builder);

        if let Some(body) = body {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, body.content_type().to_string())
                .body(reqwest::Body::wrap_stream(ReaderStream::new(
                    body.into_reader(),
                )));
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(SolrError::Server {
                status: status.as_u16(),
                message: server_error_message(&text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

/// Extracts `error.msg` from a Solr error body, falling back to the raw text.
fn server_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/msg")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
