//! Transport seam between the request builders and a Solr deployment.
//!
//! Builders produce a [`SolrRequest`] and hand it to a [`SolrClient`]. Two
//! clients are provided:
//!
//! - [`HttpSolrClient`] - talks to a single Solr node over HTTP
//! - [`CloudSolrClient`] - talks to a SolrCloud cluster and can read its
//!   cluster state through the Collections API
//!
//! Any other transport (a test double, a proxy) only needs to implement
//! [`SolrClient::request`].

mod cloud;
mod http;

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::AsyncRead;

use crate::error::SolrResult;
use crate::params::SolrParams;

pub use cloud::{CloudSolrClient, ClusterState, DocCollection, Replica, ReplicaState, Slice};
pub use http::HttpSolrClient;

/// A shared, type-erased client.
pub type DynSolrClient = Arc<dyn SolrClient>;

/// Executes requests against a Solr collection.
#[async_trait]
pub trait SolrClient: Send + Sync {
    /// Sends `request` to `collection` and returns the parsed response tree.
    ///
    /// The request is consumed; a streamed body can only be sent once.
    async fn request(&self, collection: &str, request: SolrRequest) -> SolrResult<Value>;
}

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Parameters in the query string, no body.
    Get,
    /// Parameters in the query string, content in the body.
    Post,
}

/// A request body read from an async byte source.
pub struct RequestBody {
    content_type: String,
    reader: Pin<Box<dyn AsyncRead + Send + Sync>>,
}

impl RequestBody {
    /// Wraps `reader` as a body with the given content type.
    pub fn new<R>(content_type: impl Into<String>, reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        Self {
            content_type: content_type.into(),
            reader: Box::pin(reader),
        }
    }

    /// The MIME type sent as `Content-Type`.
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Takes the underlying reader.
    pub fn into_reader(self) -> Pin<Box<dyn AsyncRead + Send + Sync>> {
        self.reader
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// A single request to a Solr handler.
#[derive(Debug)]
pub struct SolrRequest {
    method: Method,
    path: String,
    params: SolrParams,
    body: Option<RequestBody>,
}

impl SolrRequest {
    /// Creates a GET request for a handler path such as `/select`.
    pub fn get(path: impl Into<String>, params: SolrParams) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            params,
            body: None,
        }
    }

    /// Creates a POST request carrying `body`.
    pub fn post(path: impl Into<String>, params: SolrParams, body: RequestBody) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            params,
            body: Some(body),
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// The handler path, relative to the collection.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The request parameters.
    pub fn params(&self) -> &SolrParams {
        &self.params
    }

    /// The request body, if any.
    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Splits the request into its parts.
    pub fn into_parts(self) -> (Method, String, SolrParams, Option<RequestBody>) {
        (self.method, self.path, self.params, self.body)
    }
}
