//! A recording client with scripted responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use helios_solr::client::{Method, SolrClient, SolrRequest};
use helios_solr::{SolrError, SolrParams, SolrResult};
use serde_json::Value;
use tokio::io::AsyncReadExt;

/// A request as seen by [`MockSolrClient`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub collection: String,
    pub method: Method,
    pub path: String,
    pub params: SolrParams,
    pub content_type: Option<String>,
    pub body: Option<Vec<u8>>,
}

/// Replays queued responses in order and records every request.
///
/// When the queue runs dry the client answers with an empty JSON object.
#[derive(Clone, Default)]
pub struct MockSolrClient {
    responses: Arc<Mutex<VecDeque<SolrResult<Value>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockSolrClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response body.
    pub fn respond(&self, body: Value) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(body));
        self
    }

    /// Queues a failure.
    pub fn fail(&self, error: SolrError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> RecordedRequest {
        self.requests
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no request was sent")
    }

    /// Shares this mock as a trait object while keeping a handle for assertions.
    pub fn shared(&self) -> Arc<dyn SolrClient> {
        Arc::new(self.clone())
    }
}

#[async_trait]
impl SolrClient for MockSolrClient {
    async fn request(&self, collection: &str, request: SolrRequest) -> SolrResult<Value> {
        let (method, path, params, body) = request.into_parts();

        let (content_type, body) = match body {
            Some(body) => {
                let content_type = body.content_type().to_string();
                let mut reader = body.into_reader();
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes).await?;
                (Some(content_type), Some(bytes))
            }
            None => (None, None),
        };

        self.requests.lock().unwrap().push(RecordedRequest {
            collection: collection.to_string(),
            method,
            path,
            params,
            content_type,
            body,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Value::Object(Default::default())))
    }
}
