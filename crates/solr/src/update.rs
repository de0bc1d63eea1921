//! Bulk loading of JSON documents.

use serde_json::Value;
use tokio::io::AsyncRead;

use crate::client::{RequestBody, SolrClient, SolrRequest};
use crate::error::SolrResult;
use crate::params::SolrParams;

const HANDLER: &str = "/update/json/docs";
const CONTENT_TYPE: &str = "application/json";

/// An update request posting a stream of JSON documents.
///
/// The stream may hold a single document, an array of documents, or
/// newline-delimited documents. It is handed to the transport unbuffered and
/// is read exactly once, when the request is processed. `json.command=false`
/// makes Solr treat the payload purely as documents, never as update
/// commands.
///
/// ```no_run
/// # async fn load(client: &helios_solr::client::HttpSolrClient) -> helios_solr::SolrResult<()> {
/// use helios_solr::update::JsonUpdateRequest;
///
/// let file = tokio::fs::File::open("books.json").await?;
/// JsonUpdateRequest::new(file)
///     .with_commit(true)
///     .process(client, "books")
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JsonUpdateRequest {
    params: SolrParams,
    body: RequestBody,
}

impl JsonUpdateRequest {
    /// Creates an update request reading documents from `reader`.
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Sync + 'static,
    {
        let mut params = SolrParams::new();
        params.set("json.command", false);
        Self {
            params,
            body: RequestBody::new(CONTENT_TYPE, reader),
        }
    }

    /// Asks Solr to commit once the documents are indexed.
    pub fn with_commit(mut self, commit: bool) -> Self {
        if commit {
            self.params.set("commit", true);
        } else {
            self.params.remove("commit");
        }
        self
    }

    /// The parameters that will be sent.
    pub fn params(&self) -> &SolrParams {
        &self.params
    }

    /// Builds the transport request.
    pub fn into_request(self) -> SolrRequest {
        SolrRequest::post(HANDLER, self.params, self.body)
    }

    /// Sends the documents to `collection`, consuming the stream.
    pub async fn process<C>(self, client: &C, collection: &str) -> SolrResult<Value>
    where
        C: SolrClient + ?Sized,
    {
        client.request(collection, self.into_request()).await
    }
}
