//! Cursor-based iteration over a search's full result set.

use crate::client::{DynSolrClient, SolrRequest};
use crate::error::{ResponseError, SolrResult};
use crate::params::SolrParams;
use crate::response::{QueryResponse, SolrDocument};

use super::HANDLER;

const CURSOR_MARK: &str = "cursorMark";

/// Token that asks Solr for the first page.
pub const START_CURSOR_MARK: &str = "*";

/// A forward-only walk over every document matching a search.
///
/// Documents are pulled one at a time with [`next`](Self::next). When the
/// current page runs out, the next page is fetched using the token Solr
/// returned with the previous one. Solr signals the end by returning the
/// token it was sent; from then on `next` yields `None`. A finished set
/// cannot be restarted.
///
/// [`size`](Self::size) is the match count reported with the first page and
/// is not updated afterwards, so it can drift from the number of documents
/// actually yielded if the index changes during the walk.
pub struct CursorResultSet {
    client: DynSolrClient,
    collection: String,
    params: SolrParams,
    size: u64,
    page: std::vec::IntoIter<SolrDocument>,
    cursor_mark: String,
    next_cursor_mark: String,
    pages_fetched: usize,
}

impl std::fmt::Debug for CursorResultSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CursorResultSet")
            .field("collection", &self.collection)
            .field("size", &self.size)
            .field("cursor_mark", &self.cursor_mark)
            .field("next_cursor_mark", &self.next_cursor_mark)
            .field("pages_fetched", &self.pages_fetched)
            .finish_non_exhaustive()
    }
}

impl CursorResultSet {
    /// Fetches the first page.
    pub(super) async fn start(
        client: DynSolrClient,
        collection: String,
        params: SolrParams,
    ) -> SolrResult<Self> {
        let mut set = Self {
            client,
            collection,
            params,
            size: 0,
            page: Vec::new().into_iter(),
            cursor_mark: START_CURSOR_MARK.to_string(),
            next_cursor_mark: START_CURSOR_MARK.to_string(),
            pages_fetched: 0,
        };
        set.size = set.fetch(START_CURSOR_MARK.to_string()).await?;
        Ok(set)
    }

    /// Number of matching documents as reported with the first page.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of pages requested so far, including the first.
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// The token the current page was fetched with.
    pub fn cursor_mark(&self) -> &str {
        &self.cursor_mark
    }

    /// The token Solr returned with the current page.
    pub fn next_cursor_mark(&self) -> &str {
        &self.next_cursor_mark
    }

    /// Returns `true` once the last page has been fetched and drained.
    pub fn is_exhausted(&self) -> bool {
        self.page.len() == 0 && self.is_last_page()
    }

    fn is_last_page(&self) -> bool {
        self.next_cursor_mark == self.cursor_mark
    }

    /// Returns the next document, fetching the next page when needed.
    pub async fn next(&mut self) -> SolrResult<Option<SolrDocument>> {
        loop {
            if let Some(doc) = self.page.next() {
                return Ok(Some(doc));
            }
            if self.is_last_page() {
                return Ok(None);
            }
            let cursor_mark = self.next_cursor_mark.clone();
            self.fetch(cursor_mark).await?;
        }
    }

    /// Drains the remaining documents into a vector.
    pub async fn collect_remaining(mut self) -> SolrResult<Vec<SolrDocument>> {
        let mut docs = Vec::new();
        while let Some(doc) = self.next().await? {
            docs.push(doc);
        }
        Ok(docs)
    }

    /// Requests the page starting at `cursor_mark` and makes it current.
    /// Returns the page's match count.
    async fn fetch(&mut self, cursor_mark: String) -> SolrResult<u64> {
        let mut params = self.params.clone();
        params.set(CURSOR_MARK, cursor_mark.as_str());

        let body = self
            .client
            .request(&self.collection, SolrRequest::get(HANDLER, params))
            .await?;
        let response = QueryResponse::new(body);

        let next_cursor_mark = response
            .next_cursor_mark()
            .ok_or_else(|| ResponseError::ElementNotFound {
                element: "nextCursorMark".to_string(),
            })?
            .to_string();
        let results = response.results()?;

        self.pages_fetched += 1;
        tracing::debug!(
            collection = %self.collection,
            cursor_mark = %cursor_mark,
            next_cursor_mark = %next_cursor_mark,
            docs = results.docs.len(),
            page = self.pages_fetched,
            "Fetched cursor page"
        );

        self.cursor_mark = cursor_mark;
        self.next_cursor_mark = next_cursor_mark;
        self.page = results.docs.into_iter();
        Ok(results.num_found)
    }
}
