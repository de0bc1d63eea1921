//! Document searches through the standard request handler.
//!
//! [`SolrSearch`] sends a single query and returns the response as Solr
//! produced it. For result sets too large for one page,
//! [`SolrSearch::execute_for_cursor_based_iteration`] walks every matching
//! document using Solr's cursor tokens.
//!
//! ```no_run
//! # async fn search(client: helios_solr::client::DynSolrClient) -> helios_solr::SolrResult<()> {
//! use helios_solr::search::{SolrSearch, SortClause};
//!
//! let mut docs = SolrSearch::new(client, "books")
//!     .with_query("*:*")
//!     .with_rows(100)
//!     .with_fields(["id"])
//!     .with_sort_clauses([SortClause::asc("id")])
//!     .execute_for_cursor_based_iteration()
//!     .await?;
//!
//! println!("{} matches", docs.size());
//! while let Some(doc) = docs.next().await? {
//!     println!("{:?}", doc.first_str("id"));
//! }
//! # Ok(())
//! # }
//! ```

mod cursor;

use std::fmt;

use crate::client::{DynSolrClient, SolrRequest};
use crate::error::{ConfigError, SolrError, SolrResult};
use crate::params::SolrParams;
use crate::response::QueryResponse;

pub use cursor::{CursorResultSet, START_CURSOR_MARK};

const HANDLER: &str = "/select";

const QUERY: &str = "q";
const ROWS: &str = "rows";
const START: &str = "start";
const SORT: &str = "sort";
const FIELDS: &str = "fl";

/// Direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// The keyword Solr expects.
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// One `sort` entry: a field or function plus a direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortClause {
    /// The field name or function query to sort on.
    pub item: String,
    /// The sort direction.
    pub order: SortOrder,
}

impl SortClause {
    /// Creates a sort clause.
    pub fn new(item: impl Into<String>, order: SortOrder) -> Self {
        Self {
            item: item.into(),
            order,
        }
    }

    /// Ascending on `item`.
    pub fn asc(item: impl Into<String>) -> Self {
        Self::new(item, SortOrder::Asc)
    }

    /// Descending on `item`.
    pub fn desc(item: impl Into<String>) -> Self {
        Self::new(item, SortOrder::Desc)
    }

    /// Parses one `item direction` clause, as found in a `sort` parameter.
    pub fn parse(clause: &str) -> SolrResult<Self> {
        let invalid = || -> SolrError {
            ConfigError::InvalidParameter {
                name: SORT.to_string(),
                value: clause.to_string(),
                message: "expected '<field> asc|desc'".to_string(),
            }
            .into()
        };

        let (item, order) = clause.trim().rsplit_once(' ').ok_or_else(invalid)?;
        let order = match order.to_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => return Err(invalid()),
        };
        let item = item.trim();
        if item.is_empty() {
            return Err(invalid());
        }
        Ok(Self::new(item, order))
    }
}

impl fmt::Display for SortClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.item, self.order.as_str())
    }
}

/// A search request against one collection.
#[derive(Clone)]
pub struct SolrSearch {
    client: DynSolrClient,
    collection: String,
    params: SolrParams,
    sort_clauses: Vec<SortClause>,
    fields: Vec<String>,
}

impl fmt::Debug for SolrSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolrSearch")
            .field("collection", &self.collection)
            .field("params", &self.params)
            .field("sort_clauses", &self.sort_clauses)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl SolrSearch {
    /// Creates a search for `collection` with no parameters set.
    pub fn new(client: DynSolrClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            params: SolrParams::new(),
            sort_clauses: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// The target collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Appends a raw parameter such as `fq` or `facet.field`.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.add(name, value);
        self
    }

    /// Sets the query string (`q`).
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        self.params.set(QUERY, q.into());
        self
    }

    /// The query string.
    pub fn query(&self) -> Option<&str> {
        self.params.get(QUERY)
    }

    /// Sets the maximum number of documents per response.
    pub fn with_rows(mut self, rows: u32) -> Self {
        self.params.set(ROWS, rows);
        self
    }

    /// Maximum documents per response, if set.
    pub fn rows(&self) -> SolrResult<Option<u32>> {
        self.params.get(ROWS).map(|_| self.params.parse_or(ROWS, 0)).transpose()
    }

    /// Sets the offset of the first returned document.
    pub fn with_start(mut self, start: u32) -> Self {
        self.params.set(START, start);
        self
    }

    /// Offset of the first returned document, if set.
    pub fn start(&self) -> SolrResult<Option<u32>> {
        self.params.get(START).map(|_| self.params.parse_or(START, 0)).transpose()
    }

    /// Replaces the sort clauses.
    pub fn with_sort_clauses<I>(mut self, clauses: I) -> Self
    where
        I: IntoIterator<Item = SortClause>,
    {
        self.sort_clauses = clauses.into_iter().collect();
        self
    }

    /// The sort clauses, in priority order.
    pub fn sort_clauses(&self) -> &[SortClause] {
        &self.sort_clauses
    }

    /// Replaces the list of returned fields.
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// The returned fields; empty means Solr's default field list.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// The parameters that will be sent.
    pub fn params(&self) -> SolrParams {
        let mut params = self.params.clone();
        if !self.sort_clauses.is_empty() {
            let sort = self
                .sort_clauses
                .iter()
                .map(SortClause::to_string)
                .collect::<Vec<_>>()
                .join(",");
            params.set(SORT, sort);
        }
        if !self.fields.is_empty() {
            params.set(FIELDS, self.fields.join(","));
        }
        params
    }

    /// Sends the search and returns the response unmodified.
    pub async fn execute(&self) -> SolrResult<QueryResponse> {
        let request = SolrRequest::get(HANDLER, self.params());
        let body = self.client.request(&self.collection, request).await?;
        Ok(QueryResponse::new(body))
    }

    /// Starts a cursor walk over every matching document.
    ///
    /// The first page is fetched before this returns. Cursor paging requires
    /// the sort clauses to end on the collection's unique key; Solr rejects
    /// the request otherwise.
    pub async fn execute_for_cursor_based_iteration(&self) -> SolrResult<CursorResultSet> {
        CursorResultSet::start(self.client.clone(), self.collection.clone(), self.params()).await
    }
}
