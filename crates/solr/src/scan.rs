//! Index scans through the Solr terms component.
//!
//! A [`SolrScan`] enumerates indexed terms of a field together with their
//! document frequencies. Every `with_*` setter replaces what an earlier call
//! stored for the same parameter, so repeated calls never accumulate values.
//!
//! ```no_run
//! # async fn scan(client: helios_solr::client::DynSolrClient) -> helios_solr::SolrResult<()> {
//! use helios_solr::scan::{SolrScan, SortType};
//!
//! let terms = SolrScan::new(client, "books")
//!     .with_field("title")
//!     .with_prefix("ga")
//!     .with_limit(20)
//!     .with_sort(SortType::Index)
//!     .execute()
//!     .await?;
//! for term in terms.terms("title").unwrap_or_default() {
//!     println!("{} {}", term.term, term.frequency);
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::client::{CloudSolrClient, DynSolrClient, SolrRequest};
use crate::error::{ConfigError, SolrError, SolrResult};
use crate::params::SolrParams;
use crate::response::TermsResponse;

const HANDLER: &str = "/terms";

const FIELD: &str = "terms.fl";
const LIMIT: &str = "terms.limit";
const LOWER: &str = "terms.lower";
const LOWER_INCLUSIVE: &str = "terms.lower.incl";
const MIN_COUNT: &str = "terms.mincount";
const MAX_COUNT: &str = "terms.maxcount";
const PREFIX: &str = "terms.prefix";
const RAW: &str = "terms.raw";
const REGEX: &str = "terms.regex";
const REGEX_FLAG: &str = "terms.regex.flag";
const SORT: &str = "terms.sort";
const UPPER: &str = "terms.upper";
const UPPER_INCLUSIVE: &str = "terms.upper.incl";

/// Flags modifying how `terms.regex` is interpreted.
///
/// These mirror the flags of the Java regular expression engine Solr uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegexFlag {
    /// Canonical equivalence.
    CanonEq,
    /// Case-insensitive matching.
    CaseInsensitive,
    /// Whitespace and comments permitted in the pattern.
    Comments,
    /// `.` matches line terminators.
    Dotall,
    /// The pattern is a literal string.
    Literal,
    /// `^` and `$` match at line boundaries.
    Multiline,
    /// Unicode-aware case folding.
    UnicodeCase,
    /// Only `\n` is a line terminator.
    UnixLines,
}

impl RegexFlag {
    /// All flags, in declaration order.
    pub const ALL: [RegexFlag; 8] = [
        RegexFlag::CanonEq,
        RegexFlag::CaseInsensitive,
        RegexFlag::Comments,
        RegexFlag::Dotall,
        RegexFlag::Literal,
        RegexFlag::Multiline,
        RegexFlag::UnicodeCase,
        RegexFlag::UnixLines,
    ];

    /// The flag's canonical upper-case name, e.g. `CASE_INSENSITIVE`.
    pub fn name(self) -> &'static str {
        match self {
            RegexFlag::CanonEq => "CANON_EQ",
            RegexFlag::CaseInsensitive => "CASE_INSENSITIVE",
            RegexFlag::Comments => "COMMENTS",
            RegexFlag::Dotall => "DOTALL",
            RegexFlag::Literal => "LITERAL",
            RegexFlag::Multiline => "MULTILINE",
            RegexFlag::UnicodeCase => "UNICODE_CASE",
            RegexFlag::UnixLines => "UNIX_LINES",
        }
    }

    /// The parameter value Solr expects, e.g. `case_insensitive`.
    pub fn param_value(self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for RegexFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegexFlag {
    type Err = SolrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_uppercase();
        RegexFlag::ALL
            .into_iter()
            .find(|flag| flag.name() == upper)
            .ok_or_else(|| {
                ConfigError::UnknownRegexFlag {
                    value: s.to_string(),
                }
                .into()
            })
    }
}

/// Ordering of returned terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortType {
    /// Highest document frequency first (Solr's default).
    #[default]
    Count,
    /// Index (lexicographic byte) order.
    Index,
}

impl SortType {
    /// The parameter value Solr expects.
    pub fn as_str(self) -> &'static str {
        match self {
            SortType::Count => "count",
            SortType::Index => "index",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortType {
    type Err = SolrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "COUNT" => Ok(SortType::Count),
            "INDEX" => Ok(SortType::Index),
            _ => Err(ConfigError::UnknownSortType {
                value: s.to_string(),
            }
            .into()),
        }
    }
}

/// A terms-component request against one collection.
#[derive(Clone)]
pub struct SolrScan {
    client: DynSolrClient,
    collection: String,
    params: SolrParams,
}

impl fmt::Debug for SolrScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolrScan")
            .field("collection", &self.collection)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl SolrScan {
    /// Creates a scan for `collection` with no parameters set.
    pub fn new(client: DynSolrClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            params: SolrParams::new(),
        }
    }

    /// Creates a scan that works across every shard of a SolrCloud collection.
    ///
    /// The terms component does not fan out over shards on its own, so the
    /// cluster state is read once here and, when the collection has more than
    /// one shard, the request is given explicit `shards` routing.
    pub async fn for_cloud(
        client: Arc<CloudSolrClient>,
        collection: impl Into<String>,
    ) -> SolrResult<Self> {
        let collection = collection.into();
        let shard_urls = match client.doc_collection(&collection).await? {
            Some(doc_collection) => doc_collection.active_shard_urls(),
            None => Vec::new(),
        };

        let mut scan = Self::new(client, collection);
        if shard_urls.len() > 1 {
            tracing::debug!(
                collection = %scan.collection,
                shards = shard_urls.len(),
                "Routing terms request over shards"
            );
            scan.params.add("shards.qt", HANDLER);
            scan.params.add("shards", shard_urls.join(","));
        }
        Ok(scan)
    }

    /// The target collection.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// The parameters that will be sent.
    pub fn params(&self) -> &SolrParams {
        &self.params
    }

    /// Appends a raw parameter, keeping earlier values of the same name.
    pub fn with_param(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.params.add(name, value);
        self
    }

    /// Sets the field to scan.
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.params.set(FIELD, field.into());
        self
    }

    /// The field to scan.
    ///
    /// Fails if more than one field is present, which can only happen when a
    /// field was also added through [`with_param`](Self::with_param).
    pub fn field(&self) -> SolrResult<Option<&str>> {
        match self.params.get_all(FIELD) {
            [] => Ok(None),
            [field] => Ok(Some(field.as_str())),
            _ => Err(ConfigError::MultipleValues {
                param: FIELD.to_string(),
                context: "scan".to_string(),
            }
            .into()),
        }
    }

    /// Sets the maximum number of terms returned. Negative means unlimited.
    pub fn with_limit(mut self, limit: i32) -> Self {
        self.params.set(LIMIT, limit);
        self
    }

    /// Maximum number of terms returned (default 10).
    pub fn limit(&self) -> SolrResult<i32> {
        self.params.parse_or(LIMIT, 10)
    }

    /// Sets the term to start at.
    pub fn with_lower(mut self, lower: impl Into<String>) -> Self {
        self.params.set(LOWER, lower.into());
        self
    }

    /// The term to start at.
    pub fn lower(&self) -> Option<&str> {
        self.params.get(LOWER)
    }

    /// Sets whether the lower bound itself is included.
    pub fn with_lower_inclusive(mut self, inclusive: bool) -> Self {
        self.params.set(LOWER_INCLUSIVE, inclusive);
        self
    }

    /// Whether the lower bound is included (default `true`).
    pub fn is_lower_inclusive(&self) -> SolrResult<bool> {
        self.params.parse_or(LOWER_INCLUSIVE, true)
    }

    /// Sets the minimum document frequency of returned terms.
    pub fn with_min_count(mut self, min_count: i32) -> Self {
        self.params.set(MIN_COUNT, min_count);
        self
    }

    /// Minimum document frequency (default 1).
    pub fn min_count(&self) -> SolrResult<i32> {
        self.params.parse_or(MIN_COUNT, 1)
    }

    /// Sets the maximum document frequency of returned terms.
    pub fn with_max_count(mut self, max_count: i32) -> Self {
        self.params.set(MAX_COUNT, max_count);
        self
    }

    /// Maximum document frequency (default -1, unbounded).
    pub fn max_count(&self) -> SolrResult<i32> {
        self.params.parse_or(MAX_COUNT, -1)
    }

    /// Restricts terms to those starting with `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.params.set(PREFIX, prefix.into());
        self
    }

    /// The required term prefix.
    pub fn prefix(&self) -> Option<&str> {
        self.params.get(PREFIX)
    }

    /// Sets whether terms are returned in their raw internal form.
    pub fn with_raw(mut self, raw: bool) -> Self {
        self.params.set(RAW, raw);
        self
    }

    /// Whether raw terms are requested (default `false`).
    pub fn is_raw(&self) -> SolrResult<bool> {
        self.params.parse_or(RAW, false)
    }

    /// Restricts terms to those matching `regex`.
    pub fn with_regex(mut self, regex: impl Into<String>) -> Self {
        self.params.set(REGEX, regex.into());
        self
    }

    /// The term regular expression.
    pub fn regex(&self) -> Option<&str> {
        self.params.get(REGEX)
    }

    /// Replaces the regex flags with `flags`.
    pub fn with_regex_flags<I>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = RegexFlag>,
    {
        self.params
            .set_all(REGEX_FLAG, flags.into_iter().map(RegexFlag::param_value));
        self
    }

    /// The regex flags, in the order they were set.
    pub fn regex_flags(&self) -> SolrResult<Vec<RegexFlag>> {
        self.params
            .get_all(REGEX_FLAG)
            .iter()
            .map(|raw| raw.parse())
            .collect()
    }

    /// Sets the ordering of returned terms.
    pub fn with_sort(mut self, sort: SortType) -> Self {
        self.params.set(SORT, sort.as_str());
        self
    }

    /// The ordering of returned terms (default [`SortType::Count`]).
    pub fn sort(&self) -> SolrResult<SortType> {
        self.params.get(SORT).map_or(Ok(SortType::Count), str::parse)
    }

    /// Sets the term to stop at.
    pub fn with_upper(mut self, upper: impl Into<String>) -> Self {
        self.params.set(UPPER, upper.into());
        self
    }

    /// The term to stop at.
    pub fn upper(&self) -> Option<&str> {
        self.params.get(UPPER)
    }

    /// Sets whether the upper bound itself is included.
    pub fn with_upper_inclusive(mut self, inclusive: bool) -> Self {
        self.params.set(UPPER_INCLUSIVE, inclusive);
        self
    }

    /// Whether the upper bound is included (default `false`).
    pub fn is_upper_inclusive(&self) -> SolrResult<bool> {
        self.params.parse_or(UPPER_INCLUSIVE, false)
    }

    /// Sends the scan and returns the terms per field.
    pub async fn execute(&self) -> SolrResult<TermsResponse> {
        let request = SolrRequest::get(HANDLER, self.params.clone());
        let response = self.client.request(&self.collection, request).await?;
        TermsResponse::from_response(&response)
    }
}
