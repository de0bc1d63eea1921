//! Typed views over Solr JSON responses.
//!
//! Solr renders its ordered named lists as flat arrays
//! (`["name1", value1, "name2", value2]`) unless told otherwise, and as
//! objects for its map-like sections. The helpers here accept both where
//! Solr may produce either.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ResponseError, SolrResult};

/// A single returned document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolrDocument(Map<String, Value>);

impl SolrDocument {
    /// Returns the raw value of `field`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Returns the first value of a possibly multi-valued field.
    pub fn first_value(&self, field: &str) -> Option<&Value> {
        match self.0.get(field)? {
            Value::Array(values) => values.first(),
            value => Some(value),
        }
    }

    /// Returns the first value of `field` when it is a string.
    pub fn first_str(&self, field: &str) -> Option<&str> {
        self.first_value(field).and_then(Value::as_str)
    }

    /// Field names present in the document.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the document as a JSON object.
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for SolrDocument {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// The `response` section of a query response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolrDocumentList {
    /// Number of documents matching the query.
    #[serde(rename = "numFound")]
    pub num_found: u64,
    /// Offset of the first returned document.
    #[serde(default)]
    pub start: u64,
    /// Highest score, when scores were requested.
    #[serde(rename = "maxScore", default, skip_serializing_if = "Option::is_none")]
    pub max_score: Option<f64>,
    /// The returned documents.
    #[serde(default)]
    pub docs: Vec<SolrDocument>,
}

/// The full response of a search request, kept as Solr sent it.
#[derive(Debug, Clone)]
pub struct QueryResponse {
    body: Value,
}

impl QueryResponse {
    /// Wraps a response tree.
    pub fn new(body: Value) -> Self {
        Self { body }
    }

    /// The untouched response tree, including facets, highlighting, etc.
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Returns the response tree.
    pub fn into_body(self) -> Value {
        self.body
    }

    /// `responseHeader.status`.
    pub fn status(&self) -> Option<i64> {
        self.body.pointer("/responseHeader/status").and_then(Value::as_i64)
    }

    /// `responseHeader.QTime` in milliseconds.
    pub fn qtime(&self) -> Option<i64> {
        self.body.pointer("/responseHeader/QTime").and_then(Value::as_i64)
    }

    /// Parses the matched documents.
    pub fn results(&self) -> SolrResult<SolrDocumentList> {
        let response = self
            .body
            .get("response")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ResponseError::ElementNotFound {
                element: "response".to_string(),
            })?;
        Ok(SolrDocumentList::deserialize(response)?)
    }

    /// The cursor token to send for the following page, if cursor paging was used.
    pub fn next_cursor_mark(&self) -> Option<&str> {
        self.body.get("nextCursorMark").and_then(Value::as_str)
    }
}

/// One indexed term and its document frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// The term text.
    pub term: String,
    /// Number of documents containing the term.
    pub frequency: u64,
}

impl Term {
    /// Creates a term entry.
    pub fn new(term: impl Into<String>, frequency: u64) -> Self {
        Self {
            term: term.into(),
            frequency,
        }
    }
}

/// Terms-component results: per requested field, terms in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermsResponse {
    fields: Vec<(String, Vec<Term>)>,
}

impl TermsResponse {
    /// Parses the `terms` section of a response tree.
    ///
    /// A response without a `terms` section yields an empty result.
    pub fn from_response(response: &Value) -> SolrResult<Self> {
        let Some(terms) = response.get("terms").filter(|v| !v.is_null()) else {
            return Ok(Self::default());
        };

        let fields = named_entries(terms, "terms")?
            .into_iter()
            .map(|(field, list)| -> SolrResult<(String, Vec<Term>)> {
                let terms = named_entries(list, field)?
                    .into_iter()
                    .map(|(term, count)| parse_frequency(term, count))
                    .collect::<SolrResult<Vec<_>>>()?;
                Ok((field.to_string(), terms))
            })
            .collect::<SolrResult<Vec<_>>>()?;

        Ok(Self { fields })
    }

    /// Terms for `field`, if it was part of the response.
    pub fn terms(&self, field: &str) -> Option<&[Term]> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, terms)| terms.as_slice())
    }

    /// Field names in response order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Returns `true` if no field produced terms.
    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, terms)| terms.is_empty())
    }
}

fn parse_frequency(term: &str, count: &Value) -> SolrResult<Term> {
    // With terms.ttf the count becomes {"df": .., "ttf": ..}.
    let frequency = count
        .as_u64()
        .or_else(|| count.get("df").and_then(Value::as_u64))
        .ok_or_else(|| ResponseError::UnexpectedShape {
            element: term.to_string(),
            expected: "a term frequency".to_string(),
        })?;
    Ok(Term::new(term, frequency))
}

/// Reads a named list rendered either as a flat array or as an object.
pub(crate) fn named_entries<'a>(
    value: &'a Value,
    element: &str,
) -> SolrResult<Vec<(&'a str, &'a Value)>> {
    match value {
        Value::Object(map) => Ok(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
        Value::Array(items) => {
            if items.len() % 2 != 0 {
                return Err(unexpected(element, "an even-length named list"));
            }
            items
                .chunks_exact(2)
                .map(|pair| -> SolrResult<(&'a str, &'a Value)> {
                    let name = pair[0]
                        .as_str()
                        .ok_or_else(|| unexpected(element, "string names in a named list"))?;
                    Ok((name, &pair[1]))
                })
                .collect()
        }
        _ => Err(unexpected(element, "a named list")),
    }
}

fn unexpected(element: &str, expected: &str) -> crate::error::SolrError {
    ResponseError::UnexpectedShape {
        element: element.to_string(),
        expected: expected.to_string(),
    }
    .into()
}
