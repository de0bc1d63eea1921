//! Field analysis through Solr's `/analysis/field` handler.
//!
//! The handler reports every phase a value passes through (tokenizer, then
//! each filter). Only the output of the final index-time phase is returned
//! here.
//!
//! The response is walked by key rather than deserialized into a model:
//! `analysis` → `field_types` → `<field type>` → `index`, where `index` is
//! a flat named list of `[phase name, tokens, phase name, tokens, ...]`.

use serde_json::Value;

use crate::client::{DynSolrClient, SolrRequest};
use crate::error::{ResponseError, SolrError, SolrResult};
use crate::params::SolrParams;

const HANDLER: &str = "/analysis/field";

/// Runs values through the analysis chain of a field type.
#[derive(Clone)]
pub struct SolrFieldAnalysis {
    client: DynSolrClient,
    collection: String,
}

impl std::fmt::Debug for SolrFieldAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolrFieldAnalysis")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl SolrFieldAnalysis {
    /// Creates an analyzer for `collection`.
    pub fn new(client: DynSolrClient, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
        }
    }

    /// Analyzes `field_value` with the index-time chain of `field_type` and
    /// returns the resulting text.
    ///
    /// Any failure, from the transport or from an unexpected response, is
    /// reported as [`SolrError::FieldAnalysis`] with the cause as its source.
    pub async fn by_field_type(&self, field_type: &str, field_value: &str) -> SolrResult<String> {
        self.analyze(field_type, field_value)
            .await
            .map_err(|source| SolrError::FieldAnalysis {
                field_type: field_type.to_string(),
                field_value: field_value.to_string(),
                source: Box::new(source),
            })
    }

    async fn analyze(&self, field_type: &str, field_value: &str) -> SolrResult<String> {
        let mut params = SolrParams::new();
        params.set("analysis.fieldtype", field_type);
        params.set("analysis.fieldvalue", field_value);

        let response = self
            .client
            .request(&self.collection, SolrRequest::get(HANDLER, params))
            .await?;
        index_analysis_result(&response, field_type)
    }
}

/// Extracts the final index-phase text for `field_type` from an analysis response.
pub fn index_analysis_result(response: &Value, field_type: &str) -> SolrResult<String> {
    let analysis = element(response, "analysis")?;
    let field_types = element(analysis, "field_types")?;
    let field = element(field_types, field_type)?;
    let index = element(field, "index")?;

    let phases = index.as_array().ok_or_else(|| ResponseError::UnexpectedShape {
        element: "index".to_string(),
        expected: "a named list of analysis phases".to_string(),
    })?;
    let Some(last_phase) = phases.last() else {
        return Err(ResponseError::ElementEmpty {
            element: "index".to_string(),
        }
        .into());
    };

    let tokens = last_phase
        .as_array()
        .ok_or_else(|| ResponseError::UnexpectedShape {
            element: "index".to_string(),
            expected: "a token list as the final phase".to_string(),
        })?;
    let Some(first_token) = tokens.first() else {
        return Err(ResponseError::ElementEmpty {
            element: "index phase".to_string(),
        }
        .into());
    };

    match first_token.get("text") {
        Some(Value::String(text)) => Ok(text.clone()),
        Some(Value::Null) | None => Err(ResponseError::NullResult {
            operation: "field analysis".to_string(),
        }
        .into()),
        Some(_) => Err(ResponseError::UnexpectedShape {
            element: "text".to_string(),
            expected: "a string".to_string(),
        }
        .into()),
    }
}

/// Looks up `name` in `container`, treating a null value as missing.
fn element<'a>(container: &'a Value, name: &str) -> SolrResult<&'a Value> {
    match container.get(name) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(ResponseError::ElementNotFound {
            element: name.to_string(),
        }
        .into()),
    }
}
