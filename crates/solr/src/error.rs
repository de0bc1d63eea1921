//! Error types for Solr requests.
//!
//! Errors are split by origin: configuration mistakes caught before any
//! request is sent, malformed or unexpected response trees, and failures
//! reported by the transport or the Solr server itself.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all Solr operations.
#[derive(Error, Debug)]
pub enum SolrError {
    /// Invalid configuration or builder state
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Unexpected response structure
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// The HTTP transport failed before a response was received.
    #[error("transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// Solr answered with a non-success status.
    #[error("solr server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Field analysis could not be completed.
    #[error("unable to complete field analysis request for type='{field_type}' and value='{field_value}'")]
    FieldAnalysis {
        field_type: String,
        field_value: String,
        #[source]
        source: Box<SolrError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised synchronously from configuration or builder getters.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The coordination-service connection string was empty or blank.
    #[error("illegal zkQuorumEndpoint '{value}'")]
    InvalidConnectionString { value: String },

    /// A parameter expected to hold one value holds several.
    #[error("multiple values for '{param}' contained in {context}")]
    MultipleValues { param: String, context: String },

    /// Stored regex flag text does not name a known flag.
    #[error("unknown regex flag: {value}")]
    UnknownRegexFlag { value: String },

    /// Stored sort text does not name a known sort type.
    #[error("unknown terms sort type: {value}")]
    UnknownSortType { value: String },

    /// Stored parameter text could not be parsed as the expected type.
    #[error("invalid value '{value}' for parameter '{name}': {message}")]
    InvalidParameter {
        name: String,
        value: String,
        message: String,
    },

    /// A Solr base URL could not be parsed.
    #[error("invalid Solr URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// No Solr node URL was configured.
    #[error("no Solr URLs configured")]
    NoUrls,
}

/// Errors raised while walking a Solr response tree.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// An expected key was absent or null.
    #[error("'{element}' element not found in response")]
    ElementNotFound { element: String },

    /// An expected container was present but empty.
    #[error("'{element}' element is empty")]
    ElementEmpty { element: String },

    /// The final extracted value was null or absent.
    #[error("result of {operation} was null")]
    NullResult { operation: String },

    /// A value had a different JSON type than expected.
    #[error("'{element}' element has unexpected shape: expected {expected}")]
    UnexpectedShape { element: String, expected: String },
}

/// Result type alias for Solr operations.
pub type SolrResult<T> = Result<T, SolrError>;

impl From<reqwest::Error> for SolrError {
    fn from(err: reqwest::Error) -> Self {
        SolrError::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl SolrError {
    /// Returns the configuration error, if this is one.
    pub fn as_config(&self) -> Option<&ConfigError> {
        match self {
            SolrError::Config(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the response error, following field-analysis wrapping.
    pub fn as_response(&self) -> Option<&ResponseError> {
        match self {
            SolrError::Response(e) => Some(e),
            SolrError::FieldAnalysis { source, .. } => source.as_response(),
            _ => None,
        }
    }
}
