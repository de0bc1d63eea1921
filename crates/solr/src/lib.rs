//! Helios Solr
//!
//! Fluent request builders and response parsers for Apache Solr, in
//! standalone or SolrCloud mode. The crate shapes request parameters and
//! unwraps response trees; query execution, sharding and term statistics are
//! left to Solr.
//!
//! # Architecture
//!
//! - [`client`] - the [`SolrClient`] transport trait, with HTTP and SolrCloud implementations
//! - [`scan`] - terms-component scans ([`SolrScan`])
//! - [`search`] - document searches and cursor iteration ([`SolrSearch`])
//! - [`analysis`] - field analysis ([`SolrFieldAnalysis`])
//! - [`update`] - streaming JSON bulk loads ([`JsonUpdateRequest`])
//! - [`zk`] - ZooKeeper connection strings ([`ZkParams`])
//! - [`params`] - the multi-valued parameter store
//! - [`response`] - typed views over response trees
//! - [`config`] - client configuration
//! - [`error`] - error types
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use helios_solr::{HttpSolrClient, SolrConfig, SolrSearch};
//!
//! # async fn run() -> helios_solr::SolrResult<()> {
//! let client = Arc::new(HttpSolrClient::new(&SolrConfig::with_url(
//!     "http://localhost:8983/solr",
//! ))?);
//!
//! let response = SolrSearch::new(client, "books")
//!     .with_query("title:game")
//!     .with_rows(1)
//!     .execute()
//!     .await?;
//! println!("{} hits", response.results()?.num_found);
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Every operation is a single awaited HTTP round trip on the caller's task.
//! Builders own their state and are not meant to be shared between tasks
//! while being configured; clients are cheap to share behind an `Arc`.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod analysis;
pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod response;
pub mod scan;
pub mod search;
pub mod update;
pub mod zk;

// Re-export commonly used types at crate root
pub use analysis::SolrFieldAnalysis;
pub use client::{CloudSolrClient, DynSolrClient, HttpSolrClient, SolrClient, SolrRequest};
pub use config::{SolrAuth, SolrConfig};
pub use error::{SolrError, SolrResult};
pub use params::SolrParams;
pub use response::{QueryResponse, SolrDocument, SolrDocumentList, Term, TermsResponse};
pub use scan::{RegexFlag, SolrScan, SortType};
pub use search::{CursorResultSet, SolrSearch, SortClause, SortOrder};
pub use update::JsonUpdateRequest;
pub use zk::ZkParams;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
