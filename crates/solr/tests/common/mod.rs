//! Common test utilities for the Solr builders.
//!
//! - [`mock_client`] - a recording [`SolrClient`](helios_solr::SolrClient) with scripted responses
//! - [`fake_solr`] - an in-process HTTP server speaking enough of Solr's JSON API
//! - [`fixtures`] - test documents

#![allow(dead_code)]

pub mod fake_solr;
pub mod mock_client;

pub use fake_solr::*;
pub use fixtures::*;
pub use mock_client::*;
