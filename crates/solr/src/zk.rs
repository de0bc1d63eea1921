//! Coordination-service connection strings.
//!
//! A SolrCloud cluster keeps its topology in ZooKeeper. Connection strings
//! take the form `host1:port1,host2:port2[/chroot/path]`: a comma-separated
//! host list optionally followed by the node under which Solr keeps its data.

use std::fmt;
use std::str::FromStr;

use crate::error::{ConfigError, SolrError, SolrResult};

/// Parsed ZooKeeper hosts and optional chroot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZkParams {
    hosts: Vec<String>,
    chroot: Option<String>,
}

impl ZkParams {
    /// Parses a ZooKeeper connection string.
    ///
    /// Fails when `endpoint` is empty or contains only whitespace.
    pub fn create(endpoint: &str) -> SolrResult<Self> {
        if endpoint.trim().is_empty() {
            return Err(ConfigError::InvalidConnectionString {
                value: endpoint.to_string(),
            }
            .into());
        }

        let (host_part, chroot) = match endpoint.split_once('/') {
            Some((hosts, path)) => (hosts, Some(format!("/{}", path))),
            None => (endpoint, None),
        };

        Ok(Self {
            hosts: host_part.split(',').map(str::to_string).collect(),
            chroot,
        })
    }

    /// Host and port entries, in connection-string order. Never empty.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// The node containing Solr data, if not the ZooKeeper root.
    pub fn chroot(&self) -> Option<&str> {
        self.chroot.as_deref()
    }
}

impl FromStr for ZkParams {
    type Err = SolrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::create(s)
    }
}

impl fmt::Display for ZkParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hosts.join(","))?;
        if let Some(ref chroot) = self.chroot {
            f.write_str(chroot)?;
        }
        Ok(())
    }
}
