//! SolrCloud client and cluster state model.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SolrConfig;
use crate::error::{ResponseError, SolrResult};
use crate::params::SolrParams;

use super::{HttpSolrClient, SolrClient, SolrRequest};

const COLLECTIONS_HANDLER: &str = "/admin/collections";

/// State of a single replica as reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplicaState {
    /// Eligible to serve queries.
    Active,
    /// Not running.
    Down,
    /// Catching up with its leader.
    Recovering,
    /// Recovery gave up.
    RecoveryFailed,
    /// A state this client does not know about.
    #[serde(other)]
    Unknown,
}

/// One copy of a shard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replica {
    /// Core name, e.g. `books_shard1_replica_n1`.
    pub core: String,
    /// Base URL of the node hosting the core, e.g. `http://host:8983/solr`.
    pub base_url: String,
    /// Live-node name of the hosting node.
    #[serde(default)]
    pub node_name: Option<String>,
    /// Current replica state.
    pub state: ReplicaState,
}

impl Replica {
    /// URL addressing this replica's core directly.
    pub fn core_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.core)
    }

    /// Returns `true` if the replica can serve queries.
    pub fn is_active(&self) -> bool {
        self.state == ReplicaState::Active
    }
}

/// A shard of a collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Slice {
    /// Replicas keyed by core-node name.
    #[serde(default)]
    pub replicas: BTreeMap<String, Replica>,
}

/// A collection's shard layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocCollection {
    /// Shards keyed by shard name.
    #[serde(default)]
    pub shards: BTreeMap<String, Slice>,
}

impl DocCollection {
    /// One entry per shard that has at least one active replica.
    ///
    /// Replicas of the same shard are joined with `|`, which tells Solr to
    /// pick one of them at random for each distributed request.
    pub fn active_shard_urls(&self) -> Vec<String> {
        self.shards
            .values()
            .filter_map(|slice| {
                let replicas: Vec<String> = slice
                    .replicas
                    .values()
                    .filter(|r| r.is_active())
                    .map(Replica::core_url)
                    .collect();
                (!replicas.is_empty()).then(|| replicas.join("|"))
            })
            .collect()
    }
}

/// The `cluster` section of a `CLUSTERSTATUS` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusterState {
    /// Collections keyed by name.
    #[serde(default)]
    pub collections: BTreeMap<String, DocCollection>,
    /// Names of the nodes currently live.
    #[serde(default)]
    pub live_nodes: Vec<String>,
}

impl ClusterState {
    /// Returns the named collection, if the cluster has it.
    pub fn collection(&self, name: &str) -> Option<&DocCollection> {
        self.collections.get(name)
    }

    /// Parses the `cluster` section out of a Collections API response.
    pub fn from_response(response: &Value) -> SolrResult<Self> {
        let cluster = response
            .get("cluster")
            .filter(|v| !v.is_null())
            .ok_or_else(|| ResponseError::ElementNotFound {
                element: "cluster".to_string(),
            })?;
        Ok(serde_json::from_value(cluster.clone())?)
    }
}

/// A client for a SolrCloud cluster reachable through one or more nodes.
///
/// Requests go to the first configured node; Solr forwards them to the
/// nodes hosting the collection. The remaining nodes are kept for callers
/// that want to address a specific node.
#[derive(Debug, Clone)]
pub struct CloudSolrClient {
    nodes: Vec<HttpSolrClient>,
}

impl CloudSolrClient {
    /// Creates a client with one HTTP connection per configured URL.
    pub fn new(config: &SolrConfig) -> SolrResult<Self> {
        let nodes = config
            .base_urls()?
            .into_iter()
            .map(|url| HttpSolrClient::with_base_url(config, url))
            .collect::<SolrResult<Vec<_>>>()?;
        Ok(Self { nodes })
    }

    /// The per-node clients, in configuration order.
    pub fn nodes(&self) -> &[HttpSolrClient] {
        &self.nodes
    }

    fn primary(&self) -> &HttpSolrClient {
        // `new` rejects an empty URL list.
        &self.nodes[0]
    }

    /// Reads the full cluster state through the Collections API.
    pub async fn cluster_state(&self) -> SolrResult<ClusterState> {
        let mut params = SolrParams::new();
        params.set("action", "CLUSTERSTATUS");
        let response = self
            .primary()
            .request("", SolrRequest::get(COLLECTIONS_HANDLER, params))
            .await?;
        let state = ClusterState::from_response(&response)?;
        tracing::debug!(
            collections = state.collections.len(),
            live_nodes = state.live_nodes.len(),
            "Read SolrCloud cluster state"
        );
        Ok(state)
    }

    /// Returns the layout of `collection`, or `None` if the cluster lacks it.
    pub async fn doc_collection(&self, collection: &str) -> SolrResult<Option<DocCollection>> {
        let mut state = self.cluster_state().await?;
        Ok(state.collections.remove(collection))
    }
}

#[async_trait]
impl SolrClient for CloudSolrClient {
    async fn request(&self, collection: &str, request: SolrRequest) -> SolrResult<Value> {
        self.primary().request(collection, request).await
    }
}
