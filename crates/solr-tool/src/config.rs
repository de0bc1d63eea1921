//! Command-line configuration for `solr-tool`.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SOLR_URLS` | http://localhost:8983/solr | Comma-separated Solr base URLs |
//! | `SOLR_COLLECTION` | | Target collection |
//! | `SOLR_CLOUD` | false | Treat the URLs as SolrCloud nodes |
//! | `SOLR_TIMEOUT_MS` | 30000 | Request timeout (milliseconds) |
//! | `SOLR_USERNAME` | | Basic auth username |
//! | `SOLR_PASSWORD` | | Basic auth password |
//! | `SOLR_LOG_LEVEL` | warn | Log level |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use helios_solr::{RegexFlag, SolrAuth, SolrConfig, SortClause, SortType};

/// Configuration shared by every command, plus the command itself.
#[derive(Debug, Clone, Parser)]
#[command(name = "solr-tool")]
#[command(about = "Term scans, searches, field analysis and bulk loads against Solr")]
#[command(version)]
pub struct ToolConfig {
    /// Solr base URLs (comma-separated), including the context path.
    #[arg(long, env = "SOLR_URLS", default_value = "http://localhost:8983/solr")]
    pub urls: String,

    /// Collection to address.
    #[arg(short, long, env = "SOLR_COLLECTION")]
    pub collection: Option<String>,

    /// Treat the URLs as SolrCloud nodes.
    #[arg(long, env = "SOLR_CLOUD", default_value = "false")]
    pub cloud: bool,

    /// Request timeout in milliseconds.
    #[arg(long, env = "SOLR_TIMEOUT_MS", default_value = "30000")]
    pub timeout_ms: u64,

    /// Basic auth username.
    #[arg(long, env = "SOLR_USERNAME")]
    pub username: Option<String>,

    /// Basic auth password.
    #[arg(long, env = "SOLR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "SOLR_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// The operation to run.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Parse a ZooKeeper connection string and print its hosts and chroot.
    Locate {
        /// Connection string, e.g. `zk1:2181,zk2:2181/solr`.
        connection_string: String,
    },

    /// List indexed terms of a field.
    Scan(ScanArgs),

    /// Search documents.
    Search(SearchArgs),

    /// Print the index-time analysis of a value.
    Analyze {
        /// Field type whose index analyzer is used.
        #[arg(long)]
        field_type: String,

        /// The value to analyze.
        value: String,
    },

    /// Stream a JSON document file into the collection.
    Load {
        /// File holding one document, an array, or newline-delimited documents.
        file: PathBuf,

        /// Commit once the documents are indexed.
        #[arg(long)]
        commit: bool,
    },
}

impl Command {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Locate { .. } => "locate",
            Command::Scan(_) => "scan",
            Command::Search(_) => "search",
            Command::Analyze { .. } => "analyze",
            Command::Load { .. } => "load",
        }
    }

    /// Whether the command talks to a collection.
    pub fn needs_collection(&self) -> bool {
        !matches!(self, Command::Locate { .. })
    }
}

/// Options of the `scan` command.
#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// Field to scan.
    #[arg(long)]
    pub field: String,

    /// Maximum number of terms; negative for all.
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i32>,

    /// Only terms starting with this prefix.
    #[arg(long)]
    pub prefix: Option<String>,

    /// Only terms matching this regular expression.
    #[arg(long)]
    pub regex: Option<String>,

    /// Regex flag, e.g. `case_insensitive` (repeatable).
    #[arg(long = "regex-flag")]
    pub regex_flags: Vec<RegexFlag>,

    /// Term ordering: `count` or `index`.
    #[arg(long)]
    pub sort: Option<SortType>,

    /// Start at this term (inclusive by default).
    #[arg(long)]
    pub lower: Option<String>,

    /// Whether `--lower` itself is included: `true` or `false`.
    #[arg(long)]
    pub lower_inclusive: Option<bool>,

    /// Stop at this term (exclusive by default).
    #[arg(long)]
    pub upper: Option<String>,

    /// Whether `--upper` itself is included: `true` or `false`.
    #[arg(long)]
    pub upper_inclusive: Option<bool>,

    /// Return indexed terms as stored, without converting them to readable text.
    #[arg(long)]
    pub raw: bool,

    /// Minimum document frequency.
    #[arg(long)]
    pub min_count: Option<i32>,

    /// Maximum document frequency; -1 for no limit.
    #[arg(long, allow_negative_numbers = true)]
    pub max_count: Option<i32>,
}

/// Options of the `search` command.
#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Query string.
    #[arg(short, long, default_value = "*:*")]
    pub query: String,

    /// Documents per response (per page with --cursor).
    #[arg(long)]
    pub rows: Option<u32>,

    /// Offset of the first document; not allowed with --cursor.
    #[arg(long, conflicts_with = "cursor")]
    pub start: Option<u32>,

    /// Sort clause such as `id asc` (repeatable, in priority order).
    #[arg(long, value_parser = parse_sort_clause)]
    pub sort: Vec<SortClause>,

    /// Returned fields (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Walk every matching document with a cursor, printing one JSON line each.
    #[arg(long)]
    pub cursor: bool,
}

fn parse_sort_clause(raw: &str) -> Result<SortClause, String> {
    SortClause::parse(raw).map_err(|e| e.to_string())
}

impl ToolConfig {
    /// The configured base URLs.
    pub fn solr_urls(&self) -> Vec<String> {
        self.urls
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Builds the client configuration.
    pub fn solr_config(&self) -> SolrConfig {
        let auth = match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some(SolrAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        SolrConfig {
            urls: self.solr_urls(),
            request_timeout_ms: self.timeout_ms,
            auth,
            ..Default::default()
        }
    }

    /// The collection, for commands that need one.
    pub fn collection(&self) -> anyhow::Result<&str> {
        self.collection
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--collection is required for '{}'", self.command.name()))
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.command.needs_collection() {
            if let Err(mut solr_errors) = self.solr_config().validate() {
                errors.append(&mut solr_errors);
            }
            if self.collection.as_deref().is_none_or(|c| c.trim().is_empty()) {
                errors.push(format!(
                    "A collection is required for '{}' (--collection or SOLR_COLLECTION)",
                    self.command.name()
                ));
            }
        }

        if self.username.is_some() != self.password.is_some() {
            errors.push("Username and password must be given together".to_string());
        }

        if let Command::Search(args) = &self.command
            && args.cursor
            && args.sort.is_empty()
        {
            errors.push("--cursor requires at least one --sort clause ending on the unique key".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
