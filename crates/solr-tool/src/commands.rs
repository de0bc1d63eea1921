//! Command implementations. Results are written to the given writer, one
//! line per term or document.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use helios_solr::{
    CloudSolrClient, DynSolrClient, HttpSolrClient, JsonUpdateRequest, SolrFieldAnalysis,
    SolrScan, SolrSearch, ZkParams,
};
use serde_json::json;
use tracing::{debug, info};

use crate::config::{Command, ScanArgs, SearchArgs, ToolConfig};

/// Runs the configured command.
pub async fn run<W: Write>(config: &ToolConfig, out: &mut W) -> anyhow::Result<()> {
    match &config.command {
        Command::Locate { connection_string } => locate(connection_string, out),
        Command::Scan(args) => scan(config, args, out).await,
        Command::Search(args) => search(config, args, out).await,
        Command::Analyze { field_type, value } => analyze(config, field_type, value, out).await,
        Command::Load { file, commit } => {
            let reader = tokio::fs::File::open(file)
                .await
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let client = connect(config)?;
            let collection = config.collection()?;
            info!(file = %file.display(), collection = %collection, commit = *commit, "Loading documents");

            let response = JsonUpdateRequest::new(reader)
                .with_commit(*commit)
                .process(client.as_ref(), collection)
                .await?;
            writeln!(out, "{}", response)?;
            Ok(())
        }
    }
}

fn connect(config: &ToolConfig) -> anyhow::Result<DynSolrClient> {
    let solr = config.solr_config();
    let client: DynSolrClient = if config.cloud {
        Arc::new(CloudSolrClient::new(&solr)?)
    } else {
        Arc::new(HttpSolrClient::new(&solr)?)
    };
    Ok(client)
}

fn locate<W: Write>(connection_string: &str, out: &mut W) -> anyhow::Result<()> {
    let params = ZkParams::create(connection_string)?;
    let summary = json!({
        "hosts": params.hosts(),
        "chroot": params.chroot(),
    });
    writeln!(out, "{}", summary)?;
    Ok(())
}

async fn scan<W: Write>(config: &ToolConfig, args: &ScanArgs, out: &mut W) -> anyhow::Result<()> {
    let collection = config.collection()?;
    let scan = if config.cloud {
        let client = Arc::new(CloudSolrClient::new(&config.solr_config())?);
        SolrScan::for_cloud(client, collection).await?
    } else {
        SolrScan::new(connect(config)?, collection)
    };
    let scan = apply_scan_args(scan, args);
    debug!(params = %scan.params(), "Scanning terms");

    let response = scan.execute().await?;
    for term in response.terms(&args.field).unwrap_or_default() {
        writeln!(out, "{}\t{}", term.term, term.frequency)?;
    }
    Ok(())
}

fn apply_scan_args(scan: SolrScan, args: &ScanArgs) -> SolrScan {
    let mut scan = scan.with_field(args.field.clone());
    if let Some(limit) = args.limit {
        scan = scan.with_limit(limit);
    }
    if let Some(ref prefix) = args.prefix {
        scan = scan.with_prefix(prefix.clone());
    }
    if let Some(ref regex) = args.regex {
        scan = scan.with_regex(regex.clone());
    }
    if !args.regex_flags.is_empty() {
        scan = scan.with_regex_flags(args.regex_flags.iter().copied());
    }
    if let Some(sort) = args.sort {
        scan = scan.with_sort(sort);
    }
    if let Some(ref lower) = args.lower {
        scan = scan.with_lower(lower.clone());
    }
    if let Some(inclusive) = args.lower_inclusive {
        scan = scan.with_lower_inclusive(inclusive);
    }
    if let Some(ref upper) = args.upper {
        scan = scan.with_upper(upper.clone());
    }
    if let Some(inclusive) = args.upper_inclusive {
        scan = scan.with_upper_inclusive(inclusive);
    }
    if args.raw {
        scan = scan.with_raw(true);
    }
    if let Some(min_count) = args.min_count {
        scan = scan.with_min_count(min_count);
    }
    if let Some(max_count) = args.max_count {
        scan = scan.with_max_count(max_count);
    }
    scan
}

fn build_search(client: DynSolrClient, collection: &str, args: &SearchArgs) -> SolrSearch {
    let mut search = SolrSearch::new(client, collection)
        .with_query(args.query.clone())
        .with_sort_clauses(args.sort.iter().cloned())
        .with_fields(args.fields.iter().cloned());
    if let Some(rows) = args.rows {
        search = search.with_rows(rows);
    }
    if let Some(start) = args.start {
        search = search.with_start(start);
    }
    search
}

async fn search<W: Write>(
    config: &ToolConfig,
    args: &SearchArgs,
    out: &mut W,
) -> anyhow::Result<()> {
    let collection = config.collection()?;
    let search = build_search(connect(config)?, collection, args);
    debug!(params = %search.params(), "Searching");

    if !args.cursor {
        let response = search.execute().await?;
        writeln!(out, "{}", serde_json::to_string_pretty(response.body())?)?;
        return Ok(());
    }

    let mut cursor = search.execute_for_cursor_based_iteration().await?;
    info!(size = cursor.size(), "Iterating with cursor");
    let mut written = 0u64;
    while let Some(doc) = cursor.next().await? {
        writeln!(out, "{}", serde_json::to_string(&doc)?)?;
        written += 1;
    }
    info!(
        documents = written,
        pages = cursor.pages_fetched(),
        "Cursor exhausted"
    );
    Ok(())
}

async fn analyze<W: Write>(
    config: &ToolConfig,
    field_type: &str,
    value: &str,
    out: &mut W,
) -> anyhow::Result<()> {
    let analysis = SolrFieldAnalysis::new(connect(config)?, config.collection()?);
    let text = analysis.by_field_type(field_type, value).await?;
    writeln!(out, "{}", text)?;
    Ok(())
}
