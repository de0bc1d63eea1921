//! An in-process HTTP server speaking enough of Solr's JSON API for the
//! builders under test.
//!
//! Collections live in memory. Documents are ordered by `id`, cursor tokens
//! are `AoE<last id>`, and terms are the lowercased whitespace tokens of
//! each string field. The cluster status reports two shards hosted on this
//! same server so SolrCloud routing can be observed end to end.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value, json};
use url::form_urlencoded;

use helios_solr::{CloudSolrClient, HttpSolrClient, SolrConfig};

const CURSOR_PREFIX: &str = "AoE";

/// A request as received by [`FakeSolr`].
#[derive(Debug, Clone)]
pub struct RecordedHttp {
    pub method: String,
    pub path: String,
    pub params: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: Vec<u8>,
}

impl RecordedHttp {
    /// First value of `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `name`, in order.
    pub fn params_named(&self, name: &str) -> Vec<&str> {
        self.params
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Default)]
struct Inner {
    base_url: String,
    collections: BTreeMap<String, Vec<Value>>,
    requests: Vec<RecordedHttp>,
    repeat_mark_on_last_page: bool,
}

#[derive(Clone, Default)]
struct FakeSolrState {
    inner: Arc<Mutex<Inner>>,
}

/// Handle to a running fake Solr node.
pub struct FakeSolr {
    base_url: String,
    state: FakeSolrState,
}

impl FakeSolr {
    /// Starts a server hosting the given (empty) collections.
    pub async fn start(collections: &[&str]) -> Self {
        let state = FakeSolrState::default();

        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake Solr listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Fake Solr server failed");
        });

        let base_url = format!("http://{}/solr", addr);
        {
            let mut inner = state.inner.lock().unwrap();
            inner.base_url = base_url.clone();
            for name in collections {
                inner.collections.insert(name.to_string(), Vec::new());
            }
        }

        Self { base_url, state }
    }

    /// Starts a server with a `books` collection holding the book fixture.
    pub async fn with_books() -> Self {
        let solr = Self::start(&["books"]).await;
        solr.seed("books", super::books());
        solr
    }

    /// Adds documents to `collection` without going through HTTP.
    pub fn seed(&self, collection: &str, docs: Vec<Value>) {
        let mut inner = self.state.inner.lock().unwrap();
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
    }

    /// Makes the last cursor page report its own token as the next one,
    /// ending iteration without an extra empty page.
    pub fn repeat_mark_on_last_page(&self) {
        self.state.inner.lock().unwrap().repeat_mark_on_last_page = true;
    }

    /// Base URL, e.g. `http://127.0.0.1:4242/solr`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Client configuration pointing at this server.
    pub fn config(&self) -> SolrConfig {
        SolrConfig::with_url(self.base_url.clone())
    }

    /// A single-node client for this server.
    pub fn client(&self) -> Arc<HttpSolrClient> {
        Arc::new(HttpSolrClient::new(&self.config()).expect("Failed to build HTTP client"))
    }

    /// A SolrCloud client for this server.
    pub fn cloud_client(&self) -> Arc<CloudSolrClient> {
        Arc::new(CloudSolrClient::new(&self.config()).expect("Failed to build cloud client"))
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<RecordedHttp> {
        self.state.inner.lock().unwrap().requests.clone()
    }

    /// Requests whose path ends with `handler`.
    pub fn requests_to(&self, handler: &str) -> Vec<RecordedHttp> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(handler))
            .collect()
    }

    /// Number of documents stored in `collection`.
    pub fn doc_count(&self, collection: &str) -> usize {
        self.state
            .inner
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

async fn handle(
    State(state): State<FakeSolrState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let params: Vec<(String, String)> =
        form_urlencoded::parse(uri.query().unwrap_or("").as_bytes())
            .into_owned()
            .collect();
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let recorded = RecordedHttp {
        method: method.to_string(),
        path: uri.path().to_string(),
        params,
        content_type: header_text(header::CONTENT_TYPE),
        authorization: header_text(header::AUTHORIZATION),
        body: body.to_vec(),
    };

    let mut inner = state.inner.lock().unwrap();
    inner.requests.push(recorded.clone());

    if recorded.param("wt") != Some("json") {
        return solr_error(StatusCode::BAD_REQUEST, "only wt=json is supported");
    }

    let Some(route) = recorded.path.strip_prefix("/solr/") else {
        return solr_error(StatusCode::NOT_FOUND, "not a Solr path");
    };
    if route == "admin/collections" {
        return cluster_status(&inner, &recorded);
    }

    let Some((collection, handler)) = route.split_once('/') else {
        return solr_error(StatusCode::NOT_FOUND, "missing request handler");
    };
    if !inner.collections.contains_key(collection) {
        return solr_error(
            StatusCode::NOT_FOUND,
            &format!("Can not find: /solr/{}/{}", collection, handler),
        );
    }
    let collection = collection.to_string();

    let is_post = method == Method::POST;
    match (handler, is_post) {
        ("select", false) => select(&inner, &collection, &recorded),
        ("terms", false) => terms(&inner.collections[&collection], &recorded),
        ("analysis/field", false) => field_analysis(&recorded),
        ("update/json/docs", true) => update(&mut inner, &collection, &recorded),
        _ => solr_error(
            StatusCode::NOT_FOUND,
            &format!("no handler for {} /{}", method, handler),
        ),
    }
}

fn ok(mut body: Map<String, Value>) -> Response {
    body.insert(
        "responseHeader".to_string(),
        json!({"status": 0, "QTime": 1}),
    );
    (StatusCode::OK, axum::Json(Value::Object(body))).into_response()
}

fn solr_error(status: StatusCode, msg: &str) -> Response {
    let body = json!({
        "responseHeader": {"status": status.as_u16(), "QTime": 0},
        "error": {"msg": msg, "code": status.as_u16()}
    });
    (status, axum::Json(body)).into_response()
}

fn select(inner: &Inner, collection: &str, request: &RecordedHttp) -> Response {
    let docs = &inner.collections[collection];
    let q = request.param("q").unwrap_or("*:*");

    let matcher = match parse_query(q, docs) {
        Ok(matcher) => matcher,
        Err(msg) => return solr_error(StatusCode::BAD_REQUEST, &msg),
    };

    let descending = match request.param("sort") {
        None => false,
        Some(sort) => match sort.split(',').next().map(str::trim) {
            Some("id asc") => false,
            Some("id desc") => true,
            _ => return solr_error(StatusCode::BAD_REQUEST, "can only sort on id"),
        },
    };

    let mut matched: Vec<&Value> = docs.iter().filter(|doc| matcher(*doc)).collect();
    matched.sort_by(|a, b| doc_id(a).cmp(doc_id(b)));
    if descending {
        matched.reverse();
    }
    let num_found = matched.len();

    let rows = request
        .param("rows")
        .and_then(|r| r.parse::<usize>().ok())
        .unwrap_or(10);
    let start = request
        .param("start")
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = Map::new();
    let page: Vec<&Value> = match request.param("cursorMark") {
        None => matched.iter().skip(start).take(rows).copied().collect(),
        Some(mark) => {
            if request.param("sort").is_none() {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    "Cursor functionality requires a sort containing a uniqueKey field tie breaker",
                );
            }
            if start != 0 {
                return solr_error(
                    StatusCode::BAD_REQUEST,
                    "Cursor functionality requires start=0",
                );
            }
            let remaining: Vec<&Value> = if mark == "*" {
                matched.clone()
            } else {
                let Some(after) = mark.strip_prefix(CURSOR_PREFIX) else {
                    return solr_error(
                        StatusCode::BAD_REQUEST,
                        &format!("Unable to parse 'cursorMark' after totem: {}", mark),
                    );
                };
                matched
                    .iter()
                    .copied()
                    .filter(|doc| {
                        if descending {
                            doc_id(doc) < after
                        } else {
                            doc_id(doc) > after
                        }
                    })
                    .collect()
            };
            let page: Vec<&Value> = remaining.iter().take(rows).copied().collect();
            let is_last = page.len() == remaining.len();
            let next_mark = match page.last() {
                Some(_) if is_last && inner.repeat_mark_on_last_page => mark.to_string(),
                Some(last) => format!("{}{}", CURSOR_PREFIX, doc_id(last)),
                None => mark.to_string(),
            };
            body.insert("nextCursorMark".to_string(), json!(next_mark));
            page
        }
    };

    let fields: Option<Vec<&str>> = request
        .param("fl")
        .map(|fl| fl.split(',').map(str::trim).collect());
    let page: Vec<Value> = page
        .into_iter()
        .map(|doc| project(doc, fields.as_deref()))
        .collect();

    body.insert(
        "response".to_string(),
        json!({"numFound": num_found, "start": start, "numFoundExact": true, "docs": page}),
    );
    ok(body)
}

type Matcher = Box<dyn Fn(&Value) -> bool>;

/// Understands `*:*` and `field:word`.
fn parse_query(q: &str, docs: &[Value]) -> Result<Matcher, String> {
    if q == "*:*" {
        return Ok(Box::new(|_| true));
    }
    let Some((field, word)) = q.split_once(':') else {
        return Err(format!("unsupported query: {}", q));
    };
    if !docs.is_empty() && !docs.iter().any(|doc| doc.get(field).is_some()) {
        return Err(format!("undefined field {}", field));
    }
    let field = field.to_string();
    let word = word.to_lowercase();
    Ok(Box::new(move |doc| {
        field_tokens(doc.get(&field)).iter().any(|t| *t == word)
    }))
}

fn doc_id(doc: &Value) -> &str {
    doc.get("id").and_then(Value::as_str).unwrap_or_default()
}

fn project(doc: &Value, fields: Option<&[&str]>) -> Value {
    match (doc, fields) {
        (Value::Object(map), Some(fields)) if !fields.contains(&"*") => Value::Object(
            map.iter()
                .filter(|(k, _)| fields.contains(&k.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        ),
        _ => doc.clone(),
    }
}

/// Lowercased whitespace tokens of a string or array-of-strings field,
/// stripped of surrounding punctuation.
fn field_tokens(value: Option<&Value>) -> Vec<String> {
    let texts: Vec<&str> = match value {
        Some(Value::String(s)) => vec![s.as_str()],
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };
    texts
        .iter()
        .flat_map(|text| text.split_whitespace())
        .map(|t| {
            t.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|t| !t.is_empty())
        .collect()
}

fn terms(docs: &[Value], request: &RecordedHttp) -> Response {
    let fields = request.params_named("terms.fl");
    if fields.is_empty() {
        return solr_error(StatusCode::BAD_REQUEST, "No terms.fl parameter specified");
    }

    let limit = request
        .param("terms.limit")
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(10);
    let min_count = request
        .param("terms.mincount")
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1);
    let prefix = request.param("terms.prefix").unwrap_or("");
    let by_index = request.param("terms.sort") == Some("index");
    let as_map = request.param("json.nl") == Some("map");

    let mut section = Vec::new();
    let mut section_map = Map::new();
    for field in fields {
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for doc in docs {
            let mut tokens = field_tokens(doc.get(field));
            tokens.sort();
            tokens.dedup();
            for token in tokens {
                *counts.entry(token).or_default() += 1;
            }
        }

        let mut entries: Vec<(String, u64)> = counts
            .into_iter()
            .filter(|(term, count)| term.starts_with(prefix) && *count >= min_count)
            .collect();
        if !by_index {
            entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        }
        if limit >= 0 {
            entries.truncate(limit as usize);
        }

        if as_map {
            let counts: Map<String, Value> = entries
                .into_iter()
                .map(|(term, count)| (term, json!(count)))
                .collect();
            section_map.insert(field.to_string(), Value::Object(counts));
            continue;
        }
        let flat: Vec<Value> = entries
            .into_iter()
            .flat_map(|(term, count)| [json!(term), json!(count)])
            .collect();
        section.push(json!(field));
        section.push(Value::Array(flat));
    }

    let mut body = Map::new();
    let section = if as_map {
        Value::Object(section_map)
    } else {
        Value::Array(section)
    };
    body.insert("terms".to_string(), section);
    ok(body)
}

fn field_analysis(request: &RecordedHttp) -> Response {
    let (Some(field_type), Some(value)) = (
        request.param("analysis.fieldtype"),
        request.param("analysis.fieldvalue"),
    ) else {
        return solr_error(
            StatusCode::BAD_REQUEST,
            "analysis.fieldtype and analysis.fieldvalue are required",
        );
    };

    let tokenized = |text: String| {
        json!([{"text": text, "raw_bytes": "[]", "start": 0, "end": value.len(), "position": 1, "type": "<ALPHANUM>"}])
    };
    let index = match field_type {
        "text_general" => json!([
            "org.apache.lucene.analysis.standard.StandardTokenizer",
            tokenized(value.to_string()),
            "org.apache.lucene.analysis.core.LowerCaseFilter",
            tokenized(value.to_lowercase()),
        ]),
        "string" => json!([
            "org.apache.solr.schema.FieldType$DefaultAnalyzer$1",
            tokenized(value.to_string()),
        ]),
        other => {
            return solr_error(
                StatusCode::BAD_REQUEST,
                &format!("Unknown fieldtype '{}'", other),
            );
        }
    };

    let mut field_types = Map::new();
    field_types.insert(field_type.to_string(), json!({"index": index}));

    let mut body = Map::new();
    body.insert(
        "analysis".to_string(),
        json!({"field_types": field_types, "field_names": {}}),
    );
    ok(body)
}

fn update(inner: &mut Inner, collection: &str, request: &RecordedHttp) -> Response {
    if request.param("json.command") != Some("false") {
        return solr_error(StatusCode::BAD_REQUEST, "expected json.command=false");
    }
    if request.content_type.as_deref() != Some("application/json") {
        return solr_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "expected application/json",
        );
    }

    let docs = match serde_json::from_slice::<Value>(&request.body) {
        Ok(Value::Array(docs)) => docs,
        Ok(doc @ Value::Object(_)) => vec![doc],
        Ok(_) => return solr_error(StatusCode::BAD_REQUEST, "expected documents"),
        Err(e) => return solr_error(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let stored = inner.collections.entry(collection.to_string()).or_default();
    for doc in docs {
        stored.retain(|existing| doc_id(existing) != doc_id(&doc));
        stored.push(doc);
    }
    ok(Map::new())
}

/// Reports every known collection as two shards served by this node. The
/// second shard has one down replica next to its active one.
fn cluster_status(inner: &Inner, request: &RecordedHttp) -> Response {
    if request.param("action") != Some("CLUSTERSTATUS") {
        return solr_error(StatusCode::BAD_REQUEST, "unsupported action");
    }

    let node_name = inner
        .base_url
        .trim_start_matches("http://")
        .replace("/solr", "_solr");
    let replica = |core: String, state: &str| {
        json!({
            "core": core,
            "base_url": inner.base_url,
            "node_name": node_name,
            "state": state,
            "type": "NRT",
        })
    };

    let mut collections = Map::new();
    for name in inner.collections.keys() {
        collections.insert(
            name.clone(),
            json!({
                "shards": {
                    "shard1": {
                        "range": "80000000-ffffffff",
                        "state": "active",
                        "replicas": {
                            "core_node1": replica(format!("{}_shard1_replica_n1", name), "active"),
                        }
                    },
                    "shard2": {
                        "range": "0-7fffffff",
                        "state": "active",
                        "replicas": {
                            "core_node3": replica(format!("{}_shard2_replica_n3", name), "active"),
                            "core_node4": replica(format!("{}_shard2_replica_n4", name), "down"),
                        }
                    }
                },
                "replicationFactor": 1,
                "configName": "_default"
            }),
        );
    }

    let mut body = Map::new();
    body.insert(
        "cluster".to_string(),
        json!({"collections": collections, "live_nodes": [node_name]}),
    );
    ok(body)
}
