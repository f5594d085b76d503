use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use url::Url;

use booksearch_core::config::Settings;
use booksearch_core::error::{Error, Result};
use booksearch_core::query::SearchRequest;
use booksearch_core::traits::SearchService;
use booksearch_core::types::{
    CreateIndexResponse, Document, IndexName, IndexResponse, SearchResponse,
};

/// How the client reaches the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Discover the cluster's HTTP nodes from the seed endpoint.
    pub sniff: bool,
    /// Require the seed endpoint to answer before the client is returned.
    pub healthcheck: bool,
    /// Per-request timeout; `None` keeps the transport defaults.
    pub timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            sniff: false,
            healthcheck: true,
            timeout: None,
        }
    }
}

impl From<&Settings> for ClientOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            sniff: settings.sniff,
            healthcheck: settings.healthcheck,
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Blocking client for an Elasticsearch-compatible HTTP API.
pub struct ElasticClient {
    agent: ureq::Agent,
    nodes: Vec<String>,
    next: AtomicUsize,
}

impl ElasticClient {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::connect(&settings.endpoint, ClientOptions::from(settings))
    }

    /// Build a client for `endpoint`. Fails with `Error::Connection` when the
    /// address is malformed or, with the health check on, unreachable.
    pub fn connect(endpoint: &str, options: ClientOptions) -> Result<Self> {
        let seed = normalize_endpoint(endpoint)?;
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        let agent = builder.build();

        if options.healthcheck {
            agent
                .head(&format!("{seed}/"))
                .call()
                .map_err(|e| {
                    Error::Connection(format!("no search node available at {seed}: {e}"))
                })?;
        }

        let nodes = if options.sniff {
            sniff_nodes(&agent, &seed)?
        } else {
            vec![seed]
        };
        tracing::debug!(?nodes, sniff = options.sniff, "search client ready");
        Ok(Self {
            agent,
            nodes,
            next: AtomicUsize::new(0),
        })
    }

    /// Base URLs requests are spread across.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    fn url(&self, path: &str) -> String {
        let slot = self.next.fetch_add(1, Ordering::Relaxed) % self.nodes.len();
        format!("{}/{path}", self.nodes[slot])
    }

    fn request(&self, method: &str, path: &str) -> ureq::Request {
        let url = self.url(path);
        tracing::debug!(%method, %url, "request");
        self.agent.request(method, &url)
    }
}

impl SearchService for ElasticClient {
    fn index_exists(&self, index: &IndexName) -> Result<bool> {
        match self.request("HEAD", index.as_str()).call() {
            Ok(_) => Ok(true),
            Err(ureq::Error::Status(404, _)) => Ok(false),
            Err(e) => Err(http_error(e)),
        }
    }

    fn create_index(&self, index: &IndexName, body: &[u8]) -> Result<CreateIndexResponse> {
        let request = self.request("PUT", index.as_str());
        let response = if body.is_empty() {
            request.call()
        } else {
            request
                .set("Content-Type", "application/json")
                .send_bytes(body)
        };
        read_json(response.map_err(http_error)?)
    }

    fn get_mapping(&self, index: &IndexName) -> Result<serde_json::Value> {
        let response = self
            .request("GET", &format!("{index}/_mapping"))
            .call()
            .map_err(http_error)?;
        read_json(response)
    }

    fn index_document(&self, index: &IndexName, doc: &Document) -> Result<IndexResponse> {
        let body = encode(doc)?;
        let response = self
            .request("POST", &format!("{index}/_doc"))
            .set("Content-Type", "application/json")
            .send_string(&body)
            .map_err(http_error)?;
        read_json(response)
    }

    fn search(
        &self,
        indexes: &[IndexName],
        request: &SearchRequest,
        pretty: bool,
    ) -> Result<SearchResponse> {
        let body = encode(request)?;
        let mut call = self
            .request("POST", &search_path(indexes))
            .set("Content-Type", "application/json");
        if pretty {
            call = call.query("pretty", "true");
        }
        read_json(call.send_string(&body).map_err(http_error)?)
    }
}

/// `idx1,idx2/_search`, or `_search` for every index when none are named.
pub fn search_path(indexes: &[IndexName]) -> String {
    if indexes.is_empty() {
        return "_search".to_string();
    }
    let joined: Vec<&str> = indexes.iter().map(IndexName::as_str).collect();
    format!("{}/_search", joined.join(","))
}

/// Validate an endpoint and strip any trailing slash. Bad ports, unbalanced
/// IPv6 brackets and non-http schemes are all rejected here.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let url = Url::parse(endpoint.trim()).map_err(|e| {
        Error::Connection(format!("malformed endpoint {endpoint:?}: {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Connection(format!(
            "no http:// or https:// scheme in {endpoint:?}"
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::Connection(format!("no host in {endpoint:?}")));
    }
    Ok(url.as_str().trim_end_matches('/').to_string())
}

fn sniff_nodes(agent: &ureq::Agent, seed: &str) -> Result<Vec<String>> {
    let scheme = if seed.starts_with("https://") {
        "https"
    } else {
        "http"
    };
    let info: serde_json::Value = agent
        .get(&format!("{seed}/_nodes/http"))
        .call()
        .map_err(|e| sniff_error(seed, e))?
        .into_json()
        .map_err(|e| sniff_error(seed, e))?;
    let nodes = publish_addresses(&info)
        .into_iter()
        .map(|addr| format!("{scheme}://{addr}"))
        .collect::<Vec<_>>();
    if nodes.is_empty() {
        tracing::warn!(%seed, "sniffing found no http nodes, using the seed endpoint");
        return Ok(vec![seed.to_string()]);
    }
    Ok(nodes)
}

fn sniff_error(seed: &str, err: impl std::fmt::Display) -> Error {
    Error::Connection(format!("sniffing {seed} failed: {err}"))
}

/// `host:port` of every node in a `_nodes/http` response. Addresses of the
/// form `hostname/ip:port` keep only `ip:port`.
pub fn publish_addresses(info: &serde_json::Value) -> Vec<String> {
    let Some(nodes) = info.get("nodes").and_then(serde_json::Value::as_object) else {
        return vec![];
    };
    nodes
        .values()
        .filter_map(|node| node.pointer("/http/publish_address")?.as_str())
        .map(|addr| addr.rsplit('/').next().unwrap_or(addr).to_string())
        .collect()
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Http {
        status: None,
        message: format!("cannot encode body: {e}"),
    })
}

fn read_json<T: DeserializeOwned>(response: ureq::Response) -> Result<T> {
    let status = response.status();
    let body = response.into_string().map_err(|e| Error::Http {
        status: Some(status),
        message: e.to_string(),
    })?;
    serde_json::from_str(&body).map_err(|e| Error::Http {
        status: Some(status),
        message: format!("malformed response: {e}"),
    })
}

fn http_error(err: ureq::Error) -> Error {
    match err {
        ureq::Error::Status(code, response) => {
            let message = response.into_string().unwrap_or_default();
            Error::Http {
                status: Some(code),
                message,
            }
        }
        ureq::Error::Transport(transport) => Error::Http {
            status: None,
            message: transport.to_string(),
        },
    }
}
