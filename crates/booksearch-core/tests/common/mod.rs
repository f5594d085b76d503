#![allow(dead_code)]

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use booksearch_core::error::{Error, Result};
use booksearch_core::query::{Query, SearchRequest};
use booksearch_core::traits::SearchService;
use booksearch_core::types::{
    CreateIndexResponse, Document, Hits, HitsTotal, IndexName, IndexResponse, SearchHit,
    SearchResponse, TotalHits,
};
use serde_json::{json, Value};

pub fn repo_root() -> PathBuf {
    // crates/booksearch-core -> crates -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap()
        .to_path_buf()
}

pub fn fixture_books() -> Vec<Value> {
    let raw = std::fs::read_to_string(repo_root().join("test_data/books.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

pub fn index(name: &str) -> IndexName {
    IndexName::new(name).unwrap()
}

fn transport_error(message: &str) -> Error {
    Error::Http {
        status: None,
        message: message.into(),
    }
}

fn service_error(status: u16, message: &str) -> Error {
    Error::Http {
        status: Some(status),
        message: message.into(),
    }
}

/// In-memory stand-in for the search service. Records every call it receives.
#[derive(Default)]
pub struct FakeService {
    existing: Mutex<HashSet<String>>,
    sources: Mutex<Vec<(String, Value)>>,
    reject_creates: bool,
    fail_exists: bool,
    fail_create: bool,
    fail_insert: bool,
    fail_search: bool,
    pub exists_calls: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, Vec<u8>)>>,
    pub searches: Mutex<Vec<(Vec<String>, Value, bool)>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(self, index: &str) -> Self {
        self.existing.lock().unwrap().insert(index.to_string());
        self
    }

    pub fn with_sources(self, index: &str, sources: Vec<Value>) -> Self {
        self.sources
            .lock()
            .unwrap()
            .extend(sources.into_iter().map(|s| (index.to_string(), s)));
        self
    }

    pub fn rejecting_creates(mut self) -> Self {
        self.reject_creates = true;
        self
    }

    pub fn failing_exists(mut self) -> Self {
        self.fail_exists = true;
        self
    }

    /// Create calls are recorded, then fail as if the connection dropped.
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn failing_insert(mut self) -> Self {
        self.fail_insert = true;
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn created_names(&self) -> Vec<String> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn stored(&self) -> Vec<(String, Value)> {
        self.sources.lock().unwrap().clone()
    }
}

/// Lowercased `match` texts of the top-level `should` clauses.
fn should_texts(query: &Query) -> Vec<String> {
    match query {
        Query::Bool(b) => b
            .should_clauses()
            .iter()
            .filter_map(|q| match q {
                Query::Match { text, .. } => Some(text.to_lowercase()),
                _ => None,
            })
            .collect(),
        Query::Match { text, .. } => vec![text.to_lowercase()],
        _ => vec![],
    }
}

impl SearchService for FakeService {
    fn index_exists(&self, index: &IndexName) -> Result<bool> {
        self.exists_calls.lock().unwrap().push(index.to_string());
        if self.fail_exists {
            return Err(transport_error("connection refused"));
        }
        Ok(self.existing.lock().unwrap().contains(index.as_str()))
    }

    fn create_index(&self, index: &IndexName, body: &[u8]) -> Result<CreateIndexResponse> {
        self.created
            .lock()
            .unwrap()
            .push((index.to_string(), body.to_vec()));
        if self.fail_create {
            return Err(transport_error("connection reset by peer"));
        }
        if self.reject_creates {
            return Ok(CreateIndexResponse {
                acknowledged: false,
                shards_acknowledged: false,
                index: index.to_string(),
            });
        }
        self.existing.lock().unwrap().insert(index.to_string());
        Ok(CreateIndexResponse {
            acknowledged: true,
            shards_acknowledged: true,
            index: index.to_string(),
        })
    }

    fn get_mapping(&self, index: &IndexName) -> Result<Value> {
        if !self.existing.lock().unwrap().contains(index.as_str()) {
            return Err(service_error(404, "index_not_found_exception"));
        }
        let body = self
            .created
            .lock()
            .unwrap()
            .iter()
            .find(|(name, _)| name == index.as_str())
            .and_then(|(_, body)| serde_json::from_slice::<Value>(body).ok())
            .and_then(|v| v.get("mappings").cloned())
            .unwrap_or_else(|| json!({}));
        Ok(json!({ index.as_str(): { "mappings": body } }))
    }

    fn index_document(&self, index: &IndexName, doc: &Document) -> Result<IndexResponse> {
        if self.fail_insert {
            return Err(service_error(400, "mapper_parsing_exception"));
        }
        let mut sources = self.sources.lock().unwrap();
        sources.push((index.to_string(), Value::Object(doc.clone())));
        Ok(IndexResponse {
            index: index.to_string(),
            id: format!("doc-{}", sources.len()),
            result: "created".into(),
        })
    }

    fn search(
        &self,
        indexes: &[IndexName],
        request: &SearchRequest,
        pretty: bool,
    ) -> Result<SearchResponse> {
        let names: Vec<String> = indexes.iter().map(ToString::to_string).collect();
        let body = serde_json::to_value(request).unwrap();
        self.searches
            .lock()
            .unwrap()
            .push((names.clone(), body, pretty));
        if self.fail_search {
            return Err(service_error(500, "search_phase_execution_exception"));
        }
        let texts = should_texts(&request.query);
        let hits: Vec<SearchHit> = self
            .sources
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .filter(|(_, (idx, _))| names.contains(idx))
            .filter(|(_, (_, src))| {
                let author = src
                    .get("author")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_lowercase();
                texts.iter().any(|t| author.contains(t.as_str()))
            })
            .map(|(pos, (idx, src))| SearchHit {
                index: idx.clone(),
                id: pos.to_string(),
                score: Some(1.0 / (pos as f64 + 1.0)),
                source: src.clone(),
            })
            .collect();
        Ok(SearchResponse {
            took: Some(1),
            timed_out: Some(false),
            hits: Hits {
                total: Some(TotalHits::Detailed(HitsTotal {
                    value: hits.len() as u64,
                    relation: "eq".into(),
                })),
                max_score: hits.first().and_then(|h| h.score),
                hits,
            },
        })
    }
}
