//! The command runner: bootstrap indexes, then query them.
//!
//! Every operation is a single synchronous request/response against the
//! service held by the runner. Failures are returned, never retried.

use serde::de::DeserializeOwned;
use std::fmt;
use std::path::Path;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::mapping::MappingLoader;
use crate::query::{any_of, Query, SearchRequest};
use crate::traits::SearchService;
use crate::types::{Book, Document, IndexName, IndexResponse, SearchHit};

pub const AUTHOR_FIELD: &str = "author";
pub const DEFAULT_AUTHORS: [&str; 2] = ["Guilherme Gonçalves", "Zachary Tanga"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Already present in the service; left untouched.
    Started,
    /// Created by this run.
    Created,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatus {
    pub index: IndexName,
    pub state: IndexState,
}

impl fmt::Display for IndexStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state {
            IndexState::Started => write!(f, "Index [{}]: STARTED", self.index),
            IndexState::Created => write!(f, "Index [{}] created successfully", self.index),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchOutcome<T> {
    /// Decoded records, in the order the service ranked them.
    pub records: Vec<T>,
    /// Hits whose source did not decode into `T`.
    pub skipped: usize,
    /// Total matches reported by the service, which may exceed one page.
    pub total: Option<u64>,
}

pub struct Runner<S> {
    service: S,
    indexes: Vec<IndexName>,
    mappings: MappingLoader,
}

impl<S: SearchService> Runner<S> {
    pub fn new(service: S, indexes: Vec<IndexName>, mappings: MappingLoader) -> Result<Self> {
        if indexes.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one index must be configured".into(),
            ));
        }
        Ok(Self {
            service,
            indexes,
            mappings,
        })
    }

    /// Builds a runner from validated settings; `base` anchors a relative mapping directory.
    pub fn from_settings(service: S, settings: &Settings, base: &Path) -> Result<Self> {
        settings.validate()?;
        let mappings = MappingLoader::new(settings.mapping_dir_in(base));
        Self::new(service, settings.index_names()?, mappings)
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn indexes(&self) -> &[IndexName] {
        &self.indexes
    }

    /// Ensure every configured index exists, creating missing ones from their
    /// mapping file. Stops at the first failure.
    pub fn init_indexes(&self) -> Result<Vec<IndexStatus>> {
        let mut statuses = Vec::with_capacity(self.indexes.len());
        for index in &self.indexes {
            let exists = self.service.index_exists(index).map_err(|e| Error::ServiceQuery {
                index: index.to_string(),
                reason: e.to_string(),
            })?;

            if exists {
                let status = IndexStatus {
                    index: index.clone(),
                    state: IndexState::Started,
                };
                println!("{status}");
                statuses.push(status);
                continue;
            }

            println!("Initializing Index [{}] with mapping...", index);
            let mapping = self.mappings.load(index)?;
            if mapping.is_empty() {
                tracing::warn!(
                    index = %index,
                    path = %self.mappings.path_for(index).display(),
                    "no mapping file, creating index without a body"
                );
            }

            let created = self
                .service
                .create_index(index, &mapping)
                .map_err(|e| Error::CreateIndex {
                    index: index.to_string(),
                    reason: e.to_string(),
                })?;
            if !created.acknowledged {
                return Err(Error::NotAcknowledged(index.to_string()));
            }
            let status = IndexStatus {
                index: index.clone(),
                state: IndexState::Created,
            };
            println!("{status}");
            tracing::info!(index = %index, bytes = mapping.len(), "index created");
            statuses.push(status);
        }
        Ok(statuses)
    }

    /// Live mapping of one index, as the service reports it.
    pub fn inspect_mapping(&self, index: &IndexName) -> Result<serde_json::Value> {
        let mut response = self
            .service
            .get_mapping(index)
            .map_err(|e| Error::MappingFetch(e.to_string()))?;
        response
            .get_mut(index.as_str())
            .map(serde_json::Value::take)
            .ok_or_else(|| {
                Error::MappingFetch(format!("no mapping returned for index [{}]", index))
            })
    }

    /// Store one document in the first configured index.
    pub fn insert_document(&self, doc: &Document) -> Result<IndexResponse> {
        let index = &self.indexes[0];
        let response = self
            .service
            .index_document(index, doc)
            .map_err(|e| Error::Insert(e.to_string()))?;
        println!("Document inserted successfully");
        tracing::debug!(
            index = %response.index,
            id = %response.id,
            result = %response.result,
            "document stored"
        );
        Ok(response)
    }

    /// Run `query` across all configured indexes and decode hits as books.
    pub fn search(&self, query: impl Into<Query>) -> Result<SearchOutcome<Book>> {
        let request = SearchRequest::new(query);
        let response = self
            .service
            .search(&self.indexes, &request, true)
            .map_err(|e| Error::Search(e.to_string()))?;
        let (records, skipped) = decode_hits(&response.hits.hits);
        Ok(SearchOutcome {
            records,
            skipped,
            total: response.hits.total.map(|t| t.value()),
        })
    }

    /// Books whose author matches at least one of `names`.
    pub fn search_authors(&self, names: &[&str]) -> Result<SearchOutcome<Book>> {
        self.search(any_of(AUTHOR_FIELD, names))
    }
}

/// Decode every hit's source, skipping (and logging) those that do not fit `T`.
/// Returns the decoded records in hit order and the number skipped.
pub fn decode_hits<T: DeserializeOwned>(hits: &[SearchHit]) -> (Vec<T>, usize) {
    let mut records = Vec::with_capacity(hits.len());
    let mut skipped = 0;
    for hit in hits {
        match T::deserialize(&hit.source) {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    index = %hit.index,
                    id = %hit.id,
                    error = %e,
                    "skipping undecodable hit"
                );
            }
        }
    }
    (records, skipped)
}
