//! Domain types exchanged with the search service.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// A generic field-name-to-value record, as stored in an index.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// Name of a logical collection in the search service. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexName(String);

impl IndexName {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidConfig("index name must not be empty".into()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for IndexName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<IndexName> for String {
    fn from(value: IndexName) -> Self {
        value.0
    }
}

impl fmt::Display for IndexName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The record shape every search hit is decoded into.
///
/// `title` and `author` are required; a source without them does not decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" by {}", self.title, self.author)?;
        if let Some(published) = &self.published {
            write!(f, " ({published})")?;
        }
        Ok(())
    }
}

/// The book inserted by `--insert-sample`.
pub fn sample_book() -> Document {
    let mut doc = Document::new();
    doc.insert("title".into(), "Elasticsearch: The Definitive Guide".into());
    doc.insert("author".into(), "Clinton Gormley and Zachary Tong".into());
    doc.insert("publisher".into(), "O'Reilly Media".into());
    doc.insert("published".into(), "2015-02-07".into());
    doc.insert("pages".into(), 724.into());
    doc
}

/// Body returned by a create-index call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateIndexResponse {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: bool,
    #[serde(default)]
    pub index: String,
}

/// Body returned when a single document is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub result: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub took: Option<i64>,
    #[serde(default)]
    pub timed_out: Option<bool>,
    pub hits: Hits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Hits {
    #[serde(default)]
    pub total: Option<TotalHits>,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Services report the total either as `{"value": n, "relation": ".."}` or,
/// with `rest_total_hits_as_int`, as a bare number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Detailed(HitsTotal),
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(value) => *value,
            Self::Detailed(total) => total.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitsTotal {
    pub value: u64,
    #[serde(default)]
    pub relation: String,
}

/// One matched document. `source` is kept raw so the caller picks the shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: serde_json::Value,
}
