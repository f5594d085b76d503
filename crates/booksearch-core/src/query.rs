//! A small slice of the search service's query DSL.
//!
//! Only the clause kinds this tool builds are modelled. Each renders to the
//! JSON object the service expects under `"query"`.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// Full-text match; the service analyzes `text` before matching.
    Match { field: String, text: String },
    /// Exact, unanalyzed term.
    Term { field: String, value: Value },
    /// Documents that carry a non-null value for `field`.
    Exists { field: String },
    Bool(BoolQuery),
}

impl Query {
    pub fn match_text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists {
            field: field.into(),
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Self::Match { field, text } => json!({ "match": { field: { "query": text } } }),
            Self::Term { field, value } => json!({ "term": { field: { "value": value } } }),
            Self::Exists { field } => json!({ "exists": { "field": field } }),
            Self::Bool(b) => b.to_value(),
        }
    }
}

impl From<BoolQuery> for Query {
    fn from(value: BoolQuery) -> Self {
        Self::Bool(value)
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Compound query. A document matches a `should`-only query when it satisfies
/// at least one of the `should` clauses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    must: Vec<Query>,
    should: Vec<Query>,
    filter: Vec<Query>,
    must_not: Vec<Query>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, queries: impl IntoIterator<Item = Query>) -> Self {
        self.must.extend(queries);
        self
    }

    pub fn should(mut self, queries: impl IntoIterator<Item = Query>) -> Self {
        self.should.extend(queries);
        self
    }

    pub fn filter(mut self, queries: impl IntoIterator<Item = Query>) -> Self {
        self.filter.extend(queries);
        self
    }

    pub fn must_not(mut self, queries: impl IntoIterator<Item = Query>) -> Self {
        self.must_not.extend(queries);
        self
    }

    pub fn should_clauses(&self) -> &[Query] {
        &self.should
    }

    fn to_value(&self) -> Value {
        let mut body = Map::new();
        for (key, clauses) in [
            ("must", &self.must),
            ("should", &self.should),
            ("filter", &self.filter),
            ("must_not", &self.must_not),
        ] {
            if !clauses.is_empty() {
                body.insert(
                    key.to_string(),
                    clauses.iter().map(Query::to_value).collect(),
                );
            }
        }
        json!({ "bool": body })
    }
}

/// Search request body.
#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: Query,
}

impl SearchRequest {
    pub fn new(query: impl Into<Query>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// `should` of one `match` clause per name against `field`.
pub fn any_of(field: &str, names: &[&str]) -> BoolQuery {
    BoolQuery::new()
        .should(names.iter().map(|name| Query::match_text(field, *name)))
}
