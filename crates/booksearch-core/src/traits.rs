use crate::error::Result;
use crate::query::SearchRequest;
use crate::types::{CreateIndexResponse, Document, IndexName, IndexResponse, SearchResponse};

/// The operations consumed from the external search service.
///
/// Implementations report transport and service failures as `Error::Http`;
/// the runner decides what each failure means.
pub trait SearchService: Send + Sync {
    fn index_exists(&self, index: &IndexName) -> Result<bool>;
    /// `body` is forwarded verbatim; an empty body creates the index without a mapping.
    fn create_index(&self, index: &IndexName, body: &[u8]) -> Result<CreateIndexResponse>;
    /// The service's mapping response, keyed by index name.
    fn get_mapping(&self, index: &IndexName) -> Result<serde_json::Value>;
    fn index_document(&self, index: &IndexName, doc: &Document) -> Result<IndexResponse>;
    fn search(
        &self,
        indexes: &[IndexName],
        request: &SearchRequest,
        pretty: bool,
    ) -> Result<SearchResponse>;
}
