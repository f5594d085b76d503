//! booksearch-elastic
//!
//! Blocking HTTP implementation of `booksearch_core::traits::SearchService`
//! for Elasticsearch-compatible services.
pub mod client;

pub use client::{ClientOptions, ElasticClient};
