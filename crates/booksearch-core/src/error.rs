use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Error creating the client: {0}")]
    Connection(String),

    /// Raw failure reported by the transport or by the search service itself.
    /// `status` is `None` when no HTTP response was received.
    #[error("{}", fmt_http(.status, .message))]
    Http { status: Option<u16>, message: String },

    #[error("Error checking index [{index}]: {reason}")]
    ServiceQuery { index: String, reason: String },

    #[error("Error reading mapping file {}: {source}", .path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error creating the index [{index}]: {reason}")]
    CreateIndex { index: String, reason: String },

    #[error("Error creating the index [{0}]: not acknowledged")]
    NotAcknowledged(String),

    #[error("Error inserting the document: {0}")]
    Insert(String),

    #[error("Error searching: {0}")]
    Search(String),

    #[error("Error getting the mapping: {0}")]
    MappingFetch(String),
}

fn fmt_http(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("service returned {code}: {message}"),
        None => format!("transport error: {message}"),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
