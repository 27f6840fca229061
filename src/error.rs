//! Error types for the map.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("export error: {0}")]
    Export(String),

    #[error("display error: {0}")]
    Display(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A failure to get reports from a data source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    Status(u16),

    #[error("could not decode reports: {0}")]
    Decode(String),
}
