use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run. Per-URL failures never end up here; they
/// are recorded on the corresponding [`crate::PerformanceRecord`].
#[derive(Error, Debug)]
pub enum CollectorError {
    #[error("cannot read URL list {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write output file {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type CollectorResult<T> = Result<T, CollectorError>;
