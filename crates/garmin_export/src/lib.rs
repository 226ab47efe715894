//! Garmin Connect data exporter: bulk history retrieval and local
//! JSON/Markdown artifacts.

use thiserror::Error;

pub mod aggregate;
pub mod history;
pub mod output;

#[cfg(test)]
pub mod test_utils;

/// Exporter errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("API error: {0}")]
    Api(#[from] garmin_connect_client::GarminError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for exporter operations.
pub type ExportResult<T> = Result<T, ExportError>;
