// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by an intent classification provider.
///
/// None of these ever reach a chat user: the resolver logs them and folds
/// them into `IntentResult::Unresolved`.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Classifier request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode classifier response: {0}")]
    Decode(String),

    #[error("Classifier response has no score for top intent '{top_intent}'")]
    MissingTopIntent { top_intent: String },
}

/// Errors that can occur when loading the response table at startup.
#[derive(Debug, Error)]
pub enum ResponseTableError {
    #[error("IO error reading response table {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed response table {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Response table is empty: {path}")]
    Empty { path: PathBuf },
}
