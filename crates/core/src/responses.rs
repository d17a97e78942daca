// crates/core/src/responses.rs
//! Static intent → reply table, loaded once at startup.

use std::collections::HashMap;
use std::path::Path;

use crate::error::ResponseTableError;

/// Immutable mapping from intent label to canned reply text.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    entries: HashMap<String, String>,
}

impl ResponseTable {
    pub fn from_map(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Read a JSON object of `"intent": "reply"` pairs from `path`.
    ///
    /// Missing, unreadable, malformed or empty files are all errors: the
    /// relay refuses to start without replies to give.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ResponseTableError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ResponseTableError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let entries: HashMap<String, String> =
            serde_json::from_str(&raw).map_err(|source| ResponseTableError::Malformed {
                path: path.to_path_buf(),
                source,
            })?;

        if entries.is_empty() {
            return Err(ResponseTableError::Empty {
                path: path.to_path_buf(),
            });
        }

        tracing::info!(path = %path.display(), intents = entries.len(), "response table loaded");
        Ok(Self { entries })
    }

    pub fn get(&self, intent: &str) -> Option<&str> {
        self.entries.get(intent).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
