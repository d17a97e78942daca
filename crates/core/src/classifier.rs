// crates/core/src/classifier.rs
//! Intent classification provider boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;

/// One candidate label with the provider's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentScore {
    pub category: String,
    pub confidence_score: f64,
}

/// A provider's answer for one utterance: the top-ranked label plus the
/// full ranked candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub top_intent: String,
    #[serde(default)]
    pub intents: Vec<IntentScore>,
}

impl Prediction {
    /// Confidence of the candidate whose category is `top_intent`.
    ///
    /// Returns `None` when the provider named a top intent but did not
    /// score it in the candidate list.
    pub fn top_confidence(&self) -> Option<f64> {
        self.intents
            .iter()
            .find(|i| i.category == self.top_intent)
            .map(|i| i.confidence_score)
    }
}

/// Trait for providers that map free text to a ranked list of intents.
///
/// Implementations include:
/// - `CluClient` — Azure Conversational Language Understanding over HTTPS
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Prediction, ClassifierError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
