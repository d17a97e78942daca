// crates/core/src/resolver.rs
//! Confidence-gated intent resolution.
//!
//! Wraps an `IntentClassifier` and reduces its output to a yes/no answer:
//! either a label the classifier is confident about, or `Unresolved`.
//! Provider failures and low-confidence guesses are deliberately
//! indistinguishable to callers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::classifier::IntentClassifier;

/// Minimum top-intent confidence accepted as a real classification.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.82;

/// Outcome of resolving one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentResult {
    Resolved(String),
    Unresolved,
}

pub struct IntentResolver {
    classifier: Arc<dyn IntentClassifier>,
    threshold: f64,
}

impl IntentResolver {
    pub fn new(classifier: Arc<dyn IntentClassifier>, threshold: f64) -> Self {
        Self {
            classifier,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify `text` and accept the top intent iff its score is at or
    /// above the threshold. Input is lowercased before classification;
    /// blank input is `Unresolved` without a provider call.
    pub async fn resolve(&self, text: &str) -> IntentResult {
        if text.trim().is_empty() {
            debug!("blank message, nothing to classify");
            return IntentResult::Unresolved;
        }
        let normalized = text.to_lowercase();

        let prediction = match self.classifier.classify(&normalized).await {
            Ok(p) => p,
            Err(e) => {
                warn!(provider = self.classifier.name(), error = %e, "intent classification failed");
                return IntentResult::Unresolved;
            }
        };

        let Some(confidence) = prediction.top_confidence() else {
            warn!(
                provider = self.classifier.name(),
                top_intent = %prediction.top_intent,
                "top intent missing from candidate list"
            );
            return IntentResult::Unresolved;
        };

        if confidence >= self.threshold {
            debug!(intent = %prediction.top_intent, confidence, "intent resolved");
            IntentResult::Resolved(prediction.top_intent)
        } else {
            debug!(
                intent = %prediction.top_intent,
                confidence,
                threshold = self.threshold,
                "intent below confidence threshold"
            );
            IntentResult::Unresolved
        }
    }
}
