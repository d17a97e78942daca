// crates/core/src/lib.rs
//! Transport-free core of the chatbot relay: intent classification,
//! confidence gating, canned responses and fallback escalation.

pub mod classifier;
pub mod clu;
pub mod error;
pub mod fallback;
pub mod resolver;
pub mod responses;

pub use classifier::{IntentClassifier, IntentScore, Prediction};
pub use clu::{CluClient, CluConfig};
pub use error::*;
pub use fallback::{FallbackPolicy, Reply, ReplyKind, Session, SessionId, Topic};
pub use resolver::{IntentResolver, IntentResult, DEFAULT_CONFIDENCE_THRESHOLD};
pub use responses::ResponseTable;
