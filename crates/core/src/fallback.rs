// crates/core/src/fallback.rs
//! Per-session fallback escalation.
//!
//! Each chat session carries a failure streak. Unresolved messages bump
//! the streak and produce a topic-aware re-prompt; once the streak reaches
//! the escalation threshold the session issues a hard fallback and starts
//! counting again from zero. Any resolved message clears the streak.
//!
//! | streak before | event      | streak after | reply                         |
//! |---------------|------------|--------------|-------------------------------|
//! | any           | Resolved   | 0            | table entry for the intent    |
//! | < T-1         | Unresolved | n+1          | soft re-prompt                |
//! | T-1           | Unresolved | 0            | hard fallback (+clear if generic) |

use std::time::Duration;

use tracing::{debug, error};
use uuid::Uuid;

use crate::resolver::IntentResult;
use crate::responses::ResponseTable;

pub const DEFAULT_ESCALATION_THRESHOLD: u32 = 3;
pub const DEFAULT_CLEAR_DELAY: Duration = Duration::from_secs(4);

/// Sent when a resolved intent has no entry in the response table.
pub const INTERNAL_ERROR_REPLY: &str =
    "Sorry, something went wrong on our side while answering that. Please try again.";

/// Tunables for escalation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackPolicy {
    /// Consecutive unresolved messages that trigger a hard fallback.
    pub escalation_threshold: u32,
    /// Delay between a generic hard fallback and the clear signal.
    pub clear_delay: Duration,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self {
            escalation_threshold: DEFAULT_ESCALATION_THRESHOLD,
            clear_delay: DEFAULT_CLEAR_DELAY,
        }
    }
}

/// Conversation topic inferred from the last confidently resolved intent.
///
/// This is a coarse substring check on the label, so any label that merely
/// contains `insurance` or `bank_account` counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Insurance,
    BankAccount,
    General,
}

impl Topic {
    pub fn of(last_good_intent: Option<&str>) -> Self {
        match last_good_intent {
            Some(label) if label.contains("insurance") => Topic::Insurance,
            Some(label) if label.contains("bank_account") => Topic::BankAccount,
            _ => Topic::General,
        }
    }

    pub fn soft_reprompt(self) -> &'static str {
        match self {
            Topic::Insurance => "I am sorry I cannot understand you, please rephrase your insurance-related query. Can you provide more details about the health insurance you are looking for?",
            Topic::BankAccount => "I am sorry I cannot understand you, please rephrase your bank account-related query. Can you provide more details about the bank account you are looking to open?",
            Topic::General => "I am sorry I cannot understand you, please rephrase your query, and please make your questions clear and precise!",
        }
    }

    pub fn hard_fallback(self) -> &'static str {
        match self {
            Topic::Insurance => "It seems like you have insurance-related questions. Could you please clarify your query or ask about something specific regarding health insurance?",
            Topic::BankAccount => "It seems like you have bank account-related questions. Could you please clarify your query or ask about something specific regarding bank accounts?",
            Topic::General => "I'm sorry, but I seem to be having trouble understanding you, I shall now clear the page, and start over.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyKind {
    Direct,
    SoftFallback,
    HardFallback,
    InternalError,
}

/// What the session says back for one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub kind: ReplyKind,
    /// When set, the transport should tell the client to clear its
    /// conversation view after this delay.
    pub clear_after: Option<Duration>,
}

impl Reply {
    fn new(text: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            text: text.into(),
            kind,
            clear_after: None,
        }
    }
}

/// Opaque identity of one connection, stable for its lifetime.
pub type SessionId = Uuid;

/// Fallback state of one connected user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    fallback_streak: u32,
    last_good_intent: Option<String>,
}

impl Session {
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            fallback_streak: 0,
            last_good_intent: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn fallback_streak(&self) -> u32 {
        self.fallback_streak
    }

    pub fn last_good_intent(&self) -> Option<&str> {
        self.last_good_intent.as_deref()
    }

    /// Apply one resolution outcome and return the reply to send.
    pub fn advance(
        &mut self,
        result: IntentResult,
        responses: &ResponseTable,
        policy: &FallbackPolicy,
    ) -> Reply {
        match result {
            IntentResult::Resolved(intent) => self.on_resolved(intent, responses),
            IntentResult::Unresolved => self.on_unresolved(policy),
        }
    }

    fn on_resolved(&mut self, intent: String, responses: &ResponseTable) -> Reply {
        let reply = match responses.get(&intent) {
            Some(text) => Reply::new(text, ReplyKind::Direct),
            None => {
                error!(session_id = %self.id, intent = %intent, "resolved intent has no entry in response table");
                Reply::new(INTERNAL_ERROR_REPLY, ReplyKind::InternalError)
            }
        };
        self.fallback_streak = 0;
        self.last_good_intent = Some(intent);
        reply
    }

    fn on_unresolved(&mut self, policy: &FallbackPolicy) -> Reply {
        self.fallback_streak += 1;
        let topic = Topic::of(self.last_good_intent());

        if self.fallback_streak < policy.escalation_threshold {
            debug!(session_id = %self.id, streak = self.fallback_streak, ?topic, "soft fallback");
            return Reply::new(topic.soft_reprompt(), ReplyKind::SoftFallback);
        }

        debug!(session_id = %self.id, streak = self.fallback_streak, ?topic, "hard fallback");
        self.fallback_streak = 0;
        let mut reply = Reply::new(topic.hard_fallback(), ReplyKind::HardFallback);
        if topic == Topic::General {
            reply.clear_after = Some(policy.clear_delay);
        }
        reply
    }
}
