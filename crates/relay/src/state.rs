use std::sync::Arc;
use std::time::Instant;

use chatbot_relay_core::{FallbackPolicy, IntentResolver, ResponseTable};
use dashmap::DashMap;

pub use chatbot_relay_core::SessionId;

/// Connection metadata for one live chat socket.
///
/// Fallback state is deliberately absent: it is owned by the socket task.
pub struct ConnectedSession {
    pub session_id: SessionId,
    pub connected_at: Instant,
}

/// Shared relay server state.
#[derive(Clone)]
pub struct RelayState {
    /// Confidence-gated classifier shared by every session.
    pub resolver: Arc<IntentResolver>,
    /// Canned replies, read-only after startup.
    pub responses: Arc<ResponseTable>,
    pub policy: FallbackPolicy,
    /// Live sockets, keyed by session id.
    pub connections: Arc<DashMap<SessionId, ConnectedSession>>,
}

impl RelayState {
    pub fn new(resolver: IntentResolver, responses: ResponseTable, policy: FallbackPolicy) -> Self {
        Self {
            resolver: Arc::new(resolver),
            responses: Arc::new(responses),
            policy,
            connections: Arc::new(DashMap::new()),
        }
    }
}
