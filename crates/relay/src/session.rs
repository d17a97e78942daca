//! Message processing for one connected chat user.
//!
//! A session task owns its `Session` outright. Inbound messages are handled
//! strictly one at a time (resolve, advance, reply) so a slow classifier
//! call can never interleave two state updates for the same user. Different
//! sessions run in different tasks and share only read-only state.

use std::time::Duration;

use chatbot_relay_core::Session;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::protocol::ServerEvent;
use crate::state::{RelayState, SessionId};

/// Messages a session may have waiting behind the one being classified.
/// Once full, the socket reader stops pulling frames off the wire.
pub const INBOUND_QUEUE_DEPTH: usize = 8;

/// Drive one session until the client goes away.
///
/// Returns when `cancel` fires or `inbound` closes. Cancellation also
/// abandons an in-flight classifier call, so nothing is sent or mutated
/// for a user who has already disconnected. The final state is returned
/// for inspection; it is never persisted.
pub async fn run_session(
    state: RelayState,
    session_id: SessionId,
    mut inbound: mpsc::Receiver<String>,
    outbound: mpsc::UnboundedSender<ServerEvent>,
    cancel: CancellationToken,
) -> Session {
    let mut session = Session::new(session_id);

    loop {
        let text = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = inbound.recv() => match next {
                Some(text) => text,
                None => break,
            },
        };

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%session_id, "session closed during classification, dropping message");
                break;
            }
            result = state.resolver.resolve(&text) => result,
        };

        let reply = session.advance(result, &state.responses, &state.policy);
        debug!(
            %session_id,
            kind = ?reply.kind,
            streak = session.fallback_streak(),
            last_intent = ?session.last_good_intent(),
            "reply ready"
        );

        if outbound.send(ServerEvent::Response { text: reply.text }).is_err() {
            break;
        }
        if let Some(delay) = reply.clear_after {
            schedule_clear(session_id, outbound.clone(), delay, cancel.child_token());
        }
    }

    session
}

/// Send `ServerEvent::Clear` after `delay` unless `cancel` fires first.
pub fn schedule_clear(
    session_id: SessionId,
    outbound: mpsc::UnboundedSender<ServerEvent>,
    delay: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%session_id, "pending clear discarded");
            }
            _ = tokio::time::sleep(delay) => {
                debug!(%session_id, "clearing conversation");
                let _ = outbound.send(ServerEvent::Clear);
            }
        }
    })
}
