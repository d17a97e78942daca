//! Wire format of the chat websocket.
//!
//! Client → server: `{"type":"message","text":"..."}`, or any other text
//! frame, which is taken verbatim as the message.
//! Server → client: `{"type":"response","text":"..."}` and `{"type":"clear"}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientEvent {
    Message { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    Response { text: String },
    /// Tell the client to wipe its conversation view.
    Clear,
}

/// Extract the user's message from a text frame.
///
/// Blank messages are kept: they still earn the user a reply.
pub fn parse_inbound(raw: &str) -> String {
    match serde_json::from_str::<ClientEvent>(raw) {
        Ok(ClientEvent::Message { text }) => text,
        Err(_) => raw.to_string(),
    }
}
