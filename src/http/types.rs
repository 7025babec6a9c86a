use axum::extract::ws::Message;

use crate::domain::message::{ClientMessage, ServerMessage};

#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Transport(#[from] axum::Error),
    #[error("no traffic for {0:?}")]
    Idle(std::time::Duration),
    #[error("outgoing frame not accepted within {0:?}")]
    Stalled(std::time::Duration),
    #[error("too many broadcasts pending, subscription dropped")]
    Lagged,
}

pub fn encode(message: &ServerMessage) -> Result<Message, ConnectionError> {
    Ok(Message::Text(serde_json::to_string(message)?))
}

/// Parses a data frame into a client message. `None` for control frames and
/// binary payloads that are not UTF-8.
pub fn decode(frame: &Message) -> Option<Result<ClientMessage, serde_json::Error>> {
    let text = match frame {
        Message::Text(text) => text.as_str(),
        Message::Binary(bytes) => std::str::from_utf8(bytes).ok()?,
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) => return None,
    };
    Some(serde_json::from_str(text))
}
