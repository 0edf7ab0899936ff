use crate::game::snake::Snake;
use crate::protocol::{encode_server_event, ServerEvent};
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

/// Outbound queue of encoded JSON frames for one websocket.
pub type EventSender = UnboundedSender<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// What a connection learns about itself after being seated.
#[derive(Debug, Clone)]
pub struct JoinedPlayer {
    pub connection_id: ConnectionId,
    pub player_id: String,
    pub color: String,
    pub slot: usize,
}

#[derive(Debug)]
pub(crate) struct Seat {
    pub(crate) connection_id: ConnectionId,
    pub(crate) sender: EventSender,
    pub(crate) snake: Snake,
}

impl Seat {
    pub(crate) fn send(&self, event: &ServerEvent) {
        if let Some(payload) = encode(event) {
            let _ = self.sender.send(payload);
        }
    }
}

pub(crate) fn encode(event: &ServerEvent) -> Option<String> {
    match encode_server_event(event) {
        Ok(payload) => Some(payload),
        Err(error) => {
            tracing::warn!(?error, "failed to encode server event");
            None
        }
    }
}
