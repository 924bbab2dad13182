use parley_core::{RoomId, ServerMessage};
use tokio::sync::mpsc;

// A session belongs to at most one room at a time.
#[derive(Debug)]
pub struct Session {
    pub tx: mpsc::UnboundedSender<ServerMessage>,
    pub room: Option<RoomId>,
}

impl Session {
    pub fn new(tx: mpsc::UnboundedSender<ServerMessage>) -> Self {
        Self { tx, room: None }
    }
}
