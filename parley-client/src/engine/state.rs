use crate::error::EngineError;
use parley_core::{ChatMessage, RoomId};
use tokio::sync::mpsc;

/// `Closed` is reachable from every other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    AwaitingLocalMedia,
    Negotiating,
    Connected,
    Closed,
}

/// Who creates the offer in this negotiation round. The party already
/// present when a second peer joins initiates; the joiner responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Role {
    Initiator,
    Responder,
}

#[derive(Debug)]
pub enum CallCommand {
    Join { room: RoomId },
    StartCall,
    SendChat { text: String },
    Close,
}

#[derive(Debug, Clone)]
pub enum CallEvent {
    StateChanged(CallState),
    ChatReceived(ChatMessage),
    Failed(EngineError),
}

/// Commands are queued and processed one at a time by the engine task.
#[derive(Clone)]
pub struct CallHandle {
    tx: mpsc::UnboundedSender<CallCommand>,
}

impl CallHandle {
    pub(crate) fn new(tx: mpsc::UnboundedSender<CallCommand>) -> Self {
        Self { tx }
    }

    pub fn join(&self, room: RoomId) {
        let _ = self.tx.send(CallCommand::Join { room });
    }

    pub fn start_call(&self) {
        let _ = self.tx.send(CallCommand::StartCall);
    }

    pub fn send_chat(&self, text: impl Into<String>) {
        let _ = self.tx.send(CallCommand::SendChat { text: text.into() });
    }

    pub fn close(&self) {
        let _ = self.tx.send(CallCommand::Close);
    }
}
