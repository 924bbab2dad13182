use crate::model::chat::ChatMessage;
use crate::model::room::RoomId;
use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames sent from a client to the relay. Session-description and
/// candidate payloads are opaque JSON: the relay forwards them verbatim
/// and never inspects them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ClientMessage {
    #[serde(rename = "join-room")]
    JoinRoom { room: RoomId },

    #[serde(rename = "offer")]
    Offer { room: RoomId, offer: Value },

    #[serde(rename = "answer")]
    Answer { room: RoomId, answer: Value },

    #[serde(rename = "candidate")]
    Candidate { room: RoomId, candidate: Value },

    #[serde(rename = "send_message")]
    SendMessage { room: RoomId, message: ChatMessage },
}

/// Frames sent from the relay to a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d")]
pub enum ServerMessage {
    /// First frame on every connection: the relay-assigned session id.
    #[serde(rename = "welcome")]
    Welcome { session_id: SessionId },

    /// A second participant entered the room. Only existing members
    /// receive this; the joiner itself waits passively.
    #[serde(rename = "peer-joined")]
    PeerJoined { session_id: SessionId },

    #[serde(rename = "offer")]
    Offer { room: RoomId, offer: Value },

    #[serde(rename = "answer")]
    Answer { room: RoomId, answer: Value },

    #[serde(rename = "candidate")]
    Candidate { room: RoomId, candidate: Value },

    #[serde(rename = "receive_message")]
    ReceiveMessage { message: ChatMessage },
}
