use crate::model::session::SessionId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Room-scoped chat message. Stamped with the sender identity and a
/// send-time timestamp (milliseconds since the Unix epoch) on the
/// client before it ever reaches the relay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub message: String,
    pub from: SessionId,
    pub time: u64,
}

impl ChatMessage {
    pub fn new(from: SessionId, message: String) -> Self {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            message,
            from,
            time,
        }
    }
}
