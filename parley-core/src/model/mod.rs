mod chat;
mod room;
mod session;
mod signaling;

pub use chat::ChatMessage;
pub use room::RoomId;
pub use session::SessionId;
pub use signaling::{ClientMessage, ServerMessage};
