pub mod model;

pub use model::{ChatMessage, ClientMessage, RoomId, ServerMessage, SessionId};
