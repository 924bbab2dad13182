mod hub;
mod signaling;

pub use hub::{RelayHub, ROOM_CAPACITY};
pub use signaling::router;
