mod relay_hub;
mod room;
mod session;

pub use relay_hub::RelayHub;
pub use room::ROOM_CAPACITY;
