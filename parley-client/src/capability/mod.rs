mod media;
mod peer;

pub use media::{MediaSource, MediaStream};
pub use peer::{IceConnectionState, PeerConnection, PeerConnectionFactory, PeerEvent};
