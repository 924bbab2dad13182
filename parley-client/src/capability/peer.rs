use crate::capability::media::MediaStream;
use crate::error::EngineError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Failed,
    Disconnected,
    Closed,
}

/// Asynchronous notifications from the peer-connection capability.
#[derive(Debug, Clone)]
pub enum PeerEvent {
    /// A local network-path candidate to forward to the remote peer.
    IceCandidate(Value),
    /// The first remote media track arrived; the call is live.
    RemoteTrack,
    IceConnectionStateChange(IceConnectionState),
}

/// Peer-connection capability. Session descriptions and candidates are
/// opaque JSON payloads; codecs and NAT traversal live behind this
/// seam.
#[async_trait]
pub trait PeerConnection: Send + Sync {
    async fn create_offer(&self) -> Result<Value, EngineError>;
    async fn create_answer(&self) -> Result<Value, EngineError>;
    async fn set_local_description(&self, description: Value) -> Result<(), EngineError>;
    async fn set_remote_description(&self, description: Value) -> Result<(), EngineError>;
    async fn add_ice_candidate(&self, candidate: Value) -> Result<(), EngineError>;
    async fn add_stream(&self, stream: Arc<dyn MediaStream>) -> Result<(), EngineError>;
    async fn close(&self);
}

/// Builds one peer connection per call attempt. The returned receiver
/// is the event subscription handle: dropping it on teardown
/// unsubscribes deterministically.
#[async_trait]
pub trait PeerConnectionFactory: Send + Sync {
    async fn create(
        &self,
    ) -> Result<(Arc<dyn PeerConnection>, mpsc::UnboundedReceiver<PeerEvent>), EngineError>;
}
