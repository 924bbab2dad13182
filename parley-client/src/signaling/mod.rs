mod ws;

pub use ws::WsSignaling;

use crate::error::EngineError;
use async_trait::async_trait;
use parley_core::ClientMessage;

/// Outbound half of the signaling channel. The engine is generic over
/// this seam so tests can substitute an in-memory transport.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    async fn send(&self, msg: ClientMessage) -> Result<(), EngineError>;
}
