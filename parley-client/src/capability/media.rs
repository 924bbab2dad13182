use crate::error::EngineError;
use async_trait::async_trait;
use std::sync::Arc;

/// Handle to captured local media (camera + microphone). Stopping the
/// tracks must be idempotent: teardown may run after a partially built
/// call attempt.
pub trait MediaStream: Send + Sync {
    fn stop_tracks(&self);
}

/// Media-capture capability. The engine acquires local media at most
/// once per negotiation context.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<Arc<dyn MediaStream>, EngineError>;
}
