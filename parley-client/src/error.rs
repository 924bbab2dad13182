use thiserror::Error;

/// Failures surfaced by the negotiation engine. None of them are
/// retried automatically: a failed call attempt stays where it stopped
/// and a fresh user-initiated start is the only recovery path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("failed to acquire local media: {0}")]
    MediaAcquisition(String),

    #[error("offer/answer step failed: {0}")]
    Description(String),

    #[error("ICE failed to establish connectivity")]
    Connectivity,

    #[error("signaling transport error: {0}")]
    Transport(String),

    #[error("signaling channel closed")]
    SignalingClosed,
}
