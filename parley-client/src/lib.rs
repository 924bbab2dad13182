pub mod capability;
pub mod engine;
pub mod error;
pub mod signaling;

pub use engine::{CallEngine, CallEvent, CallHandle, CallState};
pub use error::EngineError;
