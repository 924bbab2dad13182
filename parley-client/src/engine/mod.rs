mod call_engine;
mod candidate_buffer;
mod state;

pub use call_engine::CallEngine;
pub use candidate_buffer::CandidateBuffer;
pub use state::{CallCommand, CallEvent, CallHandle, CallState};
