use serde_json::Value;
use std::collections::VecDeque;

/// FIFO holding remote candidates that arrived before a negotiation
/// context existed. Candidates are not commutative, so flush order must
/// equal arrival order. Scoped to one context: drained once when the
/// context is created, cleared on teardown.
#[derive(Debug, Default)]
pub struct CandidateBuffer {
    queue: VecDeque<Value>,
}

impl CandidateBuffer {
    pub fn push(&mut self, candidate: Value) {
        self.queue.push_back(candidate);
    }

    /// Take all buffered candidates, in arrival order.
    pub fn drain(&mut self) -> Vec<Value> {
        self.queue.drain(..).collect()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
