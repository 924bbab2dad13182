use parley_core::SessionId;

/// The offer/answer exchange is only well defined between two parties,
/// so rooms refuse a third joiner outright instead of leaving the
/// behavior undefined.
pub const ROOM_CAPACITY: usize = 2;

/// Membership record for one room. Rooms are created implicitly on
/// first join and removed once the last member leaves.
#[derive(Debug, Default)]
pub struct Room {
    members: Vec<SessionId>,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.members.len() >= ROOM_CAPACITY
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.members.contains(session_id)
    }

    pub fn add(&mut self, session_id: SessionId) {
        if !self.members.contains(&session_id) {
            self.members.push(session_id);
        }
    }

    pub fn remove(&mut self, session_id: &SessionId) {
        self.members.retain(|m| m != session_id);
    }

    pub fn members(&self) -> &[SessionId] {
        &self.members
    }

    /// Every member except `session_id`.
    pub fn others(&self, session_id: &SessionId) -> Vec<SessionId> {
        self.members
            .iter()
            .filter(|m| *m != session_id)
            .cloned()
            .collect()
    }
}
