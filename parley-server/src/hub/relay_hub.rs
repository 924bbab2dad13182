use crate::hub::room::Room;
use crate::hub::session::Session;
use dashmap::DashMap;
use parley_core::{ChatMessage, ClientMessage, RoomId, ServerMessage, SessionId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

struct HubInner {
    sessions: DashMap<SessionId, Session>,
    rooms: DashMap<RoomId, Room>,
}

/// Process-wide signaling registry: maps rooms to connected sessions
/// and forwards offer/answer/candidate frames between room members.
///
/// The hub never parses relayed payloads and holds no negotiation
/// state. Membership mutations for one room are atomic (they happen
/// under the room's map entry guard); a relay racing a join sees the
/// member set either before or after the join, never mid-update.
/// Delivery to a session that already dropped its receiver is silently
/// discarded.
#[derive(Clone)]
pub struct RelayHub {
    inner: Arc<HubInner>,
}

impl RelayHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                sessions: DashMap::new(),
                rooms: DashMap::new(),
            }),
        }
    }

    /// Register a connection and assign its session id. The first frame
    /// the client sees is the `welcome` carrying that id.
    pub fn connect(&self, tx: mpsc::UnboundedSender<ServerMessage>) -> SessionId {
        let session_id = SessionId::new();

        let _ = tx.send(ServerMessage::Welcome {
            session_id: session_id.clone(),
        });
        self.inner
            .sessions
            .insert(session_id.clone(), Session::new(tx));

        info!(%session_id, "session connected");
        session_id
    }

    /// Remove a session and its room membership. No departure frame is
    /// sent to the remaining member; peers detect departure through
    /// their own transport-level failure signals.
    pub fn disconnect(&self, session_id: &SessionId) {
        let Some((_, session)) = self.inner.sessions.remove(session_id) else {
            return;
        };

        if let Some(room_id) = session.room {
            self.remove_from_room(session_id, &room_id);
        }
        info!(%session_id, "session disconnected");
    }

    /// Dispatch one decoded client frame.
    pub fn handle_message(&self, sender: &SessionId, msg: ClientMessage) {
        match msg {
            ClientMessage::JoinRoom { room } => self.join(sender, room),
            ClientMessage::Offer { room, offer } => {
                self.relay(sender, &room, ServerMessage::Offer { room: room.clone(), offer });
            }
            ClientMessage::Answer { room, answer } => {
                self.relay(sender, &room, ServerMessage::Answer { room: room.clone(), answer });
            }
            ClientMessage::Candidate { room, candidate } => {
                self.relay(
                    sender,
                    &room,
                    ServerMessage::Candidate { room: room.clone(), candidate },
                );
            }
            ClientMessage::SendMessage { room, message } => {
                self.broadcast_chat(sender, &room, message);
            }
        }
    }

    /// Add `session_id` to a room and notify the existing members with
    /// `peer-joined`. Re-joining the current room is a no-op; joining a
    /// different room leaves the previous one first. A join that would
    /// exceed the room capacity is refused and logged, with no wire
    /// error.
    pub fn join(&self, session_id: &SessionId, room_id: RoomId) {
        let previous = match self.inner.sessions.get(session_id) {
            Some(session) => session.room.clone(),
            None => {
                warn!(%session_id, "join from unknown session");
                return;
            }
        };

        if previous.as_ref() == Some(&room_id) {
            debug!(%session_id, room = %room_id, "already a member, ignoring re-join");
            return;
        }

        // Capacity check and insertion happen under the entry guard so
        // two concurrent joiners cannot both slip into the last slot.
        let others = {
            let mut room = self.inner.rooms.entry(room_id.clone()).or_default();
            if room.is_full() {
                warn!(%session_id, room = %room_id, "room is full, join refused");
                return;
            }
            let others = room.others(session_id);
            room.add(session_id.clone());
            others
        };

        if let Some(previous_room) = previous {
            self.remove_from_room(session_id, &previous_room);
        }
        if let Some(mut session) = self.inner.sessions.get_mut(session_id) {
            session.room = Some(room_id.clone());
        }

        info!(%session_id, room = %room_id, "joined room");
        for member in others {
            self.send_to(
                &member,
                ServerMessage::PeerJoined {
                    session_id: session_id.clone(),
                },
            );
        }
    }

    /// Forward a signaling frame to every other member of the sender's
    /// room, verbatim. A sender with no room membership (or one naming
    /// a room it is not a member of) is protocol misuse by the client:
    /// the frame is dropped without an error. A room with no other
    /// members forwards to zero recipients, which is not an error
    /// either.
    fn relay(&self, sender: &SessionId, room_id: &RoomId, msg: ServerMessage) {
        if !self.is_member(sender, room_id) {
            debug!(%sender, room = %room_id, "relay from non-member, dropping");
            return;
        }

        let targets = match self.inner.rooms.get(room_id) {
            Some(room) => room.others(sender),
            None => return,
        };

        for target in targets {
            self.send_to(&target, msg.clone());
        }
    }

    /// Chat is an inclusive broadcast: unlike offer/answer/candidate it
    /// is delivered to every member of the room, the sender included.
    fn broadcast_chat(&self, sender: &SessionId, room_id: &RoomId, message: ChatMessage) {
        if !self.is_member(sender, room_id) {
            debug!(%sender, room = %room_id, "chat from non-member, dropping");
            return;
        }

        let members = match self.inner.rooms.get(room_id) {
            Some(room) => room.members().to_vec(),
            None => return,
        };

        for member in members {
            self.send_to(&member, ServerMessage::ReceiveMessage { message: message.clone() });
        }
    }

    /// Current member set of a room. Empty if the room does not exist.
    pub fn room_members(&self, room_id: &RoomId) -> Vec<SessionId> {
        self.inner
            .rooms
            .get(room_id)
            .map(|room| room.members().to_vec())
            .unwrap_or_default()
    }

    pub fn session_count(&self) -> usize {
        self.inner.sessions.len()
    }

    fn is_member(&self, session_id: &SessionId, room_id: &RoomId) -> bool {
        self.inner
            .rooms
            .get(room_id)
            .is_some_and(|room| room.contains(session_id))
    }

    fn remove_from_room(&self, session_id: &SessionId, room_id: &RoomId) {
        if let dashmap::mapref::entry::Entry::Occupied(mut entry) =
            self.inner.rooms.entry(room_id.clone())
        {
            entry.get_mut().remove(session_id);
            if entry.get().is_empty() {
                entry.remove();
                debug!(room = %room_id, "room empty, removed");
            }
        }
    }

    fn send_to(&self, session_id: &SessionId, msg: ServerMessage) {
        if let Some(session) = self.inner.sessions.get(session_id) {
            // A send error means the receiver side is already gone;
            // the frame is simply dropped.
            let _ = session.tx.send(msg);
        } else {
            debug!(%session_id, "target session already departed, dropping frame");
        }
    }
}

impl Default for RelayHub {
    fn default() -> Self {
        Self::new()
    }
}
