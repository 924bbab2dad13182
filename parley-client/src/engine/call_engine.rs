use crate::capability::{
    IceConnectionState, MediaSource, MediaStream, PeerConnection, PeerConnectionFactory, PeerEvent,
};
use crate::engine::candidate_buffer::CandidateBuffer;
use crate::engine::state::{CallCommand, CallEvent, CallHandle, CallState, Role};
use crate::error::EngineError;
use crate::signaling::SignalingTransport;
use parley_core::{ChatMessage, ClientMessage, RoomId, ServerMessage, SessionId};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

// At most one per attempt, torn down on close.
struct NegotiationContext {
    pc: Arc<dyn PeerConnection>,
    stream: Arc<dyn MediaStream>,
    role: Role,
}

/// Client-side negotiation state machine.
///
/// The engine is an event loop that owns all call state: user commands,
/// inbound signaling frames and peer-connection events are drained from
/// their channels and each transition runs to completion before the
/// next one starts, so nothing ever mutates the same context
/// concurrently. A close command queued behind a pending step takes
/// effect right after it, discarding whatever that step produced.
pub struct CallEngine {
    signaling: Arc<dyn SignalingTransport>,
    media: Arc<dyn MediaSource>,
    factory: Arc<dyn PeerConnectionFactory>,

    state: CallState,
    room: Option<RoomId>,
    session_id: Option<SessionId>,
    context: Option<NegotiationContext>,
    pending_candidates: CandidateBuffer,

    command_rx: mpsc::UnboundedReceiver<CallCommand>,
    signal_rx: mpsc::UnboundedReceiver<ServerMessage>,
    peer_events: Option<mpsc::UnboundedReceiver<PeerEvent>>,
    events_tx: mpsc::UnboundedSender<CallEvent>,
}

impl CallEngine {
    /// Build an engine wired to the given collaborators. `signal_rx` is
    /// the inbound half of the signaling channel. Returns the engine
    /// (drive it with [`CallEngine::run`]), the control handle and the
    /// observer event stream.
    pub fn new(
        signaling: Arc<dyn SignalingTransport>,
        media: Arc<dyn MediaSource>,
        factory: Arc<dyn PeerConnectionFactory>,
        signal_rx: mpsc::UnboundedReceiver<ServerMessage>,
    ) -> (Self, CallHandle, mpsc::UnboundedReceiver<CallEvent>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let engine = Self {
            signaling,
            media,
            factory,
            state: CallState::Idle,
            room: None,
            session_id: None,
            context: None,
            pending_candidates: CandidateBuffer::default(),
            command_rx,
            signal_rx,
            peer_events: None,
            events_tx,
        };

        (engine, CallHandle::new(command_tx), events_rx)
    }

    pub async fn run(mut self) {
        info!("call engine started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(CallCommand::Close) | None => {
                        self.teardown().await;
                        break;
                    }
                    Some(cmd) => self.handle_command(cmd).await,
                },

                msg = self.signal_rx.recv() => match msg {
                    Some(msg) => self.handle_signal(msg).await,
                    None => {
                        warn!("signaling channel closed");
                        self.fail(EngineError::SignalingClosed);
                        self.teardown().await;
                        break;
                    }
                },

                event = recv_peer_event(&mut self.peer_events) => match event {
                    Some(event) => self.handle_peer_event(event).await,
                    None => self.peer_events = None,
                },
            }
        }

        info!("call engine stopped");
    }

    async fn handle_command(&mut self, cmd: CallCommand) {
        match cmd {
            CallCommand::Join { room } => {
                // Membership alone does not start negotiation.
                self.room = Some(room.clone());
                if let Err(e) = self.signaling.send(ClientMessage::JoinRoom { room }).await {
                    self.fail(e);
                }
            }
            CallCommand::StartCall => self.begin_negotiation().await,
            CallCommand::SendChat { text } => self.send_chat(text).await,
            CallCommand::Close => {} // intercepted by the run loop
        }
    }

    async fn handle_signal(&mut self, msg: ServerMessage) {
        match msg {
            ServerMessage::Welcome { session_id } => {
                debug!(%session_id, "welcome received");
                self.session_id = Some(session_id);
            }
            ServerMessage::PeerJoined { session_id } => {
                info!(peer = %session_id, "peer joined, initiating call");
                self.begin_negotiation().await;
            }
            ServerMessage::Offer { offer, .. } => self.respond_to_offer(offer).await,
            ServerMessage::Answer { answer, .. } => self.apply_answer(answer).await,
            ServerMessage::Candidate { candidate, .. } => self.handle_candidate(candidate).await,
            ServerMessage::ReceiveMessage { message } => {
                self.emit(CallEvent::ChatReceived(message));
            }
        }
    }

    /// Act as initiator: build the context, produce an offer, record it
    /// locally and send it. Triggered by `peer-joined` or an explicit
    /// user start. A second trigger while a context is live is ignored:
    /// only one local description is ever set per context.
    async fn begin_negotiation(&mut self) {
        if self.context.is_some() {
            warn!("negotiation already in progress, ignoring duplicate trigger");
            return;
        }
        let Some(room) = self.room.clone() else {
            warn!("call start requested before joining a room");
            return;
        };

        if let Err(e) = self.create_context(Role::Initiator).await {
            self.fail(e);
            return;
        }
        let Some(pc) = self.peer_connection() else {
            return;
        };

        let offer = match pc.create_offer().await {
            Ok(offer) => offer,
            Err(e) => {
                self.fail(e);
                return;
            }
        };
        if let Err(e) = pc.set_local_description(offer.clone()).await {
            self.fail(e);
            return;
        }
        if let Err(e) = self.signaling.send(ClientMessage::Offer { room, offer }).await {
            self.fail(e);
            return;
        }

        self.set_state(CallState::Negotiating);
        info!("offer sent, awaiting answer");
    }

    /// Act as responder: build the context, apply the remote offer,
    /// produce and send an answer.
    async fn respond_to_offer(&mut self, offer: Value) {
        if self.context.is_some() {
            warn!("offer received while negotiation already in progress, ignoring");
            return;
        }
        let Some(room) = self.room.clone() else {
            warn!("offer received before joining a room, ignoring");
            return;
        };

        if let Err(e) = self.create_context(Role::Responder).await {
            self.fail(e);
            return;
        }
        let Some(pc) = self.peer_connection() else {
            return;
        };

        if let Err(e) = pc.set_remote_description(offer).await {
            self.fail(e);
            return;
        }
        let answer = match pc.create_answer().await {
            Ok(answer) => answer,
            Err(e) => {
                self.fail(e);
                return;
            }
        };
        if let Err(e) = pc.set_local_description(answer.clone()).await {
            self.fail(e);
            return;
        }
        if let Err(e) = self
            .signaling
            .send(ClientMessage::Answer { room, answer })
            .await
        {
            self.fail(e);
            return;
        }

        self.set_state(CallState::Negotiating);
        info!("answer sent");
    }

    /// Apply a remote answer. Only meaningful for an initiator with a
    /// live context; anything else is a stray frame, logged and
    /// dropped. `Connected` is reached later, on the first remote
    /// track.
    async fn apply_answer(&mut self, answer: Value) {
        match self.context.as_ref().map(|ctx| (ctx.pc.clone(), ctx.role)) {
            Some((pc, Role::Initiator)) => {
                if let Err(e) = pc.set_remote_description(answer).await {
                    self.fail(e);
                } else {
                    debug!("remote answer applied");
                }
            }
            Some((_, Role::Responder)) => {
                warn!("answer received while acting as responder, ignoring");
            }
            None => warn!("answer received with no active negotiation context, ignoring"),
        }
    }

    /// Apply a remote candidate now if a context exists, otherwise hold
    /// it in the buffer until one does. Empty payloads are dropped
    /// without error.
    async fn handle_candidate(&mut self, candidate: Value) {
        if is_empty_candidate(&candidate) {
            debug!("empty candidate payload, ignoring");
            return;
        }

        match self.peer_connection() {
            Some(pc) => {
                if let Err(e) = pc.add_ice_candidate(candidate).await {
                    warn!("failed to apply remote candidate: {e}");
                }
            }
            None => {
                self.pending_candidates.push(candidate);
                debug!(
                    buffered = self.pending_candidates.len(),
                    "no negotiation context yet, candidate buffered"
                );
            }
        }
    }

    async fn handle_peer_event(&mut self, event: PeerEvent) {
        match event {
            PeerEvent::IceCandidate(candidate) => {
                let Some(room) = self.room.clone() else {
                    return;
                };
                if let Err(e) = self
                    .signaling
                    .send(ClientMessage::Candidate { room, candidate })
                    .await
                {
                    warn!("failed to forward local candidate: {e}");
                }
            }
            PeerEvent::RemoteTrack => {
                if self.state == CallState::Negotiating {
                    info!("first remote track arrived");
                    self.set_state(CallState::Connected);
                }
            }
            PeerEvent::IceConnectionStateChange(state) => {
                debug!(?state, "ICE connection state changed");
                if state == IceConnectionState::Failed {
                    self.fail(EngineError::Connectivity);
                }
            }
        }
    }

    /// Acquire local media and a peer connection, then apply any
    /// candidates that arrived early, in their original order. On
    /// failure everything acquired so far is released: teardown must
    /// find no half-built context.
    async fn create_context(&mut self, role: Role) -> Result<(), EngineError> {
        self.set_state(CallState::AwaitingLocalMedia);

        let stream = self.media.acquire().await?;

        let (pc, events) = match self.factory.create().await {
            Ok(created) => created,
            Err(e) => {
                stream.stop_tracks();
                return Err(e);
            }
        };
        if let Err(e) = pc.add_stream(stream.clone()).await {
            stream.stop_tracks();
            pc.close().await;
            return Err(e);
        }

        for candidate in self.pending_candidates.drain() {
            if let Err(e) = pc.add_ice_candidate(candidate).await {
                warn!("failed to apply buffered candidate: {e}");
            }
        }

        self.peer_events = Some(events);
        self.context = Some(NegotiationContext { pc, stream, role });
        Ok(())
    }

    async fn send_chat(&mut self, text: String) {
        let Some(room) = self.room.clone() else {
            warn!("chat sent before joining a room, dropping");
            return;
        };
        let Some(from) = self.session_id.clone() else {
            warn!("chat sent before the welcome frame, dropping");
            return;
        };

        let message = ChatMessage::new(from, text);
        if let Err(e) = self
            .signaling
            .send(ClientMessage::SendMessage { room, message })
            .await
        {
            self.fail(e);
        }
    }

    /// Release everything, from whatever state the attempt reached.
    async fn teardown(&mut self) {
        if let Some(ctx) = self.context.take() {
            ctx.pc.close().await;
            ctx.stream.stop_tracks();
        }
        // Dropping the receiver releases the peer-event subscription.
        self.peer_events = None;
        self.pending_candidates.clear();
        self.set_state(CallState::Closed);
    }

    fn peer_connection(&self) -> Option<Arc<dyn PeerConnection>> {
        self.context.as_ref().map(|ctx| ctx.pc.clone())
    }

    fn set_state(&mut self, state: CallState) {
        if self.state == state {
            return;
        }
        debug!(from = ?self.state, to = ?state, "state transition");
        self.state = state;
        self.emit(CallEvent::StateChanged(state));
    }

    fn fail(&self, err: EngineError) {
        error!("call attempt failed: {err}");
        self.emit(CallEvent::Failed(err));
    }

    fn emit(&self, event: CallEvent) {
        let _ = self.events_tx.send(event);
    }
}

async fn recv_peer_event(rx: &mut Option<mpsc::UnboundedReceiver<PeerEvent>>) -> Option<PeerEvent> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

fn is_empty_candidate(candidate: &Value) -> bool {
    match candidate {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
