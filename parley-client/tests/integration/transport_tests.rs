use crate::utils::{EVENT_TIMEOUT, init_tracing, wait_until};
use parley_client::signaling::{SignalingTransport, WsSignaling};
use parley_core::{ClientMessage, RoomId, ServerMessage};
use parley_server::{RelayHub, router};

/// Serve a relay on an ephemeral port and return its ws URL.
async fn spawn_relay(hub: RelayHub) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(hub)).await.expect("serve");
    });
    format!("ws://{addr}/ws")
}

async fn connect(url: &str) -> (WsSignaling, tokio::sync::mpsc::UnboundedReceiver<ServerMessage>) {
    let (signaling, mut inbound) = WsSignaling::connect(url).await.expect("ws connect");
    let frame = tokio::time::timeout(EVENT_TIMEOUT, inbound.recv())
        .await
        .expect("timed out waiting for the welcome frame")
        .expect("inbound channel closed");
    assert!(matches!(frame, ServerMessage::Welcome { .. }));
    (signaling, inbound)
}

#[tokio::test]
async fn test_ws_transport_carries_frames_to_the_relay() {
    init_tracing();
    let hub = RelayHub::new();
    let url = spawn_relay(hub.clone()).await;
    let room = RoomId::from("r1");

    let (signaling, _inbound) = connect(&url).await;
    signaling
        .send(ClientMessage::JoinRoom { room: room.clone() })
        .await
        .expect("send join");

    wait_until(|| hub.room_members(&room).len() == 1).await;
}

#[tokio::test]
async fn test_ws_close_hangs_up_cleanly_at_the_relay() {
    init_tracing();
    let hub = RelayHub::new();
    let url = spawn_relay(hub.clone()).await;

    let (signaling, _inbound) = connect(&url).await;
    wait_until(|| hub.session_count() == 1).await;

    signaling.close();

    // the close frame ends the relay session, not just the local tasks
    wait_until(|| hub.session_count() == 0).await;
}
