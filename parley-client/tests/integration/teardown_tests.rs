use crate::utils::spawn_engine;
use parley_client::CallState;
use parley_client::capability::PeerEvent;
use parley_core::{RoomId, ServerMessage, SessionId};
use std::time::Duration;

#[tokio::test]
async fn test_close_from_idle_releases_nothing_and_reaches_closed() {
    let mut call = spawn_engine();

    call.handle.close();
    call.wait_for_state(CallState::Closed).await;

    assert_eq!(call.media.acquire_count(), 0);
    assert_eq!(call.factory.created_count(), 0);
}

#[tokio::test]
async fn test_close_queued_behind_slow_media_acquisition_still_releases() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    call.join_and_welcome(&room).await;
    call.media.set_delay(Duration::from_millis(100));

    call.inject(ServerMessage::PeerJoined {
        session_id: SessionId::new(),
    });
    tokio::time::sleep(Duration::from_millis(10)).await; // engine is mid-acquire
    call.handle.close();

    call.wait_for_state(CallState::Closed).await;
    assert!(call.media.all_tracks_stopped());
    assert!(call.factory.last().is_closed());
}

#[tokio::test]
async fn test_close_while_negotiating_releases_connection_and_tracks() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    call.join_and_welcome(&room).await;

    call.inject(ServerMessage::PeerJoined {
        session_id: SessionId::new(),
    });
    call.next_outbound().await; // offer
    call.wait_for_state(CallState::Negotiating).await;

    call.handle.close();
    call.wait_for_state(CallState::Closed).await;

    assert!(call.factory.last().is_closed());
    assert!(call.media.all_tracks_stopped());
}

#[tokio::test]
async fn test_close_while_connected_releases_connection_and_tracks() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    call.join_and_welcome(&room).await;

    call.inject(ServerMessage::PeerJoined {
        session_id: SessionId::new(),
    });
    call.next_outbound().await; // offer
    call.factory.last().emit(PeerEvent::RemoteTrack);
    call.wait_for_state(CallState::Connected).await;

    call.handle.close();
    call.wait_for_state(CallState::Closed).await;

    assert!(call.factory.last().is_closed());
    assert!(call.media.all_tracks_stopped());
}

#[tokio::test]
async fn test_close_after_failed_media_acquisition_does_not_panic() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    call.join_and_welcome(&room).await;
    call.media.set_failing(true);

    call.inject(ServerMessage::PeerJoined {
        session_id: SessionId::new(),
    });
    call.wait_for_failure().await;

    call.handle.close();
    call.wait_for_state(CallState::Closed).await;
    assert_eq!(call.factory.created_count(), 0);
}
