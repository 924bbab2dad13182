use crate::utils::{spawn_engine, wait_for_chat_on};
use parley_core::{ChatMessage, ClientMessage, RoomId, ServerMessage, SessionId};

#[tokio::test]
async fn test_sent_chat_is_stamped_with_identity_and_time() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    let session_id = call.join_and_welcome(&room).await;

    call.handle.send_chat("hello there");

    match call.next_outbound().await {
        ClientMessage::SendMessage { room: sent, message } => {
            assert_eq!(sent, room);
            assert_eq!(message.message, "hello there");
            assert_eq!(message.from, session_id);
            assert!(message.time > 0);
        }
        other => panic!("expected send_message, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_before_welcome_is_dropped() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");

    // joined, but the relay has not assigned an identity yet
    call.handle.join(room.clone());
    call.next_outbound().await; // join-room

    call.handle.send_chat("too early");
    call.assert_no_outbound().await;
}

#[tokio::test]
async fn test_received_chat_is_surfaced_to_the_observer() {
    let mut call = spawn_engine();
    let room = RoomId::from("r1");
    call.join_and_welcome(&room).await;

    let message = ChatMessage {
        message: "hi".to_string(),
        from: SessionId::new(),
        time: 1_700_000_000_000,
    };
    call.inject(ServerMessage::ReceiveMessage {
        message: message.clone(),
    });

    assert_eq!(wait_for_chat_on(&mut call.events).await, message);
}
