//! Integration tests for the message delivery lifecycle.

use chathub_entity::gateway::MessageStore;
use chathub_entity::message::MessageStatus;
use chathub_realtime::{InboundEvent, OutboundEvent};

use super::helpers::{drain, TestApp};

#[tokio::test]
async fn test_message_lifecycle_with_offline_recipient() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    drain(&mut alice_rx);

    // Bob is offline, so the message starts as Sent.
    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.direct.id,
                text: Some("are you there?".into()),
                image: None,
            },
        )
        .await;

    let stored = app
        .messages
        .find_by_conversation(&app.direct.id)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].status, MessageStatus::Sent);
    let message_id = stored[0].id;

    // Bob connects and acknowledges delivery.
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut bob_rx);
    drain(&mut alice_rx);

    app.engine
        .handle_event(&bob_conn, InboundEvent::MessageDelivered { message_id })
        .await;

    let stored = app.messages.find_by_id(&message_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MessageStatus::Delivered);

    // The sender is told about the promotion.
    let alice_events = drain(&mut alice_rx);
    assert!(alice_events.iter().any(|e| matches!(
        e,
        OutboundEvent::MessageStatusUpdated { message } if message.status == MessageStatus::Delivered
    )));

    // Bob reads the conversation; the direct message becomes Seen.
    app.engine
        .handle_event(
            &bob_conn,
            InboundEvent::MarkAsRead {
                conversation_id: app.direct.id,
                user_id: app.bob,
            },
        )
        .await;

    let stored = app.messages.find_by_id(&message_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MessageStatus::Seen);

    let alice_events = drain(&mut alice_rx);
    assert!(alice_events.iter().any(|e| matches!(
        e,
        OutboundEvent::MessagesRead { user_id, .. } if *user_id == app.bob
    )));
}

#[tokio::test]
async fn test_online_recipient_gets_message_and_unread_count() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (_bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.direct.id,
                text: Some("hello bob".into()),
                image: None,
            },
        )
        .await;

    let bob_events = drain(&mut bob_rx);
    let view = bob_events
        .iter()
        .find_map(|e| match e {
            OutboundEvent::NewMessage { message } => Some(message),
            _ => None,
        })
        .expect("bob receives the message");
    assert_eq!(view.sender_name, "alice");
    assert_eq!(view.message.status, MessageStatus::Delivered);

    assert!(bob_events.iter().any(|e| matches!(
        e,
        OutboundEvent::UnreadCountUpdate { unread_count: 1, conversation_id }
            if *conversation_id == app.direct.id
    )));
}

#[tokio::test]
async fn test_non_participant_send_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let (carol_conn, mut carol_rx) = app.connect(app.carol).await;
    let (_bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut carol_rx);
    drain(&mut bob_rx);

    // Carol is not in the direct conversation between alice and bob.
    app.engine
        .handle_event(
            &carol_conn,
            InboundEvent::SendMessage {
                sender_id: app.carol,
                conversation_id: app.direct.id,
                text: Some("let me in".into()),
                image: None,
            },
        )
        .await;

    let carol_events = drain(&mut carol_rx);
    assert!(carol_events.iter().any(|e| matches!(
        e,
        OutboundEvent::Error { code, .. } if code == "AUTHORIZATION"
    )));

    // Nothing persisted, nothing broadcast.
    let stored = app
        .messages
        .find_by_conversation(&app.direct.id)
        .await
        .unwrap();
    assert!(stored.is_empty());
    assert!(drain(&mut bob_rx).is_empty());
}

#[tokio::test]
async fn test_empty_message_body_is_rejected() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    drain(&mut alice_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.direct.id,
                text: Some("   ".into()),
                image: None,
            },
        )
        .await;

    let events = drain(&mut alice_rx);
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::Error { code, .. } if code == "VALIDATION"
    )));
}

#[tokio::test]
async fn test_typing_reaches_room_but_not_sender() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (_bob_conn, mut bob_rx) = app.connect(app.bob).await;
    let (_carol_conn, mut carol_rx) = app.connect(app.carol).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);
    drain(&mut carol_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::StartTyping {
                conversation_id: app.group.id,
            },
        )
        .await;

    assert!(drain(&mut bob_rx)
        .iter()
        .any(|e| matches!(e, OutboundEvent::Typing { .. })));
    assert!(drain(&mut carol_rx)
        .iter()
        .any(|e| matches!(e, OutboundEvent::Typing { .. })));
    assert!(drain(&mut alice_rx).is_empty());

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::StopTyping {
                conversation_id: app.group.id,
            },
        )
        .await;

    assert!(drain(&mut bob_rx)
        .iter()
        .any(|e| matches!(e, OutboundEvent::StopTyping { .. })));
}

#[tokio::test]
async fn test_messages_keep_persistence_order() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    drain(&mut alice_rx);

    for body in ["first", "second", "third"] {
        app.engine
            .handle_event(
                &alice_conn,
                InboundEvent::SendMessage {
                    sender_id: app.alice,
                    conversation_id: app.direct.id,
                    text: Some(body.into()),
                    image: None,
                },
            )
            .await;
    }

    let stored = app
        .messages
        .find_by_conversation(&app.direct.id)
        .await
        .unwrap();
    let bodies: Vec<_> = stored.iter().filter_map(|m| m.text.as_deref()).collect();
    assert_eq!(bodies, vec!["first", "second", "third"]);
}
