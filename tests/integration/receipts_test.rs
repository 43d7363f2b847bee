//! Integration tests for read receipts and seen-by-all aggregation.

use chathub_entity::gateway::MessageStore;
use chathub_entity::message::MessageStatus;
use chathub_realtime::{InboundEvent, OutboundEvent};

use super::helpers::{drain, TestApp};

#[tokio::test]
async fn test_group_seen_only_after_every_member_reads() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    let (carol_conn, mut carol_rx) = app.connect(app.carol).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);
    drain(&mut carol_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.group.id,
                text: Some("standup in five".into()),
                image: None,
            },
        )
        .await;

    let message_id = app
        .messages
        .find_by_conversation(&app.group.id)
        .await
        .unwrap()[0]
        .id;

    // One reader is not enough in a three-person group.
    app.engine
        .handle_event(
            &bob_conn,
            InboundEvent::MarkAsRead {
                conversation_id: app.group.id,
                user_id: app.bob,
            },
        )
        .await;
    let stored = app.messages.find_by_id(&message_id).await.unwrap().unwrap();
    assert_ne!(stored.status, MessageStatus::Seen);

    // The last reader tips it over.
    app.engine
        .handle_event(
            &carol_conn,
            InboundEvent::MarkAsRead {
                conversation_id: app.group.id,
                user_id: app.carol,
            },
        )
        .await;
    let stored = app.messages.find_by_id(&message_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MessageStatus::Seen);
}

#[tokio::test]
async fn test_mark_read_zeroes_unread_and_is_idempotent() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    for body in ["one", "two"] {
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
    drain(&mut bob_rx);

    for _ in 0..2 {
        app.engine
            .handle_event(
                &bob_conn,
                InboundEvent::MarkAsRead {
                    conversation_id: app.direct.id,
                    user_id: app.bob,
                },
            )
            .await;

        let events = drain(&mut bob_rx);
        assert!(events.iter().any(|e| matches!(
            e,
            OutboundEvent::UnreadCountUpdate { unread_count: 0, .. }
        )));
    }

    assert_eq!(
        app.messages
            .count_unread(&app.direct.id, &app.bob)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
async fn test_delivery_ack_never_demotes_seen() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.direct.id,
                text: Some("ping".into()),
                image: None,
            },
        )
        .await;
    let message_id = app
        .messages
        .find_by_conversation(&app.direct.id)
        .await
        .unwrap()[0]
        .id;

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

    // A late delivery acknowledgment must not roll the status back.
    app.engine
        .handle_event(&bob_conn, InboundEvent::MessageDelivered { message_id })
        .await;
    let stored = app.messages.find_by_id(&message_id).await.unwrap().unwrap();
    assert_eq!(stored.status, MessageStatus::Seen);
}

#[tokio::test]
async fn test_spoofed_reader_is_rejected() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    app.engine
        .handle_event(
            &alice_conn,
            InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: app.direct.id,
                text: Some("secret".into()),
                image: None,
            },
        )
        .await;
    drain(&mut bob_rx);

    // Bob cannot mark the conversation read on alice's behalf.
    app.engine
        .handle_event(
            &bob_conn,
            InboundEvent::MarkAsRead {
                conversation_id: app.direct.id,
                user_id: app.alice,
            },
        )
        .await;

    let events = drain(&mut bob_rx);
    assert!(events.iter().any(|e| matches!(
        e,
        OutboundEvent::Error { code, .. } if code == "AUTHORIZATION"
    )));
}
