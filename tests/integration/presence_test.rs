//! Integration tests for presence and connection lifecycle.

use chathub_entity::gateway::ConversationStore;
use chathub_realtime::OutboundEvent;

use super::helpers::{drain, TestApp};

#[tokio::test]
async fn test_online_set_follows_connections() {
    let app = TestApp::new().await;

    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    drain(&mut alice_rx);

    let (_bob_conn, mut bob_rx) = app.connect(app.bob).await;

    // Alice is told bob came online.
    let alice_events = drain(&mut alice_rx);
    let online = alice_events
        .iter()
        .rev()
        .find_map(|e| match e {
            OutboundEvent::OnlineUsers { users } => Some(users.clone()),
            _ => None,
        })
        .expect("online snapshot after bob connects");
    assert_eq!(online.len(), 2);
    assert!(online.contains(&app.alice) && online.contains(&app.bob));

    // Alice disconnects; bob's snapshot shrinks to just him.
    app.engine.disconnect(&alice_conn.id);
    let bob_events = drain(&mut bob_rx);
    let online = bob_events
        .iter()
        .rev()
        .find_map(|e| match e {
            OutboundEvent::OnlineUsers { users } => Some(users.clone()),
            _ => None,
        })
        .expect("online snapshot after alice disconnects");
    assert_eq!(online, vec![app.bob]);
}

#[tokio::test]
async fn test_user_stays_online_with_remaining_connection() {
    let app = TestApp::new().await;

    let (first, _rx1) = app.connect(app.alice).await;
    let (_second, _rx2) = app.connect(app.alice).await;

    app.engine.disconnect(&first.id);
    assert!(app.engine.presence().is_online(&app.alice));
    assert_eq!(app.engine.pool().connection_count(), 1);
}

#[tokio::test]
async fn test_unknown_token_is_rejected() {
    let app = TestApp::new().await;

    for token in ["", "undefined", "not-a-uuid"] {
        assert!(app.engine.connect(token).await.is_err(), "token: {token:?}");
    }
    assert_eq!(app.engine.pool().connection_count(), 0);
    assert_eq!(app.engine.presence().online_count(), 0);
}

#[tokio::test]
async fn test_setup_joins_all_conversation_rooms() {
    let app = TestApp::new().await;
    let (_alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (bob_conn, mut bob_rx) = app.connect(app.bob).await;
    drain(&mut alice_rx);
    drain(&mut bob_rx);

    // Bob participates in both the direct and the group conversation, so a
    // group broadcast from alice must reach him.
    app.engine
        .handle_event(
            &bob_conn,
            chathub_realtime::InboundEvent::SendMessage {
                sender_id: app.bob,
                conversation_id: app.group.id,
                text: Some("hi all".into()),
                image: None,
            },
        )
        .await;

    assert!(drain(&mut alice_rx)
        .iter()
        .any(|e| matches!(e, OutboundEvent::NewMessage { .. })));
}

#[tokio::test]
async fn test_refresh_rooms_picks_up_new_conversations() {
    let app = TestApp::new().await;
    let (alice_conn, mut alice_rx) = app.connect(app.alice).await;
    let (carol_conn, mut carol_rx) = app.connect(app.carol).await;
    drain(&mut alice_rx);
    drain(&mut carol_rx);

    // A conversation created after both connected: neither room is joined
    // until membership is re-derived.
    let convo = app
        .conversations
        .create(
            &chathub_entity::Conversation::direct(app.alice, app.carol)
                .expect("direct conversation"),
        )
        .await
        .expect("create conversation");

    app.engine.refresh_rooms(&alice_conn.id).await.unwrap();
    app.engine.refresh_rooms(&carol_conn.id).await.unwrap();
    // Re-deriving again is harmless.
    app.engine.refresh_rooms(&carol_conn.id).await.unwrap();

    app.engine
        .handle_event(
            &alice_conn,
            chathub_realtime::InboundEvent::SendMessage {
                sender_id: app.alice,
                conversation_id: convo.id,
                text: Some("new room".into()),
                image: None,
            },
        )
        .await;

    assert!(drain(&mut carol_rx)
        .iter()
        .any(|e| matches!(e, OutboundEvent::NewMessage { .. })));
}

#[tokio::test]
async fn test_concurrent_connect_disconnect_leaves_no_leaks() {
    let app = TestApp::new().await;
    let engine = app.engine.clone();

    let mut tasks = Vec::new();
    for _ in 0..4 {
        // Reconnect churn across several tasks per user.
        for user in [app.alice, app.bob, app.carol] {
            let engine = engine.clone();
            tasks.push(tokio::spawn(async move {
                let (handle, _rx) = engine.connect(&user.to_string()).await.unwrap();
                tokio::task::yield_now().await;
                engine.disconnect(&handle.id);
            }));
        }
    }
    for task in tasks {
        task.await.expect("task panicked");
    }

    assert_eq!(app.engine.pool().connection_count(), 0);
    assert_eq!(app.engine.presence().online_count(), 0);
}
