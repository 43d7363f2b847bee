//! Shared test helpers for integration tests.

use std::sync::Arc;

use tokio::sync::mpsc;

use chathub_core::config::realtime::RealtimeConfig;
use chathub_core::types::id::UserId;
use chathub_entity::conversation::Conversation;
use chathub_entity::gateway::ConversationStore;
use chathub_entity::user::User;
use chathub_realtime::connection::handle::ConnectionHandle;
use chathub_realtime::{ChatEngine, OutboundEvent};
use chathub_store::identity::StaticIdentityProvider;
use chathub_store::memory::{MemoryConversationStore, MemoryMessageStore};

/// Test application context: a full engine over in-memory stores with
/// three seeded users, a direct conversation, and a group conversation.
pub struct TestApp {
    pub engine: Arc<ChatEngine>,
    pub conversations: Arc<MemoryConversationStore>,
    pub messages: Arc<MemoryMessageStore>,
    pub alice: UserId,
    pub bob: UserId,
    pub carol: UserId,
    /// Direct conversation between alice and bob.
    pub direct: Conversation,
    /// Group conversation with alice (admin), bob, and carol.
    pub group: Conversation,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        let conversations = Arc::new(MemoryConversationStore::new());
        let messages = Arc::new(MemoryMessageStore::new());
        let identities = Arc::new(StaticIdentityProvider::new());

        let alice_user = User::new("alice");
        let bob_user = User::new("bob");
        let carol_user = User::new("carol");
        let alice = alice_user.id;
        let bob = bob_user.id;
        let carol = carol_user.id;
        identities.insert(alice_user);
        identities.insert(bob_user);
        identities.insert(carol_user);

        let direct = conversations
            .create(&Conversation::direct(alice, bob).expect("direct conversation"))
            .await
            .expect("create direct conversation");
        let group = conversations
            .create(&Conversation::group("trio", alice, [bob, carol]).expect("group conversation"))
            .await
            .expect("create group conversation");

        let engine = Arc::new(ChatEngine::new(
            RealtimeConfig::default(),
            identities,
            conversations.clone(),
            messages.clone(),
        ));

        Self {
            engine,
            conversations,
            messages,
            alice,
            bob,
            carol,
            direct,
            group,
        }
    }

    /// Connect a user and return the live connection with its event queue.
    pub async fn connect(
        &self,
        user_id: UserId,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundEvent>) {
        self.engine
            .connect(&user_id.to_string())
            .await
            .expect("connection setup")
    }
}

/// Drain every event currently queued on a connection.
pub fn drain(rx: &mut mpsc::Receiver<OutboundEvent>) -> Vec<OutboundEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
