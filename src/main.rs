//! ChatHub Server — real-time chat presence and delivery coordinator
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, EnvFilter};

use chathub_core::config::AppConfig;
use chathub_entity::conversation::Conversation;
use chathub_entity::gateway::ConversationStore;
use chathub_entity::user::User;
use chathub_realtime::ChatEngine;
use chathub_store::identity::StaticIdentityProvider;
use chathub_store::memory::{MemoryConversationStore, MemoryMessageStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("CHATHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {e:#}");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting ChatHub v{}", env!("CARGO_PKG_VERSION"));

    // ── Stores and identity ──────────────────────────────────────
    let conversations = Arc::new(MemoryConversationStore::new());
    let messages = Arc::new(MemoryMessageStore::new());
    let identities = Arc::new(StaticIdentityProvider::new());

    seed_demo_directory(&identities, conversations.as_ref()).await?;

    // ── Realtime engine ──────────────────────────────────────────
    let engine = Arc::new(ChatEngine::new(
        config.realtime.clone(),
        identities,
        conversations,
        messages,
    ));
    tracing::info!("Realtime engine initialized");

    // ── HTTP server ──────────────────────────────────────────────
    let state = chathub_api::AppState::new(Arc::new(config.clone()), engine);
    let app = chathub_api::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!("ChatHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
        })
        .await
        .context("Server error")?;

    tracing::info!("ChatHub server shut down gracefully");
    Ok(())
}

/// Seed the in-memory directory with demo users and conversations.
///
/// The in-memory stores start empty on every boot; without a user
/// directory no connection can authenticate. Tokens are logged so demo
/// clients can connect.
async fn seed_demo_directory(
    identities: &StaticIdentityProvider,
    conversations: &MemoryConversationStore,
) -> anyhow::Result<()> {
    let alice = User::new("alice");
    let bob = User::new("bob");
    let carol = User::new("carol");

    tracing::info!(user = "alice", token = %alice.id, "Seeded demo user");
    tracing::info!(user = "bob", token = %bob.id, "Seeded demo user");
    tracing::info!(user = "carol", token = %carol.id, "Seeded demo user");

    let direct = Conversation::direct(alice.id, bob.id)?;
    let group = Conversation::group("demo room", alice.id, [bob.id, carol.id])?;
    tracing::info!(conversation_id = %direct.id, "Seeded direct conversation");
    tracing::info!(conversation_id = %group.id, "Seeded group conversation");

    conversations.create(&direct).await?;
    conversations.create(&group).await?;

    identities.insert(alice);
    identities.insert(bob);
    identities.insert(carol);
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
