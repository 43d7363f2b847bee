//! # chathub-realtime
//!
//! Real-time coordination engine for ChatHub. Provides:
//!
//! - Connection lifecycle with identity authentication
//! - Presence registry (user ↔ live connections, online-set broadcasts)
//! - Room membership derived from conversation participant lists
//! - Message delivery pipeline with per-conversation ordering
//! - Read-receipt aggregation with group seen-by-all promotion
//! - Ephemeral typing notifications

pub mod connection;
pub mod delivery;
pub mod event;
pub mod presence;
pub mod room;
pub mod server;

pub use connection::gateway::ConnectionGateway;
pub use connection::pool::ConnectionPool;
pub use event::envelope::{Envelope, Target};
pub use event::types::{InboundEvent, OutboundEvent};
pub use presence::registry::PresenceRegistry;
pub use room::registry::RoomRegistry;
pub use server::ChatEngine;
