//! # chathub-api
//!
//! HTTP and WebSocket transport layer for ChatHub built on Axum.
//!
//! Exposes the `/ws` upgrade endpoint that feeds the realtime engine,
//! plus small REST surfaces for health and presence snapshots.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
