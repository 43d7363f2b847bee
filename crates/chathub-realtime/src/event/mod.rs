//! Protocol event definitions and targeted envelopes.

pub mod envelope;
pub mod types;
