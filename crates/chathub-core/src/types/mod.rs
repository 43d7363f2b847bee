//! Shared type definitions.

pub mod id;
