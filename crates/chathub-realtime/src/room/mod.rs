//! Room membership: which connections receive a conversation's broadcasts.

pub mod registry;
pub mod subscription;

pub use registry::RoomRegistry;
