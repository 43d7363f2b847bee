//! Message delivery: send pipeline, read receipts, typing notifications.

pub mod pipeline;
pub mod receipts;
pub mod typing;

pub use pipeline::DeliveryPipeline;
pub use receipts::ReadReceipts;
pub use typing::TypingNotifier;
