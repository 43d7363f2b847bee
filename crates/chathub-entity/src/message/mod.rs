//! Message entity and delivery status.

pub mod model;
pub mod status;

pub use model::Message;
pub use status::MessageStatus;
