//! Message delivery status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Delivery status of a message.
///
/// The lifecycle is `sent → delivered → seen` and is monotonic: a message
/// never moves back to an earlier status. The variants are ordered so that
/// `promote` can be expressed as a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Persisted, but no other participant was online at send time.
    Sent,
    /// At least one other participant has received the message.
    Delivered,
    /// Every current participant has read the message.
    Seen,
}

impl MessageStatus {
    /// Advance to the given status, never regressing.
    #[must_use]
    pub fn promote(self, to: MessageStatus) -> MessageStatus {
        self.max(to)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Seen => "seen",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = chathub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "seen" => Ok(Self::Seen),
            _ => Err(chathub_core::AppError::validation(format!(
                "Invalid message status: '{s}'. Expected one of: sent, delivered, seen"
            ))),
        }
    }
}
