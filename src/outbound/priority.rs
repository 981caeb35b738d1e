//! Two-level send ordering.
//!
//! Protocol traffic always precedes application traffic; numeric priority
//! only breaks ties within a category. This keeps a flood of application
//! messages from starving control messages.

use crate::message::MessageType;

/// Category used as the primary send-ordering key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PriorityCategory {
    /// Message types below [`PROTOCOL_TYPE_LIMIT`](crate::message::PROTOCOL_TYPE_LIMIT).
    Protocol,
    /// Application-defined message types.
    Custom,
}

impl PriorityCategory {
    /// Classify a message type.
    #[must_use]
    pub const fn of(message_type: MessageType) -> Self {
        if message_type.is_protocol() {
            Self::Protocol
        } else {
            Self::Custom
        }
    }
}

/// Sort key for outbound messages; smaller keys are sent first.
///
/// # Examples
///
/// ```
/// use bitframe::outbound::{PriorityCategory, SendKey};
/// let control = SendKey::new(PriorityCategory::Protocol, 255);
/// let urgent_app = SendKey::new(PriorityCategory::Custom, 0);
/// assert!(control < urgent_app);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SendKey {
    category: PriorityCategory,
    priority: u8,
}

impl SendKey {
    /// Build a key from its parts.
    #[must_use]
    pub const fn new(category: PriorityCategory, priority: u8) -> Self { Self { category, priority } }

    /// Primary ordering component.
    #[must_use]
    pub const fn category(self) -> PriorityCategory { self.category }

    /// Secondary ordering component.
    #[must_use]
    pub const fn priority(self) -> u8 { self.priority }
}
