//! Outbound message handling.
//!
//! [`OutboundMessage`] attaches [`Delivery`] settings to a
//! [`Message`](crate::message::Message) and slices oversized payloads into
//! fragments. [`OutboundQueue`] orders pending messages by [`SendKey`].

pub mod delivery;
pub mod error;
pub mod message;
pub mod priority;
pub mod queue;

pub use delivery::{DEFAULT_LIFETIME, DEFAULT_PRIORITY, Delivery, ReceiptId, TransferMode};
pub use error::FragmentationError;
pub use message::OutboundMessage;
pub use priority::{PriorityCategory, SendKey};
pub use queue::OutboundQueue;
