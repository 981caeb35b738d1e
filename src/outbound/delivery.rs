//! Delivery settings attached to outbound messages.

use std::{num::NonZeroU32, time::Duration};

use derive_more::{Display, From, Into};

/// Priority given to messages that do not ask for one.
pub const DEFAULT_PRIORITY: u8 = 128;

/// Lifetime given to messages that do not ask for one.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(30);

/// Ordering guarantee requested from the connection layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransferMode {
    /// Deliver in whatever order messages arrive.
    #[default]
    Unordered,
    /// Drop messages older than the newest one delivered.
    Sequenced,
    /// Deliver strictly in send order.
    Ordered,
}

/// Token reported back to the application once delivery is confirmed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, From, Into)]
#[display("{_0}")]
pub struct ReceiptId(NonZeroU32);

impl ReceiptId {
    /// Construct a receipt id; zero means "no receipt" and yields `None`.
    #[must_use]
    pub const fn new(value: u32) -> Option<Self> {
        match NonZeroU32::new(value) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0.get() }
}

/// Quality-of-service settings for one outbound message.
///
/// A zero `lifetime` lets the message expire on the very next check; use a
/// large lifetime for messages that must never expire.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use bitframe::outbound::{Delivery, TransferMode};
/// let delivery = Delivery::default()
///     .reliable()
///     .with_transfer_mode(TransferMode::Ordered)
///     .with_priority(4)
///     .with_lifetime(Duration::from_millis(250));
/// assert!(delivery.reliable);
/// assert_eq!(delivery.priority, 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Delivery {
    /// Whether the transport must retransmit until acknowledged.
    pub reliable: bool,
    /// Ordering guarantee.
    pub transfer_mode: TransferMode,
    /// Receipt reported on delivery, if any.
    pub receipt_id: Option<ReceiptId>,
    /// Send priority; lower values are sent first.
    pub priority: u8,
    /// Time after creation at which the message is abandoned.
    pub lifetime: Duration,
}

impl Default for Delivery {
    fn default() -> Self {
        Self {
            reliable: false,
            transfer_mode: TransferMode::Unordered,
            receipt_id: None,
            priority: DEFAULT_PRIORITY,
            lifetime: DEFAULT_LIFETIME,
        }
    }
}

impl Delivery {
    /// Request reliable delivery.
    #[must_use]
    pub const fn reliable(mut self) -> Self {
        self.reliable = true;
        self
    }

    /// Set the ordering guarantee.
    #[must_use]
    pub const fn with_transfer_mode(mut self, transfer_mode: TransferMode) -> Self {
        self.transfer_mode = transfer_mode;
        self
    }

    /// Ask for a delivery receipt.
    #[must_use]
    pub const fn with_receipt(mut self, receipt_id: ReceiptId) -> Self {
        self.receipt_id = Some(receipt_id);
        self
    }

    /// Set the send priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the lifetime.
    #[must_use]
    pub const fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }
}
