//! Identifier newtypes carried in message headers.

use std::num::TryFromIntError;

use derive_more::{Display, From, Into};

/// Message types below this value belong to the protocol itself and are
/// always sent ahead of application messages.
pub const PROTOCOL_TYPE_LIMIT: u8 = 32;

/// Application- or protocol-defined message kind.
///
/// # Examples
///
/// ```
/// use bitframe::message::MessageType;
/// assert!(MessageType::new(3).is_protocol());
/// assert!(!MessageType::new(200).is_protocol());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct MessageType(u8);

impl MessageType {
    /// Construct a message type.
    #[must_use]
    pub const fn new(value: u8) -> Self { Self(value) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u8 { self.0 }

    /// Whether this type is reserved for protocol control traffic.
    #[must_use]
    pub const fn is_protocol(self) -> bool { self.0 < PROTOCOL_TYPE_LIMIT }
}

/// Identifier shared by every fragment and retransmission of one message.
///
/// Allocation is the connection manager's job; this crate only carries it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct SequenceId(u32);

impl SequenceId {
    /// Construct a sequence identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }
}

/// Optional grouping key for ordered delivery; zero means unchanneled.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into,
)]
#[display("{_0}")]
pub struct ChannelId(u16);

impl ChannelId {
    /// Channel id carried by messages that do not belong to a channel.
    pub const UNCHANNELED: Self = Self(0);

    /// Construct a channel identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Whether the id names a real channel.
    #[must_use]
    pub const fn is_channeled(self) -> bool { self.0 != 0 }
}

/// Zero-based position of a fragment within its message.
///
/// # Examples
///
/// ```
/// use bitframe::message::FragmentIndex;
/// let index = FragmentIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert_eq!(FragmentIndex::new(u16::MAX).checked_increment(), None);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Into)]
#[display("{_0}")]
pub struct FragmentIndex(u16);

impl FragmentIndex {
    /// Construct an index.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Return the first valid fragment index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// Increment the index, returning `None` on overflow.
    #[must_use]
    pub fn checked_increment(self) -> Option<Self> { self.0.checked_add(1).map(Self) }
}

impl TryFrom<usize> for FragmentIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u16::try_from(value).map(Self) }
}
