//! The [`Message`] value carried by the wire codec.

use super::{ChannelId, FragmentInfo, MessageType, SequenceId};
use crate::bits::BitBuffer;

/// One logical message: header fields plus a bit payload.
///
/// # Examples
///
/// ```
/// use bitframe::{
///     bits::BitBuffer,
///     message::{ChannelId, Message, MessageType, SequenceId},
/// };
/// let mut payload = BitBuffer::new();
/// payload.write_uint(0xBEEF, 16);
///
/// let message = Message::new(MessageType::new(40), SequenceId::new(7), payload)
///     .with_channel(ChannelId::new(2))
///     .with_timestamp(1_000);
/// assert_eq!(message.payload_bits(), 16);
/// assert_eq!(message.timestamp(), Some(1_000));
/// assert!(!message.is_fragment());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    message_type: MessageType,
    sequence_id: SequenceId,
    channel_id: ChannelId,
    timestamp: Option<u32>,
    fragment: Option<FragmentInfo>,
    payload: BitBuffer,
}

impl Message {
    /// Create an unchanneled, untimestamped, unfragmented message.
    #[must_use]
    pub fn new(message_type: MessageType, sequence_id: SequenceId, payload: BitBuffer) -> Self {
        Self {
            message_type,
            sequence_id,
            channel_id: ChannelId::UNCHANNELED,
            timestamp: None,
            fragment: None,
            payload,
        }
    }

    /// Place the message on `channel_id`.
    #[must_use]
    pub fn with_channel(mut self, channel_id: ChannelId) -> Self {
        self.channel_id = channel_id;
        self
    }

    /// Attach a millisecond timestamp.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Mark the message as a fragment.
    #[must_use]
    pub fn with_fragment(mut self, fragment: FragmentInfo) -> Self {
        self.fragment = Some(fragment);
        self
    }

    /// Message kind.
    #[must_use]
    pub const fn message_type(&self) -> MessageType { self.message_type }

    /// Sequence id shared by all fragments of this message.
    #[must_use]
    pub const fn sequence_id(&self) -> SequenceId { self.sequence_id }

    /// Channel carrying the message.
    #[must_use]
    pub const fn channel_id(&self) -> ChannelId { self.channel_id }

    /// Millisecond timestamp, when one was attached.
    #[must_use]
    pub const fn timestamp(&self) -> Option<u32> { self.timestamp }

    /// Fragment metadata, when the message is a fragment.
    #[must_use]
    pub const fn fragment(&self) -> Option<FragmentInfo> { self.fragment }

    /// Whether the message is one slice of a larger message.
    #[must_use]
    pub const fn is_fragment(&self) -> bool { self.fragment.is_some() }

    /// Borrow the payload.
    #[must_use]
    pub const fn payload(&self) -> &BitBuffer { &self.payload }

    /// Mutably borrow the payload.
    pub fn payload_mut(&mut self) -> &mut BitBuffer { &mut self.payload }

    /// Consume the message, returning its payload.
    #[must_use]
    pub fn into_payload(self) -> BitBuffer { self.payload }

    /// Number of payload bits.
    #[must_use]
    pub const fn payload_bits(&self) -> usize { self.payload.len_bits() }

    /// Copy the header into a new message whose payload is empty and whose
    /// fragment metadata is cleared.
    #[must_use]
    pub fn header_only(&self) -> Self {
        Self {
            message_type: self.message_type,
            sequence_id: self.sequence_id,
            channel_id: self.channel_id,
            timestamp: self.timestamp,
            fragment: None,
            payload: BitBuffer::with_alignment(self.payload.alignment()),
        }
    }
}
