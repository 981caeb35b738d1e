//! Messages and their bit-exact wire encoding.
//!
//! A [`Message`] pairs a handful of header fields with a
//! [`BitBuffer`](crate::bits::BitBuffer) payload. The [`codec`] module fixes
//! the on-wire layout so peers agree byte-for-byte without negotiating a
//! schema.

pub mod codec;
pub mod error;
pub mod fragment_info;
pub mod ids;
pub mod types;

pub use codec::{
    CHANNEL_ID_BITS,
    FRAGMENT_INDEX_BITS,
    MAX_FRAGMENT_HEADER_BITS,
    MAX_HEADER_BITS,
    MAX_PAYLOAD_BITS,
    MESSAGE_TYPE_RANGE,
    MIN_HEADER_BITS,
    PAYLOAD_BITS_RANGE,
    SEQUENCE_ID_BITS,
    TIMESTAMP_RANGE,
};
pub use error::{DecodeError, EncodeError};
pub use fragment_info::FragmentInfo;
pub use ids::{ChannelId, FragmentIndex, MessageType, PROTOCOL_TYPE_LIMIT, SequenceId};
pub use types::Message;
