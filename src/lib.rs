#![doc(html_root_url = "https://docs.rs/bitframe/latest")]
//! Bit-exact message framing for datagram transports.
//!
//! The crate provides a bit-addressable buffer, a compact message wire
//! codec built on it, and the fragmentation and reassembly needed to move
//! messages larger than one datagram. It performs no I/O: a transport hands
//! bits in and takes bits out.
//!
//! Every structure here is single-threaded. A connection layer owns one of
//! each per connection and must not share them across threads.

pub mod bits;
pub mod fragment;
pub mod message;
pub mod outbound;

mod test_helpers;

pub use bits::{Alignment, BitBuffer, BitError, BitReader};
pub use fragment::{
    FragmentReassemblyBuffer,
    FragmentStatus,
    FragmentationConfig,
    ReassemblyError,
};
pub use message::{
    ChannelId,
    DecodeError,
    EncodeError,
    FragmentIndex,
    FragmentInfo,
    Message,
    MessageType,
    SequenceId,
};
pub use outbound::{Delivery, FragmentationError, OutboundMessage, OutboundQueue, TransferMode};
