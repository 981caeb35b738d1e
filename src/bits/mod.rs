//! Bit-addressable buffers used by the message wire codec.
//!
//! [`BitBuffer`] owns the bytes and a write cursor; [`BitReader`] borrows a
//! buffer and owns a read position. Keeping the two apart lets any number of
//! readers make progress over a buffer that stays immutable while read.
//!
//! Neither type locks. A buffer belongs to one connection and must only be
//! touched by the thread driving that connection.

pub mod buffer;
pub mod error;
pub mod quantize;
pub mod reader;

pub use buffer::{Alignment, BitBuffer, MIN_RESERVE_BYTES};
pub use error::BitError;
pub use quantize::{QuantizedRange, bits_required};
pub use reader::BitReader;
