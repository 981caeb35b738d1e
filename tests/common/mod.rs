//! Shared utilities for integration tests.
//!
//! Provides payload builders, a fragmenting helper, and re-exports the
//! crate's log-capture fixture. These helpers reduce duplication across test
//! modules.

// Items in this shared module may not be used by all test binaries that import it.
#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::num::NonZeroUsize;

use bitframe::{
    Alignment,
    BitBuffer,
    Delivery,
    Message,
    MessageType,
    OutboundMessage,
    SequenceId,
};

#[path = "../../src/test_helpers.rs"]
mod test_helpers;

pub use test_helpers::{LoggerHandle, logger};

/// Result type used by fallible integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Payload of `bits` bits following a fixed, non-periodic pattern.
pub fn patterned_payload(bits: usize, alignment: Alignment) -> BitBuffer {
    let mut payload = BitBuffer::with_capacity_bits(bits, alignment);
    for index in 0..bits {
        payload.write_bit(index % 3 == 0 || index % 7 == 0 || index % 13 == 5);
    }
    payload
}

/// Custom-category message with a patterned payload.
pub fn message(sequence: u32, bits: usize) -> Message {
    Message::new(
        MessageType::new(64),
        SequenceId::new(sequence),
        patterned_payload(bits, Alignment::Bit),
    )
}

/// Slice `message` into fragments of at most `size` bits.
pub fn fragments_of(message: &Message, size: usize) -> TestResult<Vec<Message>> {
    let size = NonZeroUsize::new(size).ok_or("fragment size must be non-zero")?;
    let fragments = OutboundMessage::new(message.clone(), Delivery::default())
        .into_fragments(size)?
        .into_iter()
        .map(OutboundMessage::into_message)
        .collect();
    Ok(fragments)
}
