//! Outbound messages: a [`Message`] plus delivery bookkeeping.
//!
//! [`OutboundMessage::take_fragment`] slices an oversized payload from the
//! front. The source keeps a cursor into its own payload instead of copying
//! the remainder, so each slice costs only the bits it carries.

use std::{
    cmp::Ordering,
    num::NonZeroUsize,
    time::{Duration, Instant},
};

use tracing::debug;

use super::{Delivery, FragmentationError, PriorityCategory, SendKey};
use crate::{
    bits::BitReader,
    message::{FragmentIndex, FragmentInfo, Message},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SliceCursor {
    taken_bits: usize,
    next_index: FragmentIndex,
}

impl SliceCursor {
    const START: Self = Self {
        taken_bits: 0,
        next_index: FragmentIndex::zero(),
    };
}

/// A message queued for sending.
///
/// # Examples
///
/// ```
/// use std::{num::NonZeroUsize, time::Instant};
///
/// use bitframe::{
///     bits::BitBuffer,
///     message::{Message, MessageType, SequenceId},
///     outbound::{Delivery, OutboundMessage},
/// };
/// let mut payload = BitBuffer::new();
/// payload.write_bits(&[0xAB; 4], 32);
/// let message = Message::new(MessageType::new(40), SequenceId::new(1), payload);
///
/// let mut outbound = OutboundMessage::new_at(message, Delivery::default(), Instant::now());
/// let size = NonZeroUsize::new(20).expect("non-zero");
/// let first = outbound.take_fragment(size).expect("bits remain");
/// let second = outbound.take_fragment(size).expect("bits remain");
/// assert_eq!(first.message().payload_bits(), 20);
/// assert_eq!(second.message().payload_bits(), 12);
/// assert!(second.message().fragment().expect("fragment").is_final());
/// assert!(outbound.delivery().reliable);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundMessage {
    message: Message,
    delivery: Delivery,
    created_at: Instant,
    slicing: Option<SliceCursor>,
}

impl OutboundMessage {
    /// Queue `message` now.
    #[must_use]
    pub fn new(message: Message, delivery: Delivery) -> Self {
        Self::new_at(message, delivery, Instant::now())
    }

    /// Queue `message` with an explicit creation time.
    ///
    /// An explicit clock reading keeps expiry deterministic in tests and lets
    /// callers share one timestamp across a batch.
    #[must_use]
    pub fn new_at(message: Message, delivery: Delivery, created_at: Instant) -> Self {
        Self {
            message,
            delivery,
            created_at,
            slicing: None,
        }
    }

    /// Borrow the wrapped message.
    #[must_use]
    pub const fn message(&self) -> &Message { &self.message }

    /// Consume the wrapper, returning the message.
    #[must_use]
    pub fn into_message(self) -> Message { self.message }

    /// Delivery settings.
    #[must_use]
    pub const fn delivery(&self) -> &Delivery { &self.delivery }

    /// When the message was queued.
    #[must_use]
    pub const fn created_at(&self) -> Instant { self.created_at }

    /// Key used to order this message in a send queue.
    #[must_use]
    pub const fn send_key(&self) -> SendKey {
        SendKey::new(
            PriorityCategory::of(self.message.message_type()),
            self.delivery.priority,
        )
    }

    /// Compare send order; [`Ordering::Less`] means `self` goes first.
    #[must_use]
    pub fn send_order(&self, other: &Self) -> Ordering { self.send_key().cmp(&other.send_key()) }

    /// Whether more than `lifetime` has elapsed since creation.
    #[must_use]
    pub fn has_expired(&self, now: Instant) -> bool { self.age(now) > self.delivery.lifetime }

    /// Time elapsed since creation, saturating at zero.
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration { now.saturating_duration_since(self.created_at) }

    /// Whether [`OutboundMessage::take_fragment`] has been called
    /// successfully.
    #[must_use]
    pub const fn is_fragmenting(&self) -> bool { self.slicing.is_some() }

    /// Payload bits not yet handed out as fragments.
    #[must_use]
    pub fn remaining_fragment_bits(&self) -> usize {
        let taken = self.slicing.map_or(0, |cursor| cursor.taken_bits);
        self.message.payload_bits() - taken
    }

    /// Slice up to `size` bits from the front of the unsliced payload.
    ///
    /// The first successful call switches the message into fragment mode and
    /// forces reliable delivery, since losing one fragment loses the whole
    /// message. The returned fragment shares this message's header and
    /// delivery settings; the slice that exhausts the payload is flagged as
    /// final.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError::PayloadExhausted`] once every bit has
    /// been sliced (immediately for an empty payload) and
    /// [`FragmentationError::IndexOverflow`] when another fragment index
    /// would not fit the wire field. The message is unchanged on error.
    pub fn take_fragment(&mut self, size: NonZeroUsize) -> Result<Self, FragmentationError> {
        let cursor = self.slicing.unwrap_or(SliceCursor::START);
        let remaining = self.remaining_fragment_bits();
        if remaining == 0 {
            return Err(FragmentationError::PayloadExhausted {
                sequence_id: self.message.sequence_id(),
            });
        }

        let count = size.get().min(remaining);
        let is_final = count == remaining;
        let next_index = if is_final {
            cursor.next_index
        } else {
            cursor
                .next_index
                .checked_increment()
                .ok_or(FragmentationError::IndexOverflow {
                    last: cursor.next_index,
                })?
        };

        let mut source = BitReader::at(self.message.payload(), cursor.taken_bits)?;
        let mut fragment = self
            .message
            .header_only()
            .with_fragment(FragmentInfo::new(cursor.next_index, is_final));
        let payload = fragment.payload_mut();
        payload.reserve_bits(count);
        payload.append_from(&mut source, count);

        self.slicing = Some(SliceCursor {
            taken_bits: source.position(),
            next_index,
        });
        if !self.delivery.reliable {
            debug!(
                sequence_id = %self.message.sequence_id(),
                "fragmenting forces reliable delivery"
            );
            self.delivery.reliable = true;
        }
        debug!(
            sequence_id = %self.message.sequence_id(),
            index = %cursor.next_index,
            bits = count,
            is_final,
            "took fragment"
        );

        Ok(Self {
            message: fragment,
            delivery: self.delivery,
            created_at: self.created_at,
            slicing: None,
        })
    }

    /// Slice the remaining payload into fragments of at most `size` bits.
    ///
    /// # Errors
    ///
    /// Returns [`FragmentationError`] under the same conditions as
    /// [`OutboundMessage::take_fragment`].
    pub fn into_fragments(mut self, size: NonZeroUsize) -> Result<Vec<Self>, FragmentationError> {
        let mut fragments = Vec::with_capacity(self.remaining_fragment_bits().div_ceil(size.get()));
        loop {
            let fragment = self.take_fragment(size)?;
            let done = fragment
                .message
                .fragment()
                .is_some_and(|info| info.is_final());
            fragments.push(fragment);
            if done {
                return Ok(fragments);
            }
        }
    }
}
