//! Priority queue of outbound messages.
//!
//! Messages leave in [`SendKey`] order. Equal keys leave in insertion order,
//! so two messages with identical priority are never reordered relative to
//! each other.

use std::{cmp::Reverse, collections::BinaryHeap, time::Instant};

use tracing::warn;

use super::{OutboundMessage, SendKey};
use crate::message::SequenceId;

#[derive(Debug)]
struct QueuedMessage {
    key: SendKey,
    ticket: u64,
    message: OutboundMessage,
}

impl PartialEq for QueuedMessage {
    fn eq(&self, other: &Self) -> bool { self.key == other.key && self.ticket == other.ticket }
}

impl Eq for QueuedMessage {}

impl PartialOrd for QueuedMessage {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> { Some(self.cmp(other)) }
}

impl Ord for QueuedMessage {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.key, self.ticket).cmp(&(other.key, other.ticket))
    }
}

/// Outbound messages waiting for the transport.
///
/// # Examples
///
/// ```
/// use std::time::Instant;
///
/// use bitframe::{
///     bits::BitBuffer,
///     message::{Message, MessageType, SequenceId},
///     outbound::{Delivery, OutboundMessage, OutboundQueue},
/// };
/// let now = Instant::now();
/// let mut queue = OutboundQueue::new();
/// let app = Message::new(MessageType::new(90), SequenceId::new(1), BitBuffer::new());
/// let control = Message::new(MessageType::new(2), SequenceId::new(2), BitBuffer::new());
/// queue.push(OutboundMessage::new_at(app, Delivery::default().with_priority(0), now));
/// queue.push(OutboundMessage::new_at(control, Delivery::default(), now));
///
/// let first = queue.pop_at(now).expect("queued");
/// assert_eq!(first.message().sequence_id(), SequenceId::new(2));
/// ```
#[derive(Debug, Default)]
pub struct OutboundQueue {
    heap: BinaryHeap<Reverse<QueuedMessage>>,
    next_ticket: u64,
}

impl OutboundQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of queued messages, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize { self.heap.len() }

    /// Whether nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.heap.is_empty() }

    /// Queue a message.
    pub fn push(&mut self, message: OutboundMessage) {
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.heap.push(Reverse(QueuedMessage {
            key: message.send_key(),
            ticket,
            message,
        }));
    }

    /// Key of the message [`OutboundQueue::pop`] would consider first.
    #[must_use]
    pub fn peek_key(&self) -> Option<SendKey> { self.heap.peek().map(|Reverse(queued)| queued.key) }

    /// Remove the next live message, discarding expired ones on the way.
    pub fn pop_at(&mut self, now: Instant) -> Option<OutboundMessage> {
        while let Some(Reverse(queued)) = self.heap.pop() {
            if queued.message.has_expired(now) {
                warn!(
                    sequence_id = %queued.message.message().sequence_id(),
                    age_ms = queued.message.age(now).as_millis(),
                    "dropping expired outbound message"
                );
                continue;
            }
            return Some(queued.message);
        }
        None
    }

    /// Remove the next live message as of now.
    pub fn pop(&mut self) -> Option<OutboundMessage> { self.pop_at(Instant::now()) }

    /// Drop every expired message, returning their sequence ids.
    pub fn purge_expired_at(&mut self, now: Instant) -> Vec<SequenceId> {
        let mut purged = Vec::new();
        self.heap.retain(|Reverse(queued)| {
            let expired = queued.message.has_expired(now);
            if expired {
                purged.push(queued.message.message().sequence_id());
            }
            !expired
        });
        if !purged.is_empty() {
            warn!(count = purged.len(), "purged expired outbound messages");
        }
        purged
    }
}
