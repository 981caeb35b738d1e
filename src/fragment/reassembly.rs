//! Inbound buffer that stitches one sequence's fragments back together.
//!
//! Fragments may arrive in any order. They are held in a map keyed by
//! [`FragmentIndex`], so reconstruction simply walks the map. The buffer
//! tracks a single sequence; the connection layer owns one per in-flight
//! sequence id and decides how much it is willing to hold.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{FragmentStatus, ReassemblyError};
use crate::message::{FragmentIndex, FragmentInfo, Message, SequenceId};

/// Fragments collected for one sequence id.
///
/// # Examples
///
/// ```
/// use bitframe::{
///     bits::BitBuffer,
///     fragment::{FragmentReassemblyBuffer, FragmentStatus},
///     message::{FragmentIndex, FragmentInfo, Message, MessageType, SequenceId},
/// };
/// let fragment = |index, is_final, bit| {
///     let mut payload = BitBuffer::new();
///     payload.write_bit(bit);
///     Message::new(MessageType::new(40), SequenceId::new(3), payload)
///         .with_fragment(FragmentInfo::new(FragmentIndex::new(index), is_final))
/// };
///
/// let mut buffer = FragmentReassemblyBuffer::new(SequenceId::new(3));
/// assert_eq!(buffer.add(fragment(1, true, false)), Ok(FragmentStatus::Incomplete));
/// assert_eq!(buffer.add(fragment(0, false, true)), Ok(FragmentStatus::Complete));
/// let message = buffer.reconstruct().expect("complete");
/// assert_eq!(message.payload().as_bytes(), &[0b01]);
/// assert!(!message.is_fragment());
/// ```
#[derive(Clone, Debug)]
pub struct FragmentReassemblyBuffer {
    sequence_id: SequenceId,
    fragments: BTreeMap<FragmentIndex, Message>,
    final_index: Option<FragmentIndex>,
}

impl FragmentReassemblyBuffer {
    /// Create an empty buffer for `sequence_id`.
    #[must_use]
    pub fn new(sequence_id: SequenceId) -> Self {
        Self {
            sequence_id,
            fragments: BTreeMap::new(),
            final_index: None,
        }
    }

    /// Sequence id every accepted fragment shares.
    #[must_use]
    pub const fn sequence_id(&self) -> SequenceId { self.sequence_id }

    /// Number of fragments held.
    #[must_use]
    pub fn len(&self) -> usize { self.fragments.len() }

    /// Whether no fragment has been accepted yet.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.fragments.is_empty() }

    /// Index of the final fragment, once it has arrived.
    #[must_use]
    pub const fn final_index(&self) -> Option<FragmentIndex> { self.final_index }

    /// Payload bits currently held across all fragments.
    ///
    /// Nothing here bounds how many low-index fragments accumulate before the
    /// final one arrives; callers enforce their own cap against this figure.
    #[must_use]
    pub fn buffered_bits(&self) -> usize { self.fragments.values().map(Message::payload_bits).sum() }

    /// Whether the final fragment and every index below it are held.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.final_index
            .is_some_and(|last| self.fragments.len() == usize::from(last.get()) + 1)
    }

    /// Accept a fragment.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError`] when `fragment` is not a fragment, belongs
    /// to another sequence, repeats a held index, or contradicts the final
    /// index. The buffer is unchanged on error.
    pub fn add(&mut self, fragment: Message) -> Result<FragmentStatus, ReassemblyError> {
        let info = self.check(&fragment).inspect_err(|err| {
            warn!(
                "rejected fragment: sequence_id={}, error={err}",
                self.sequence_id
            );
        })?;
        if info.is_final() {
            self.final_index = Some(info.index());
        }
        debug!(
            "accepted fragment: sequence_id={}, index={}, bits={}, final={}",
            self.sequence_id,
            info.index(),
            fragment.payload_bits(),
            info.is_final()
        );
        self.fragments.insert(info.index(), fragment);

        Ok(if self.is_complete() {
            FragmentStatus::Complete
        } else {
            FragmentStatus::Incomplete
        })
    }

    fn check(&self, fragment: &Message) -> Result<FragmentInfo, ReassemblyError> {
        let found = fragment.sequence_id();
        let info = fragment
            .fragment()
            .ok_or(ReassemblyError::NotAFragment { sequence_id: found })?;
        if found != self.sequence_id {
            return Err(ReassemblyError::SequenceMismatch {
                expected: self.sequence_id,
                found,
            });
        }
        let index = info.index();
        if self.fragments.contains_key(&index) {
            return Err(ReassemblyError::DuplicateIndex {
                sequence_id: self.sequence_id,
                index,
            });
        }
        match self.final_index {
            Some(final_index) if info.is_final() => {
                Err(ReassemblyError::ConflictingFinal { index, final_index })
            }
            Some(final_index) if index >= final_index => {
                Err(ReassemblyError::BeyondFinal { index, final_index })
            }
            None if info.is_final() => match self.fragments.last_key_value() {
                Some((&highest_held, _)) if highest_held > index => {
                    Err(ReassemblyError::FinalBelowHeld {
                        index,
                        highest_held,
                    })
                }
                _ => Ok(info),
            },
            _ => Ok(info),
        }
    }

    /// Rebuild the original message from the held fragments.
    ///
    /// The result carries the header of fragment zero with its fragment
    /// metadata stripped, and the payloads of every fragment concatenated in
    /// index order.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Incomplete`] when
    /// [`FragmentReassemblyBuffer::is_complete`] is false; the buffer is
    /// consumed either way.
    pub fn reconstruct(self) -> Result<Message, ReassemblyError> {
        let incomplete = ReassemblyError::Incomplete {
            sequence_id: self.sequence_id,
            held: self.fragments.len(),
        };
        if !self.is_complete() {
            return Err(incomplete);
        }
        let Some(first) = self.fragments.get(&FragmentIndex::zero()) else {
            return Err(incomplete);
        };

        let mut message = first.header_only();
        let payload = message.payload_mut();
        payload.reserve_bits(self.buffered_bits());
        for fragment in self.fragments.values() {
            payload.append(fragment.payload());
        }
        debug!(
            "reassembled message: sequence_id={}, fragments={}, bits={}",
            self.sequence_id,
            self.fragments.len(),
            message.payload_bits()
        );
        Ok(message)
    }
}
