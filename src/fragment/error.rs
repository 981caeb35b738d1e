//! Error and status types emitted by fragment reassembly.

use thiserror::Error;

use crate::message::{FragmentIndex, SequenceId};

/// Result of feeding a fragment into a
/// [`FragmentReassemblyBuffer`](crate::fragment::FragmentReassemblyBuffer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentStatus {
    /// More fragments are required.
    Incomplete,
    /// Every fragment up to the final one is held.
    Complete,
}

/// Fragments a reassembly buffer refuses to accept.
///
/// The buffer is unchanged whenever one of these is returned. A peer that
/// triggers any of them is misbehaving, so callers should abandon the
/// sequence rather than retry.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The message carries no fragment metadata.
    #[error("message {sequence_id} is not a fragment")]
    NotAFragment { sequence_id: SequenceId },
    /// The fragment belongs to a different sequence.
    #[error("fragment sequence mismatch: expected {expected}, found {found}")]
    SequenceMismatch {
        expected: SequenceId,
        found: SequenceId,
    },
    /// A fragment with this index is already held.
    #[error("duplicate fragment {index} for sequence {sequence_id}")]
    DuplicateIndex {
        sequence_id: SequenceId,
        index: FragmentIndex,
    },
    /// The index is at or beyond the recorded final fragment.
    #[error("fragment {index} lies beyond final fragment {final_index}")]
    BeyondFinal {
        index: FragmentIndex,
        final_index: FragmentIndex,
    },
    /// A second final fragment arrived.
    #[error("final fragment {index} conflicts with recorded final {final_index}")]
    ConflictingFinal {
        index: FragmentIndex,
        final_index: FragmentIndex,
    },
    /// A final fragment arrived below an index that is already held.
    #[error("final fragment {index} is below held fragment {highest_held}")]
    FinalBelowHeld {
        index: FragmentIndex,
        highest_held: FragmentIndex,
    },
    /// Reconstruction was requested before every fragment arrived.
    #[error("sequence {sequence_id} is incomplete: holding {held} fragments")]
    Incomplete { sequence_id: SequenceId, held: usize },
}
