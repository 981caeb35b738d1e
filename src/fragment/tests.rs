//! Unit tests for reassembly ordering rules and fragment sizing.

use std::num::NonZeroUsize;

use proptest::{
    prelude::*,
    test_runner::{Config, RngAlgorithm, TestRng, TestRunner},
};
use rstest::rstest;

use super::*;
use crate::{
    bits::BitBuffer,
    message::{
        ChannelId,
        FragmentIndex,
        FragmentInfo,
        MAX_FRAGMENT_HEADER_BITS,
        MAX_PAYLOAD_BITS,
        Message,
        MessageType,
        SequenceId,
    },
    outbound::{Delivery, OutboundMessage},
    test_helpers::{LoggerHandle, logger},
};

const SEQUENCE: SequenceId = SequenceId::new(12);

fn deterministic_runner(cases: u32) -> TestRunner {
    TestRunner::new_with_rng(
        Config {
            cases,
            ..Config::default()
        },
        TestRng::deterministic_rng(RngAlgorithm::ChaCha),
    )
}

fn fragment(index: u16, is_final: bool, bits: usize) -> Message {
    let mut payload = BitBuffer::new();
    for offset in 0..bits {
        payload.write_bit((usize::from(index) + offset) % 2 == 0);
    }
    Message::new(MessageType::new(64), SEQUENCE, payload)
        .with_fragment(FragmentInfo::new(FragmentIndex::new(index), is_final))
}

fn filled(indices: &[(u16, bool)]) -> FragmentReassemblyBuffer {
    let mut buffer = FragmentReassemblyBuffer::new(SEQUENCE);
    for &(index, is_final) in indices {
        buffer
            .add(fragment(index, is_final, 4))
            .expect("fragment accepted");
    }
    buffer
}

#[test]
fn in_order_fragments_complete_on_final() {
    let mut buffer = FragmentReassemblyBuffer::new(SEQUENCE);
    assert!(buffer.is_empty());
    assert_eq!(buffer.add(fragment(0, false, 8)), Ok(FragmentStatus::Incomplete));
    assert_eq!(buffer.add(fragment(1, false, 8)), Ok(FragmentStatus::Incomplete));
    assert!(!buffer.is_complete());
    assert_eq!(buffer.add(fragment(2, true, 3)), Ok(FragmentStatus::Complete));
    assert!(buffer.is_complete());
    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.final_index(), Some(FragmentIndex::new(2)));
    assert_eq!(buffer.buffered_bits(), 19);
}

#[test]
fn final_first_still_needs_the_gap_filled() {
    let mut buffer = filled(&[(3, true), (0, false), (2, false)]);
    assert!(!buffer.is_complete());
    assert_eq!(buffer.add(fragment(1, false, 4)), Ok(FragmentStatus::Complete));
}

#[test]
fn lone_final_fragment_zero_is_complete() {
    let buffer = filled(&[(0, true)]);
    assert!(buffer.is_complete());
    let message = buffer.reconstruct().expect("complete");
    assert_eq!(message.payload_bits(), 4);
}

#[rstest]
#[case::duplicate(
    &[(0, false), (1, false)],
    fragment(1, false, 4),
    ReassemblyError::DuplicateIndex { sequence_id: SEQUENCE, index: FragmentIndex::new(1) }
)]
#[case::duplicate_final(
    &[(2, true)],
    fragment(2, true, 4),
    ReassemblyError::DuplicateIndex { sequence_id: SEQUENCE, index: FragmentIndex::new(2) }
)]
#[case::beyond_final(
    &[(2, true)],
    fragment(5, false, 4),
    ReassemblyError::BeyondFinal { index: FragmentIndex::new(5), final_index: FragmentIndex::new(2) }
)]
#[case::second_final(
    &[(2, true)],
    fragment(1, true, 4),
    ReassemblyError::ConflictingFinal { index: FragmentIndex::new(1), final_index: FragmentIndex::new(2) }
)]
#[case::final_below_held(
    &[(0, false), (4, false)],
    fragment(3, true, 4),
    ReassemblyError::FinalBelowHeld { index: FragmentIndex::new(3), highest_held: FragmentIndex::new(4) }
)]
fn invalid_fragments_leave_buffer_unchanged(
    #[case] held: &[(u16, bool)],
    #[case] incoming: Message,
    #[case] expected: ReassemblyError,
) {
    let mut buffer = filled(held);
    let len = buffer.len();
    let final_index = buffer.final_index();
    let bits = buffer.buffered_bits();

    assert_eq!(buffer.add(incoming), Err(expected));
    assert_eq!(buffer.len(), len);
    assert_eq!(buffer.final_index(), final_index);
    assert_eq!(buffer.buffered_bits(), bits);
}

#[test]
fn foreign_and_unfragmented_messages_are_rejected() {
    let mut buffer = FragmentReassemblyBuffer::new(SEQUENCE);
    let foreign = Message::new(MessageType::new(64), SequenceId::new(13), BitBuffer::new())
        .with_fragment(FragmentInfo::new(FragmentIndex::zero(), true));
    assert_eq!(
        buffer.add(foreign),
        Err(ReassemblyError::SequenceMismatch {
            expected: SEQUENCE,
            found: SequenceId::new(13),
        })
    );

    let whole = Message::new(MessageType::new(64), SEQUENCE, BitBuffer::new());
    assert_eq!(
        buffer.add(whole),
        Err(ReassemblyError::NotAFragment {
            sequence_id: SEQUENCE,
        })
    );
    assert!(buffer.is_empty());
}

#[rstest]
fn rejections_are_logged(mut logger: LoggerHandle) {
    let mut buffer = filled(&[(0, false)]);
    assert!(buffer.add(fragment(0, false, 4)).is_err());
    assert!(logger.contains(log::Level::Warn, "rejected fragment"));
}

#[test]
fn early_reconstruct_reports_incomplete() {
    let buffer = filled(&[(0, false), (2, true)]);
    assert_eq!(
        buffer.reconstruct(),
        Err(ReassemblyError::Incomplete {
            sequence_id: SEQUENCE,
            held: 2,
        })
    );
}

#[test]
fn reconstruct_strips_fragment_metadata_and_keeps_header() {
    let original = Message::new(MessageType::new(99), SEQUENCE, {
        let mut payload = BitBuffer::new();
        payload.write_bits(&[0x5A, 0xC3, 0x0F], 21);
        payload
    })
    .with_channel(ChannelId::new(6))
    .with_timestamp(77);

    let fragments = OutboundMessage::new(original.clone(), Delivery::default())
        .into_fragments(NonZeroUsize::new(8).expect("non-zero"))
        .expect("fragments");
    let mut buffer = FragmentReassemblyBuffer::new(SEQUENCE);
    for outbound in fragments.into_iter().rev() {
        buffer.add(outbound.into_message()).expect("accepted");
    }

    let rebuilt = buffer.reconstruct().expect("complete");
    assert_eq!(rebuilt, original);
}

#[test]
fn shuffled_arrival_reassembles_identically() {
    let strategy = (
        prop::collection::vec(any::<u8>(), 1..64),
        1usize..40,
        any::<u64>(),
    );
    deterministic_runner(64)
        .run(&strategy, |(bytes, slice, seed)| {
            let bits = bytes.len() * 8 - usize::from(bytes[0] % 8);
            let mut payload = BitBuffer::new();
            payload.write_bits(&bytes, bits);
            let original = Message::new(MessageType::new(70), SEQUENCE, payload);

            let mut fragments = OutboundMessage::new(original.clone(), Delivery::default())
                .into_fragments(NonZeroUsize::new(slice).expect("non-zero"))
                .expect("fragments");
            let len = fragments.len();
            let rotation = usize::try_from(seed % len as u64).expect("fits usize");
            fragments.rotate_left(rotation);

            let mut buffer = FragmentReassemblyBuffer::new(SEQUENCE);
            for (position, outbound) in fragments.into_iter().enumerate() {
                let status = buffer.add(outbound.into_message()).expect("accepted");
                prop_assert_eq!(status == FragmentStatus::Complete, position + 1 == len);
            }
            prop_assert_eq!(buffer.reconstruct().expect("complete"), original);
            Ok(())
        })
        .expect("shuffled fragments reassemble");
}

#[test]
fn frame_budget_reserves_worst_case_header() {
    let budget = MAX_FRAGMENT_HEADER_BITS + 100;
    let config = FragmentationConfig::for_frame_budget(budget).expect("budget fits");
    assert_eq!(config.frame_budget_bits.get(), budget);
    assert_eq!(config.fragment_payload_bits.get(), 100);

    assert!(FragmentationConfig::for_frame_budget(MAX_FRAGMENT_HEADER_BITS).is_none());
    assert!(FragmentationConfig::for_frame_budget(0).is_none());
    assert!(FragmentationConfig::for_frame_budget(MAX_FRAGMENT_HEADER_BITS + 1).is_some());
}

#[test]
fn fragment_sizing_uses_actual_header() {
    let config = FragmentationConfig::for_frame_budget(1000).expect("budget fits");
    let bare = Message::new(MessageType::new(64), SEQUENCE, fragment(0, false, 950).into_payload());
    assert!(config.needs_fragmentation(&bare));
    assert_eq!(
        config.fragment_bits_for(&bare).get(),
        1000 - bare.header_bits(true)
    );
    assert!(config.fragment_bits_for(&bare) > config.fragment_payload_bits);

    let full = bare
        .clone()
        .with_channel(ChannelId::new(1))
        .with_timestamp(1);
    assert_eq!(config.fragment_bits_for(&full), config.fragment_payload_bits);

    let small = Message::new(MessageType::new(64), SEQUENCE, fragment(0, false, 10).into_payload());
    assert!(!config.needs_fragmentation(&small));
}

#[test]
fn oversized_budget_is_capped_at_length_field() {
    let config = FragmentationConfig::for_frame_budget(1_000_000).expect("budget fits");
    assert_eq!(config.fragment_payload_bits.get(), MAX_PAYLOAD_BITS);

    let mut payload = BitBuffer::new();
    payload.write_bits(&vec![0xA5; 75_000], 600_000);
    let message = Message::new(MessageType::new(64), SEQUENCE, payload);
    assert!(message.total_bits() < config.frame_budget_bits.get());
    assert!(config.needs_fragmentation(&message));

    let slice = config.fragment_bits_for(&message);
    assert_eq!(slice.get(), MAX_PAYLOAD_BITS);
    let fragments = OutboundMessage::new(message, Delivery::default())
        .into_fragments(slice)
        .expect("fragments");
    assert_eq!(fragments.len(), 2);
    for outbound in &fragments {
        let encoded = outbound.message().to_bits().expect("fragment encodes");
        assert!(encoded.len_bits() <= config.frame_budget_bits.get());
    }
}
