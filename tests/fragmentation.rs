//! End-to-end fragmentation: slice, encode, decode, and reassemble.

use bitframe::{
    Alignment,
    BitBuffer,
    FragmentIndex,
    FragmentReassemblyBuffer,
    FragmentStatus,
    FragmentationConfig,
    Message,
    ReassemblyError,
    SequenceId,
};
use rstest::rstest;

mod common;
use common::{LoggerHandle, TestResult, fragments_of, logger, message};

#[test]
fn ten_thousand_bits_reassemble_from_1500_bit_slices() -> TestResult {
    let original = message(100, 10_000);
    let fragments = fragments_of(&original, 1_500)?;
    assert_eq!(fragments.len(), 7);

    let mut buffer = FragmentReassemblyBuffer::new(SequenceId::new(100));
    let (last, rest) = fragments.split_last().ok_or("no fragments")?;
    for (expected, fragment) in rest.iter().enumerate() {
        let info = fragment.fragment().ok_or("missing fragment info")?;
        assert_eq!(usize::from(info.index().get()), expected);
        assert!(!info.is_final());
        assert_eq!(buffer.add(fragment.clone())?, FragmentStatus::Incomplete);
    }
    assert!(!buffer.is_complete());

    assert_eq!(buffer.add(last.clone())?, FragmentStatus::Complete);
    assert!(buffer.is_complete());
    assert_eq!(buffer.final_index(), Some(FragmentIndex::new(6)));
    assert_eq!(last.payload_bits(), 1_000);

    let rebuilt = buffer.reconstruct()?;
    assert_eq!(rebuilt.payload_bits(), 10_000);
    assert_eq!(rebuilt.payload().as_bytes(), original.payload().as_bytes());
    assert_eq!(rebuilt, original);
    Ok(())
}

#[test]
fn duplicate_fragment_is_rejected_without_state_change() -> TestResult {
    let fragments = fragments_of(&message(5, 4_000), 1_000)?;
    let mut buffer = FragmentReassemblyBuffer::new(SequenceId::new(5));
    buffer.add(fragments[0].clone())?;
    buffer.add(fragments[1].clone())?;
    let held_bits = buffer.buffered_bits();

    assert_eq!(
        buffer.add(fragments[1].clone()),
        Err(ReassemblyError::DuplicateIndex {
            sequence_id: SequenceId::new(5),
            index: FragmentIndex::new(1),
        })
    );
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.buffered_bits(), held_bits);
    Ok(())
}

#[rstest]
#[case::bit(Alignment::Bit)]
#[case::byte(Alignment::Byte)]
fn fragments_survive_the_wire_out_of_order(#[case] alignment: Alignment) -> TestResult {
    let original = Message::new(
        bitframe::MessageType::new(9),
        SequenceId::new(77),
        common::patterned_payload(3_333, alignment),
    )
    .with_channel(bitframe::ChannelId::new(4))
    .with_timestamp(86_400_000);
    let config = FragmentationConfig::for_frame_budget(1_200).ok_or("budget too small")?;
    assert!(config.needs_fragmentation(&original));

    let slice = config.fragment_bits_for(&original).get();
    let mut wire = BitBuffer::with_alignment(alignment);
    for fragment in fragments_of(&original, slice)?.iter().rev() {
        let written = fragment.encode(&mut wire)?;
        assert!(written <= 1_200);
    }

    let mut reader = wire.reader();
    let mut buffer = FragmentReassemblyBuffer::new(SequenceId::new(77));
    while let Some(fragment) = Message::decode(&mut reader)? {
        buffer.add(fragment)?;
    }
    assert!(reader.is_exhausted());
    assert_eq!(buffer.reconstruct()?, original);
    Ok(())
}

#[rstest]
fn protocol_violations_are_logged(mut logger: LoggerHandle) -> TestResult {
    let fragments = fragments_of(&message(8, 300), 100)?;
    let mut buffer = FragmentReassemblyBuffer::new(SequenceId::new(8));
    buffer.add(fragments[2].clone())?;
    assert!(matches!(
        buffer.add(fragments[2].clone()),
        Err(ReassemblyError::DuplicateIndex { .. })
    ));

    assert!(
        logger.contains(log::Level::Warn, "rejected fragment"),
        "expected a warning for the duplicate fragment"
    );
    Ok(())
}
