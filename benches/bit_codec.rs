//! Criterion benchmarks for bit packing, message encoding, and fragmentation.
//!
//! This benchmark suite covers:
//! - raw bit writes in both alignment modes,
//! - encode and decode of whole messages, and
//! - slicing and reassembly of a message larger than one frame.

use std::num::NonZeroUsize;

use bitframe::{
    Alignment,
    BitBuffer,
    ChannelId,
    Delivery,
    FragmentReassemblyBuffer,
    Message,
    MessageType,
    OutboundMessage,
    SequenceId,
};
use criterion::{BenchmarkId, Criterion, Throughput, black_box};

const PAYLOAD_BITS: [usize; 3] = [64, 8_000, 80_000];
const FRAGMENT_BITS: usize = 1_500;

fn payload(bits: usize, alignment: Alignment) -> BitBuffer {
    let mut payload = BitBuffer::with_capacity_bits(bits, alignment);
    let bytes: Vec<u8> = (0..bits.div_ceil(8)).map(|i| (i * 31 % 251) as u8).collect();
    payload.write_bits(&bytes, bits);
    payload
}

fn message(bits: usize) -> Message {
    Message::new(MessageType::new(64), SequenceId::new(1), payload(bits, Alignment::Bit))
        .with_channel(ChannelId::new(3))
        .with_timestamp(1_000)
}

fn benchmark_bit_writes(c: &mut Criterion) {
    let mut group = c.benchmark_group("bits/write_uint");
    for alignment in [Alignment::Bit, Alignment::Byte] {
        group.throughput(Throughput::Elements(1_000));
        group.bench_function(BenchmarkId::from_parameter(format!("{alignment:?}")), |b| {
            b.iter(|| {
                let mut buffer = BitBuffer::with_alignment(alignment);
                for value in 0..1_000_u64 {
                    buffer.write_uint(value, 13);
                }
                black_box(buffer.len_bits())
            });
        });
    }
    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message/encode");
    for bits in PAYLOAD_BITS {
        let message = message(bits);
        group.throughput(Throughput::Bytes(bits.div_ceil(8) as u64));
        group.bench_function(BenchmarkId::from_parameter(bits), |b| {
            b.iter(|| match black_box(&message).to_bits() {
                Ok(encoded) => encoded,
                Err(err) => panic!("encode benchmark setup failed: {err}"),
            });
        });
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("message/decode");
    for bits in PAYLOAD_BITS {
        let encoded = match message(bits).to_bits() {
            Ok(encoded) => encoded,
            Err(err) => panic!("decode benchmark setup failed: {err}"),
        };
        group.throughput(Throughput::Bytes(bits.div_ceil(8) as u64));
        group.bench_function(BenchmarkId::from_parameter(bits), |b| {
            b.iter(|| match Message::from_bits(black_box(&encoded)) {
                Ok(Some(decoded)) => decoded,
                Ok(None) => panic!("decode benchmark input truncated"),
                Err(err) => panic!("decode benchmark input malformed: {err}"),
            });
        });
    }
    group.finish();
}

fn benchmark_fragmentation(c: &mut Criterion) {
    let mut group = c.benchmark_group("fragment/round_trip");
    let Some(size) = NonZeroUsize::new(FRAGMENT_BITS) else {
        panic!("fragment size must be non-zero");
    };
    for bits in PAYLOAD_BITS {
        let message = message(bits);
        group.throughput(Throughput::Bytes(bits.div_ceil(8) as u64));
        group.bench_function(BenchmarkId::from_parameter(bits), |b| {
            b.iter(|| {
                let fragments = match OutboundMessage::new(message.clone(), Delivery::default())
                    .into_fragments(size)
                {
                    Ok(fragments) => fragments,
                    Err(err) => panic!("fragmentation failed: {err}"),
                };
                let mut buffer = FragmentReassemblyBuffer::new(message.sequence_id());
                for fragment in fragments {
                    if let Err(err) = buffer.add(fragment.into_message()) {
                        panic!("reassembly rejected fragment: {err}");
                    }
                }
                match buffer.reconstruct() {
                    Ok(rebuilt) => black_box(rebuilt.payload_bits()),
                    Err(err) => panic!("reassembly incomplete: {err}"),
                }
            });
        });
    }
    group.finish();
}

/// Entrypoint for bit packing, codec, and fragmentation benchmarks.
fn main() {
    let mut criterion = Criterion::default().configure_from_args();
    benchmark_bit_writes(&mut criterion);
    benchmark_encode(&mut criterion);
    benchmark_decode(&mut criterion);
    benchmark_fragmentation(&mut criterion);
    criterion.final_summary();
}
