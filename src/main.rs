//! `bitframe` binary: frame a synthetic message and verify the round trip.
//!
//! Builds a patterned payload, fragments it against the frame budget when
//! needed, encodes each frame, decodes the frames back, reassembles them,
//! and checks the result bit-for-bit.

mod cli;

use std::process::ExitCode;

use bitframe::{
    Alignment,
    BitBuffer,
    ChannelId,
    DecodeError,
    Delivery,
    EncodeError,
    FragmentReassemblyBuffer,
    FragmentationConfig,
    FragmentationError,
    Message,
    MessageType,
    OutboundMessage,
    ReassemblyError,
    SequenceId,
};
use clap::Parser;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
enum RunError {
    #[error("frame budget of {0} bits cannot hold a fragment header")]
    FrameBudget(usize),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Fragmentation(#[from] FragmentationError),
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
    #[error("frame {0} ended before a whole message was decoded")]
    Truncated(usize),
    #[error("reassembled message differs from the original")]
    Mismatch,
}

fn patterned_payload(bits: usize, alignment: Alignment) -> BitBuffer {
    let mut payload = BitBuffer::with_capacity_bits(bits, alignment);
    for index in 0..bits {
        payload.write_bit(index % 3 == 0 || index % 7 == 0);
    }
    payload
}

fn build_message(cli: &cli::Cli) -> Message {
    let alignment = if cli.byte_aligned {
        Alignment::Byte
    } else {
        Alignment::Bit
    };
    let mut message = Message::new(
        MessageType::new(cli.message_type),
        SequenceId::new(cli.sequence),
        patterned_payload(cli.payload_bits, alignment),
    )
    .with_channel(ChannelId::new(cli.channel));
    if let Some(timestamp) = cli.timestamp {
        message = message.with_timestamp(timestamp);
    }
    message
}

fn encode_frames(message: &Message, config: FragmentationConfig) -> Result<Vec<BitBuffer>, RunError> {
    if !config.needs_fragmentation(message) {
        return Ok(vec![message.to_bits()?]);
    }
    let slice = config.fragment_bits_for(message);
    OutboundMessage::new(message.clone(), Delivery::default())
        .into_fragments(slice)?
        .iter()
        .map(|fragment| fragment.message().to_bits().map_err(RunError::from))
        .collect()
}

fn decode_frame(index: usize, frame: &BitBuffer) -> Result<Message, RunError> {
    Message::from_bits(frame)?.ok_or(RunError::Truncated(index))
}

fn run(cli: &cli::Cli) -> Result<(), RunError> {
    let config =
        FragmentationConfig::for_frame_budget(cli.frame_bits).ok_or(RunError::FrameBudget(cli.frame_bits))?;
    let original = build_message(cli);
    let mut frames = encode_frames(&original, config)?;
    info!(
        payload_bits = original.payload_bits(),
        frames = frames.len(),
        "encoded message"
    );
    if cli.reverse {
        frames.reverse();
    }

    let mut reassembly = FragmentReassemblyBuffer::new(original.sequence_id());
    let mut whole = None;
    for (index, frame) in frames.iter().enumerate() {
        println!("frame {index}: {} bits", frame.len_bits());
        let decoded = decode_frame(index, frame)?;
        if decoded.is_fragment() {
            reassembly.add(decoded)?;
        } else {
            whole = Some(decoded);
        }
    }
    let rebuilt = match whole {
        Some(message) => message,
        None => reassembly.reconstruct()?,
    };
    if rebuilt != original {
        return Err(RunError::Mismatch);
    }
    println!(
        "verified {} payload bits across {} frame(s)",
        rebuilt.payload_bits(),
        frames.len()
    );
    Ok(())
}

fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = cli::Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
