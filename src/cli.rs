//! Command line interface for the `bitframe` binary.
//!
//! The binary frames a synthetic message, fragmenting it when it exceeds the
//! frame budget, then decodes and reassembles the frames to check the round
//! trip. This module only depends on `clap` so the build script can render a
//! man page from it.

use clap::Parser;

/// Command line arguments for the `bitframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "bitframe",
    version,
    about = "Encode, fragment, and reassemble a synthetic message"
)]
pub struct Cli {
    /// Message type; values below 32 are protocol messages.
    #[arg(short = 't', long, default_value_t = 64)]
    pub message_type: u8,
    /// Sequence id shared by every fragment.
    #[arg(short, long, default_value_t = 1)]
    pub sequence: u32,
    /// Channel id; zero leaves the message unchanneled.
    #[arg(short, long, default_value_t = 0)]
    pub channel: u16,
    /// Millisecond timestamp to attach.
    #[arg(long)]
    pub timestamp: Option<u32>,
    /// Payload length in bits.
    #[arg(short, long, default_value_t = 10_000)]
    pub payload_bits: usize,
    /// Largest encoded frame in bits.
    #[arg(short, long, default_value_t = 1_500)]
    pub frame_bits: usize,
    /// Byte-align bulk payload writes.
    #[arg(long)]
    pub byte_aligned: bool,
    /// Decode frames in reverse order to exercise out-of-order reassembly.
    #[arg(long)]
    pub reverse: bool,
}
