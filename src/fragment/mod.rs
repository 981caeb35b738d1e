//! Reassembly of fragmented messages.
//!
//! Outbound slicing lives on
//! [`OutboundMessage::take_fragment`](crate::outbound::OutboundMessage::take_fragment);
//! this module holds the inbound half plus the sizing rules both sides share.

pub mod config;
pub mod error;
pub mod reassembly;

pub use config::FragmentationConfig;
pub use error::{FragmentStatus, ReassemblyError};
pub use reassembly::FragmentReassemblyBuffer;

#[cfg(test)]
mod tests;
