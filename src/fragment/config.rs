//! Sizing rules for splitting messages to fit a transport frame.

use std::num::NonZeroUsize;

use crate::message::{MAX_FRAGMENT_HEADER_BITS, MAX_PAYLOAD_BITS, Message};

/// Frame budget and the per-fragment payload size derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FragmentationConfig {
    /// Largest encoded message, in bits, the transport accepts in one frame.
    pub frame_budget_bits: NonZeroUsize,
    /// Payload bits carried by each fragment. A fragment with every optional
    /// header field present still fits within `frame_budget_bits`, and the
    /// slice never exceeds [`MAX_PAYLOAD_BITS`].
    pub fragment_payload_bits: NonZeroUsize,
}

impl FragmentationConfig {
    /// Derive a configuration from the transport's frame budget.
    ///
    /// Fragment payloads are sized against the worst-case fragment header so
    /// every fragment fits regardless of which optional fields it carries.
    /// Budgets larger than the payload length field can describe are capped
    /// at [`MAX_PAYLOAD_BITS`] per fragment.
    ///
    /// Returns `None` when the budget cannot hold that header plus one
    /// payload bit.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitframe::{fragment::FragmentationConfig, message::MAX_FRAGMENT_HEADER_BITS};
    /// let config = FragmentationConfig::for_frame_budget(1200 * 8).expect("budget fits");
    /// assert_eq!(
    ///     config.fragment_payload_bits.get(),
    ///     1200 * 8 - MAX_FRAGMENT_HEADER_BITS
    /// );
    /// assert!(FragmentationConfig::for_frame_budget(MAX_FRAGMENT_HEADER_BITS).is_none());
    /// ```
    #[must_use]
    pub fn for_frame_budget(frame_budget_bits: usize) -> Option<Self> {
        let payload = frame_budget_bits
            .checked_sub(MAX_FRAGMENT_HEADER_BITS)?
            .min(MAX_PAYLOAD_BITS);
        Some(Self {
            frame_budget_bits: NonZeroUsize::new(frame_budget_bits)?,
            fragment_payload_bits: NonZeroUsize::new(payload)?,
        })
    }

    /// Whether `message` cannot be sent whole: it would exceed the frame
    /// budget, or its payload is too long for the length field.
    #[must_use]
    pub fn needs_fragmentation(&self, message: &Message) -> bool {
        message.payload_bits() > MAX_PAYLOAD_BITS
            || message.total_bits() > self.frame_budget_bits.get()
    }

    /// Largest payload slice that keeps a fragment of `message` within the
    /// frame budget, given the header fields `message` actually carries.
    ///
    /// Never smaller than
    /// [`fragment_payload_bits`](FragmentationConfig::fragment_payload_bits)
    /// and never larger than [`MAX_PAYLOAD_BITS`].
    #[must_use]
    pub fn fragment_bits_for(&self, message: &Message) -> NonZeroUsize {
        self.frame_budget_bits
            .get()
            .checked_sub(message.header_bits(true))
            .map(|bits| bits.min(MAX_PAYLOAD_BITS))
            .and_then(NonZeroUsize::new)
            .unwrap_or(self.fragment_payload_bits)
    }
}
