//! Canonical bit layout of a [`Message`].
//!
//! Fields are written in a fixed order and every presence flag is always
//! emitted, so the decoder branches exactly as the encoder did:
//!
//! 1. message type, quantized to [`MESSAGE_TYPE_RANGE`]
//! 2. sequence id, [`SEQUENCE_ID_BITS`] wide
//! 3. payload length in bits, quantized to [`PAYLOAD_BITS_RANGE`]
//! 4. timestamp flag, then the timestamp quantized to [`TIMESTAMP_RANGE`]
//! 5. channel flag, then the channel id, [`CHANNEL_ID_BITS`] wide
//! 6. for non-empty payloads only: fragment flag, then the fragment index
//!    ([`FRAGMENT_INDEX_BITS`] wide) and the final-fragment flag
//! 7. the payload bits
//!
//! All fields are bit exact, so the layout does not depend on the output
//! buffer's [`Alignment`](crate::bits::Alignment).

use tracing::{debug, trace};

use super::{
    ChannelId,
    DecodeError,
    EncodeError,
    FragmentIndex,
    FragmentInfo,
    Message,
    MessageType,
    SequenceId,
};
use crate::bits::{BitBuffer, BitError, BitReader, QuantizedRange};

/// Range of the message type field.
pub const MESSAGE_TYPE_RANGE: QuantizedRange = QuantizedRange::new(0, 255);
/// Width of the sequence id field.
pub const SEQUENCE_ID_BITS: usize = 32;
/// Largest payload a single encoded message can carry (65 535 bytes).
pub const MAX_PAYLOAD_BITS: usize = 65_535 * 8;
/// Range of the payload length field.
pub const PAYLOAD_BITS_RANGE: QuantizedRange = QuantizedRange::new(0, MAX_PAYLOAD_BITS as u64);
/// Range of the millisecond timestamp field.
pub const TIMESTAMP_RANGE: QuantizedRange = QuantizedRange::new(0, 0xFFFF_FFFF);
/// Width of the channel id field.
pub const CHANNEL_ID_BITS: usize = 16;
/// Width of the fragment index field.
pub const FRAGMENT_INDEX_BITS: usize = 16;

const FLAG_BITS: usize = 1;

/// Header size of a message with a payload, no timestamp, no channel, and no
/// fragment metadata.
pub const MIN_HEADER_BITS: usize =
    MESSAGE_TYPE_RANGE.bits() + SEQUENCE_ID_BITS + PAYLOAD_BITS_RANGE.bits() + 3 * FLAG_BITS;
/// Header size of an unfragmented message with every optional field present.
pub const MAX_HEADER_BITS: usize = MIN_HEADER_BITS + TIMESTAMP_RANGE.bits() + CHANNEL_ID_BITS;
/// Header size of a fragment with every optional field present.
pub const MAX_FRAGMENT_HEADER_BITS: usize = MAX_HEADER_BITS + FRAGMENT_INDEX_BITS + FLAG_BITS;

impl Message {
    /// Header overhead predicted from the header flags alone.
    ///
    /// The fragment flag is always counted, so the result matches the encoded
    /// header of any message with a non-empty payload. Set `as_fragment` to
    /// size the header the message would carry once sliced into fragments.
    #[must_use]
    pub fn header_bits(&self, as_fragment: bool) -> usize {
        let mut bits = MIN_HEADER_BITS;
        if self.timestamp().is_some() {
            bits += TIMESTAMP_RANGE.bits();
        }
        if self.channel_id().is_channeled() {
            bits += CHANNEL_ID_BITS;
        }
        if as_fragment {
            bits += FRAGMENT_INDEX_BITS + FLAG_BITS;
        }
        bits
    }

    /// Exact number of bits [`Message::encode`] writes.
    #[must_use]
    pub fn total_bits(&self) -> usize {
        match self.payload_bits() {
            0 => self.header_bits(false) - FLAG_BITS,
            payload => self.header_bits(self.is_fragment()) + payload,
        }
    }

    /// Append the canonical encoding of this message to `out`.
    ///
    /// Returns the number of bits written.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] when the payload is too large for the length
    /// field, when a fragment carries no payload, or when a header field lies
    /// outside its range. Nothing is written on error.
    pub fn encode(&self, out: &mut BitBuffer) -> Result<usize, EncodeError> {
        let payload_bits = self.payload_bits();
        let length = PAYLOAD_BITS_RANGE
            .offset_of(payload_bits as u64)
            .map_err(|_| EncodeError::PayloadTooLarge {
                bits: payload_bits,
                max: MAX_PAYLOAD_BITS,
            })?;
        if payload_bits == 0 && self.is_fragment() {
            return Err(EncodeError::EmptyFragment {
                sequence_id: self.sequence_id(),
            });
        }
        let message_type = MESSAGE_TYPE_RANGE.offset_of(u64::from(self.message_type().get()))?;
        let timestamp = self
            .timestamp()
            .map(|value| TIMESTAMP_RANGE.offset_of(u64::from(value)))
            .transpose()?;

        let start = out.len_bits();
        out.reserve_bits(self.total_bits());
        out.write_uint(message_type, MESSAGE_TYPE_RANGE.bits());
        out.write_uint(u64::from(self.sequence_id().get()), SEQUENCE_ID_BITS);
        out.write_uint(length, PAYLOAD_BITS_RANGE.bits());

        out.write_bit(timestamp.is_some());
        if let Some(offset) = timestamp {
            out.write_uint(offset, TIMESTAMP_RANGE.bits());
        }

        let channel = self.channel_id();
        out.write_bit(channel.is_channeled());
        if channel.is_channeled() {
            out.write_uint(u64::from(channel.get()), CHANNEL_ID_BITS);
        }

        if payload_bits > 0 {
            out.write_bit(self.is_fragment());
            if let Some(fragment) = self.fragment() {
                out.write_uint(u64::from(fragment.index().get()), FRAGMENT_INDEX_BITS);
                out.write_bit(fragment.is_final());
            }
            out.append(self.payload());
        }

        let written = out.len_bits() - start;
        trace!(
            sequence_id = %self.sequence_id(),
            message_type = %self.message_type(),
            bits = written,
            "encoded message"
        );
        Ok(written)
    }

    /// Encode this message into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError`] under the same conditions as
    /// [`Message::encode`].
    pub fn to_bits(&self) -> Result<BitBuffer, EncodeError> {
        let mut out = BitBuffer::with_capacity_bits(
            self.total_bits(),
            self.payload().alignment(),
        );
        self.encode(&mut out)?;
        Ok(out)
    }

    /// Decode one message from `reader`.
    ///
    /// Returns `Ok(None)` when the reader does not yet hold a complete
    /// message; the reader is left where it was so decoding can be retried
    /// once more bits arrive. On success the reader is positioned after the
    /// message. The decoded payload adopts the alignment of the source
    /// buffer.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Malformed`] when a quantized field decodes
    /// outside its range. The reader is left where it was, but unlike
    /// `Ok(None)` the error is final: appending more bits never makes the
    /// same input decodable, so the caller should drop it.
    pub fn decode(reader: &mut BitReader<'_>) -> Result<Option<Self>, DecodeError> {
        let mut probe = *reader;
        match Self::decode_fields(&mut probe) {
            Ok(message) => {
                trace!(
                    sequence_id = %message.sequence_id(),
                    bits = probe.position() - reader.position(),
                    "decoded message"
                );
                *reader = probe;
                Ok(Some(message))
            }
            Err(BitError::Exhausted { requested, available }) => {
                trace!(
                    position = reader.position(),
                    requested,
                    available,
                    "message incomplete"
                );
                Ok(None)
            }
            Err(source) => {
                debug!(position = reader.position(), %source, "malformed message header");
                Err(DecodeError::Malformed {
                    position: reader.position(),
                    source,
                })
            }
        }
    }

    /// Decode the first message held by `buffer`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError`] under the same conditions as
    /// [`Message::decode`].
    pub fn from_bits(buffer: &BitBuffer) -> Result<Option<Self>, DecodeError> {
        Self::decode(&mut buffer.reader())
    }

    fn decode_fields(reader: &mut BitReader<'_>) -> Result<Self, BitError> {
        let message_type: u8 = narrow(
            reader.read_quantized(MESSAGE_TYPE_RANGE)?,
            MESSAGE_TYPE_RANGE.max(),
        )?;
        let sequence_id: u32 = narrow(reader.read_uint(SEQUENCE_ID_BITS)?, u64::from(u32::MAX))?;
        let payload_bits: usize = narrow(
            reader.read_quantized(PAYLOAD_BITS_RANGE)?,
            PAYLOAD_BITS_RANGE.max(),
        )?;

        let timestamp = if reader.read_bit()? {
            Some(narrow::<u32>(
                reader.read_quantized(TIMESTAMP_RANGE)?,
                TIMESTAMP_RANGE.max(),
            )?)
        } else {
            None
        };

        let channel_id = if reader.read_bit()? {
            ChannelId::new(narrow(
                reader.read_uint(CHANNEL_ID_BITS)?,
                u64::from(u16::MAX),
            )?)
        } else {
            ChannelId::UNCHANNELED
        };

        let fragment = if payload_bits > 0 && reader.read_bit()? {
            let index = FragmentIndex::new(narrow(
                reader.read_uint(FRAGMENT_INDEX_BITS)?,
                u64::from(u16::MAX),
            )?);
            Some(FragmentInfo::new(index, reader.read_bit()?))
        } else {
            None
        };

        let available = reader.remaining_bits();
        if available < payload_bits {
            return Err(BitError::Exhausted {
                requested: payload_bits,
                available,
            });
        }
        let mut payload = BitBuffer::with_capacity_bits(payload_bits, reader.buffer().alignment());
        payload.append_from(reader, payload_bits);

        let mut message = Message::new(
            MessageType::new(message_type),
            SequenceId::new(sequence_id),
            payload,
        )
        .with_channel(channel_id);
        if let Some(value) = timestamp {
            message = message.with_timestamp(value);
        }
        if let Some(info) = fragment {
            message = message.with_fragment(info);
        }
        Ok(message)
    }
}

fn narrow<T: TryFrom<u64>>(value: u64, max: u64) -> Result<T, BitError> {
    T::try_from(value).map_err(|_| BitError::OutOfRange { value, min: 0, max })
}
