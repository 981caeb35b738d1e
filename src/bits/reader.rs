//! Read cursor over a [`BitBuffer`].

use super::{
    BitBuffer,
    BitError,
    QuantizedRange,
    buffer::{copy_bits, get_bit},
};

/// Independent read position over a borrowed [`BitBuffer`].
///
/// The reader is `Copy`, so a caller can snapshot a position, attempt a
/// multi-field parse, and either commit or fall back to the snapshot. Every
/// failing read leaves the position unchanged.
///
/// # Examples
///
/// ```
/// use bitframe::bits::{BitBuffer, BitError};
/// let mut buffer = BitBuffer::new();
/// buffer.write_uint(0x2A, 8);
///
/// let mut reader = buffer.reader();
/// assert!(matches!(reader.read_uint(16), Err(BitError::Exhausted { .. })));
/// assert_eq!(reader.position(), 0);
/// assert_eq!(reader.read_uint(8), Ok(0x2A));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct BitReader<'a> {
    buffer: &'a BitBuffer,
    position: usize,
}

impl<'a> BitReader<'a> {
    /// Start reading `buffer` from its first bit.
    #[must_use]
    pub const fn new(buffer: &'a BitBuffer) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Start reading `buffer` at bit `position`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidPosition`] when `position` lies beyond the
    /// written bits.
    pub fn at(buffer: &'a BitBuffer, position: usize) -> Result<Self, BitError> {
        let mut reader = Self::new(buffer);
        reader.seek(position)?;
        Ok(reader)
    }

    /// Buffer being read.
    #[must_use]
    pub const fn buffer(&self) -> &'a BitBuffer { self.buffer }

    /// Number of bits consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize { self.position }

    /// Number of written bits not yet consumed.
    #[must_use]
    pub const fn remaining_bits(&self) -> usize { self.buffer.len_bits() - self.position }

    /// Whether every written bit has been consumed.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool { self.remaining_bits() == 0 }

    /// Move to an absolute bit position.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidPosition`] when `position` lies beyond the
    /// written bits.
    pub fn seek(&mut self, position: usize) -> Result<(), BitError> {
        let written = self.buffer.len_bits();
        if position > written {
            return Err(BitError::InvalidPosition { position, written });
        }
        self.position = position;
        Ok(())
    }

    /// Skip `n_bits` unread bits.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when fewer than `n_bits` remain.
    pub fn skip(&mut self, n_bits: usize) -> Result<(), BitError> {
        self.ensure(self.position, n_bits)?;
        self.position += n_bits;
        Ok(())
    }

    /// Read a single bit.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when no unread bit remains.
    pub fn read_bit(&mut self) -> Result<bool, BitError> {
        self.ensure(self.position, 1)?;
        let bit = get_bit(self.buffer.raw(), self.position);
        self.position += 1;
        Ok(bit)
    }

    /// Read `n_bits` bits into `out`, mirroring
    /// [`BitBuffer::write_bits`](crate::bits::BitBuffer::write_bits).
    ///
    /// Under [`Alignment::Byte`](crate::bits::Alignment::Byte) the reader
    /// first skips to the next byte boundary and rounds `n_bits` up to whole
    /// bytes. Unused high bits of the last output byte are cleared. Returns the
    /// number of data bits read.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when the buffer holds too few bits.
    ///
    /// # Panics
    ///
    /// Panics if `out` is too short for the (rounded) bit count.
    pub fn read_bits(&mut self, out: &mut [u8], n_bits: usize) -> Result<usize, BitError> {
        let alignment = self.buffer.alignment();
        let start = alignment.align(self.position);
        let n_bits = alignment.round(n_bits);
        self.ensure(self.position, start - self.position + n_bits)?;
        out[..n_bits.div_ceil(8)].fill(0);
        copy_bits(self.buffer.raw(), start, out, 0, n_bits);
        self.position = start + n_bits;
        Ok(n_bits)
    }

    /// Read `n_bits` bits into a freshly allocated byte vector.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when the buffer holds too few bits.
    pub fn read_bits_to_vec(&mut self, n_bits: usize) -> Result<Vec<u8>, BitError> {
        let mut out = vec![0_u8; self.buffer.alignment().round(n_bits).div_ceil(8)];
        self.read_bits(&mut out, n_bits)?;
        Ok(out)
    }

    /// Read an unsigned integer written by
    /// [`BitBuffer::write_uint`](crate::bits::BitBuffer::write_uint).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when fewer than `n_bits` remain.
    ///
    /// # Panics
    ///
    /// Panics if `n_bits` exceeds 64.
    pub fn read_uint(&mut self, n_bits: usize) -> Result<u64, BitError> {
        assert!(n_bits <= 64, "cannot read {n_bits} bits into a u64");
        self.ensure(self.position, n_bits)?;
        let mut bytes = [0_u8; 8];
        copy_bits(self.buffer.raw(), self.position, &mut bytes, 0, n_bits);
        self.position += n_bits;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read a value written with
    /// [`BitBuffer::write_quantized`](crate::bits::BitBuffer::write_quantized).
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when the field is truncated, or
    /// [`BitError::OutOfRange`] when the decoded value exceeds the range. The
    /// position is unchanged in both cases.
    pub fn read_quantized(&mut self, range: QuantizedRange) -> Result<u64, BitError> {
        let mut probe = *self;
        let value = range.value_of(probe.read_uint(range.bits())?)?;
        *self = probe;
        Ok(value)
    }

    /// Length in bytes of the next null-terminated string, terminator
    /// excluded, without consuming anything.
    ///
    /// Returns `None` when no terminator has been written yet.
    #[must_use]
    pub fn peek_string_bytes(&self) -> Option<usize> {
        let start = self.buffer.alignment().align(self.position);
        let written = self.buffer.len_bits();
        let mut offset = start;
        let mut length = 0;
        while offset + 8 <= written {
            let mut byte = [0_u8; 1];
            copy_bits(self.buffer.raw(), offset, &mut byte, 0, 8);
            if byte[0] == 0 {
                return Some(length);
            }
            length += 1;
            offset += 8;
        }
        None
    }

    /// Read a null-terminated UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Unterminated`] when no terminator is available yet
    /// and [`BitError::InvalidUtf8`] when the bytes are not UTF-8. The
    /// position is unchanged on error.
    pub fn read_string(&mut self) -> Result<String, BitError> {
        let length = self.peek_string_bytes().ok_or(BitError::Unterminated {
            available: self.remaining_bits(),
        })?;
        let mut probe = *self;
        let mut bytes = probe.read_bits_to_vec((length + 1) * 8)?;
        bytes.truncate(length);
        let value = String::from_utf8(bytes).map_err(|_| BitError::InvalidUtf8)?;
        *self = probe;
        Ok(value)
    }

    pub(super) fn advance(&mut self, n_bits: usize) {
        debug_assert!(n_bits <= self.remaining_bits());
        self.position += n_bits;
    }

    fn ensure(&self, start: usize, n_bits: usize) -> Result<(), BitError> {
        let available = self.buffer.len_bits().saturating_sub(start);
        if n_bits > available {
            return Err(BitError::Exhausted {
                requested: n_bits,
                available,
            });
        }
        Ok(())
    }
}
