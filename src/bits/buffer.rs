//! Growable, bit-addressable storage with a single write cursor.
//!
//! Reads go through [`BitReader`], which borrows the buffer immutably and
//! owns its own position. Several readers may walk the same buffer while it
//! stays stable, and the buffer never carries hidden read state.

use bytes::Bytes;
use tracing::trace;

use super::{BitError, BitReader, QuantizedRange};

/// Bytes allocated the first time a buffer grows.
pub const MIN_RESERVE_BYTES: usize = 32;

/// Addressing mode applied to block writes and reads.
///
/// Single bits, integers, quantized values and appends are always bit exact;
/// only [`BitBuffer::write_bits`], [`BitReader::read_bits`] and the string
/// codec honour [`Alignment::Byte`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Block operations start at the current bit.
    #[default]
    Bit,
    /// Block operations start at the next byte boundary and cover whole bytes.
    Byte,
}

impl Alignment {
    /// Position at which a block operation starting at `position` begins.
    #[must_use]
    pub const fn align(self, position: usize) -> usize {
        match self {
            Self::Bit => position,
            Self::Byte => position.next_multiple_of(8),
        }
    }

    /// Bit count actually transferred for a request of `n_bits`.
    #[must_use]
    pub const fn round(self, n_bits: usize) -> usize {
        match self {
            Self::Bit => n_bits,
            Self::Byte => n_bits.next_multiple_of(8),
        }
    }
}

/// Growable bit buffer.
///
/// Bit `i` lives in byte `i / 8` at bit `i % 8`, least-significant first.
/// Storage beyond the write cursor is always zero, so padding never needs to
/// be written explicitly and equality compares content alone.
///
/// # Examples
///
/// ```
/// use bitframe::bits::BitBuffer;
/// let mut buffer = BitBuffer::new();
/// buffer.write_bit(true);
/// buffer.write_uint(0b101, 3);
/// assert_eq!(buffer.len_bits(), 4);
///
/// let mut reader = buffer.reader();
/// assert_eq!(reader.read_bit(), Ok(true));
/// assert_eq!(reader.read_uint(3), Ok(0b101));
/// ```
#[derive(Clone, Debug, Default)]
pub struct BitBuffer {
    storage: Vec<u8>,
    bits_written: usize,
    alignment: Alignment,
}

impl BitBuffer {
    /// Create an empty, bit-aligned buffer without allocating.
    #[must_use]
    pub const fn new() -> Self { Self::with_alignment(Alignment::Bit) }

    /// Create an empty buffer using `alignment` for block operations.
    #[must_use]
    pub const fn with_alignment(alignment: Alignment) -> Self {
        Self {
            storage: Vec::new(),
            bits_written: 0,
            alignment,
        }
    }

    /// Create an empty buffer with room for at least `bits` bits.
    #[must_use]
    pub fn with_capacity_bits(bits: usize, alignment: Alignment) -> Self {
        let mut buffer = Self::with_alignment(alignment);
        buffer.reserve_bits(bits);
        buffer
    }

    /// Wrap the first `bit_len` bits of received bytes.
    ///
    /// Bits of the final byte beyond `bit_len` are discarded.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::Exhausted`] when `data` holds fewer than `bit_len`
    /// bits.
    pub fn from_bytes(
        data: impl AsRef<[u8]>,
        bit_len: usize,
        alignment: Alignment,
    ) -> Result<Self, BitError> {
        let data = data.as_ref();
        let available = data.len() * 8;
        if bit_len > available {
            return Err(BitError::Exhausted {
                requested: bit_len,
                available,
            });
        }
        let mut storage = data[..bit_len.div_ceil(8)].to_vec();
        let tail = bit_len % 8;
        if tail != 0 {
            if let Some(last) = storage.last_mut() {
                *last &= (1_u8 << tail) - 1;
            }
        }
        Ok(Self {
            storage,
            bits_written: bit_len,
            alignment,
        })
    }

    /// Alignment applied to block operations.
    #[must_use]
    pub const fn alignment(&self) -> Alignment { self.alignment }

    /// Change the alignment used by subsequent block operations.
    pub fn set_alignment(&mut self, alignment: Alignment) { self.alignment = alignment; }

    /// Number of bits written so far.
    #[must_use]
    pub const fn len_bits(&self) -> usize { self.bits_written }

    /// Number of bytes touched by the written bits.
    #[must_use]
    pub const fn len_bytes(&self) -> usize { self.bits_written.div_ceil(8) }

    /// Whether no bits have been written.
    #[must_use]
    pub const fn is_empty(&self) -> bool { self.bits_written == 0 }

    /// Allocated storage in bytes.
    #[must_use]
    pub fn capacity_bytes(&self) -> usize { self.storage.len() }

    /// Borrow the written bytes; the final byte is zero-padded.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.storage[..self.len_bytes()] }

    /// Consume the buffer, returning the written bytes for a transport.
    #[must_use]
    pub fn into_bytes(mut self) -> Bytes {
        self.storage.truncate(self.len_bytes());
        Bytes::from(self.storage)
    }

    /// Start reading from the first bit.
    #[must_use]
    pub fn reader(&self) -> BitReader<'_> { BitReader::new(self) }

    /// Discard all written bits while keeping the allocation.
    pub fn clear(&mut self) {
        let used = self.len_bytes();
        self.storage[..used].fill(0);
        self.bits_written = 0;
    }

    /// Ensure `additional` more bits can be written without growing.
    pub fn reserve_bits(&mut self, additional: usize) {
        let needed = self.bits_written.saturating_add(additional).div_ceil(8);
        if needed > self.storage.len() {
            self.storage.resize(needed, 0);
        }
    }

    /// Write a single bit, returning the number of bits written.
    pub fn write_bit(&mut self, value: bool) -> usize {
        self.grow_for(self.bits_written + 1);
        set_bit(&mut self.storage, self.bits_written, value);
        self.bits_written += 1;
        1
    }

    /// Write the first `n_bits` bits of `data`.
    ///
    /// With [`Alignment::Byte`] the cursor first skips to the next byte
    /// boundary and `n_bits` is rounded up to whole bytes. Returns the number
    /// of data bits written.
    ///
    /// # Panics
    ///
    /// Panics if `data` is shorter than the (rounded) bit count requires.
    pub fn write_bits(&mut self, data: &[u8], n_bits: usize) -> usize {
        let start = self.alignment.align(self.bits_written);
        let n_bits = self.alignment.round(n_bits);
        self.grow_for(start + n_bits);
        self.bits_written = start;
        self.put_bits(data, 0, n_bits);
        n_bits
    }

    /// Write the low `n_bits` bits of `value`, least-significant first.
    ///
    /// # Panics
    ///
    /// Panics if `n_bits` exceeds 64.
    pub fn write_uint(&mut self, value: u64, n_bits: usize) -> usize {
        assert!(n_bits <= 64, "cannot write {n_bits} bits from a u64");
        debug_assert!(
            n_bits == 64 || value >> n_bits == 0,
            "value {value} does not fit in {n_bits} bits"
        );
        self.grow_for(self.bits_written + n_bits);
        self.put_bits(&value.to_le_bytes(), 0, n_bits);
        n_bits
    }

    /// Write `value` using the width implied by `range`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::OutOfRange`] without writing when `value` falls
    /// outside `range`.
    pub fn write_quantized(&mut self, value: u64, range: QuantizedRange) -> Result<usize, BitError> {
        let offset = range.offset_of(value)?;
        Ok(self.write_uint(offset, range.bits()))
    }

    /// Write `value` followed by a NUL terminator.
    ///
    /// Returns the number of bits written, terminator included.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InteriorNul`] without writing when `value`
    /// contains a NUL byte.
    pub fn write_string(&mut self, value: &str) -> Result<usize, BitError> {
        if let Some(offset) = value.bytes().position(|byte| byte == 0) {
            return Err(BitError::InteriorNul { offset });
        }
        let body = self.write_bits(value.as_bytes(), value.len() * 8);
        Ok(body + self.write_bits(&[0], 8))
    }

    /// Copy up to `n_bits` unread bits from `source`, advancing only that
    /// reader.
    ///
    /// Copies `min(n_bits, source.remaining_bits())` bits bit-for-bit and
    /// returns that count. Alignment is ignored so the copy is always exact.
    pub fn append_from(&mut self, source: &mut BitReader<'_>, n_bits: usize) -> usize {
        let count = n_bits.min(source.remaining_bits());
        if count == 0 {
            return 0;
        }
        self.grow_for(self.bits_written + count);
        self.put_bits(source.buffer().raw(), source.position(), count);
        source.advance(count);
        count
    }

    /// Copy every bit of `other` onto the end of this buffer.
    pub fn append(&mut self, other: &BitBuffer) -> usize {
        self.append_from(&mut other.reader(), other.len_bits())
    }

    /// Drop the first `n_bits` bits, keeping only the remainder.
    ///
    /// The buffer is rebuilt from the surviving bits, which releases storage
    /// held by consumed data. Returns the number of bits discarded.
    pub fn trim_front(&mut self, n_bits: usize) -> usize {
        let discarded = n_bits.min(self.bits_written);
        if discarded == 0 {
            return 0;
        }
        let remaining = self.bits_written - discarded;
        let mut rebuilt = Self::with_alignment(self.alignment);
        rebuilt.reserve_bits(remaining);
        {
            let mut reader = self.reader();
            reader.advance(discarded);
            rebuilt.append_from(&mut reader, remaining);
        }
        trace!(discarded, remaining, "trimmed bit buffer");
        *self = rebuilt;
        discarded
    }

    pub(super) fn raw(&self) -> &[u8] { &self.storage }

    fn grow_for(&mut self, total_bits: usize) {
        let needed = total_bits.div_ceil(8);
        let capacity = self.storage.len();
        if needed <= capacity {
            return;
        }
        let target = needed
            .max(capacity.saturating_mul(2))
            .max(MIN_RESERVE_BYTES);
        trace!(from = capacity, to = target, "growing bit buffer");
        self.storage.resize(target, 0);
    }

    /// Copy bits into storage at the write cursor. Capacity must already
    /// cover the copy.
    fn put_bits(&mut self, source: &[u8], source_offset: usize, n_bits: usize) {
        copy_bits(source, source_offset, &mut self.storage, self.bits_written, n_bits);
        self.bits_written += n_bits;
    }
}

impl PartialEq for BitBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.bits_written == other.bits_written && self.as_bytes() == other.as_bytes()
    }
}

impl Eq for BitBuffer {}

/// Copy `n_bits` bits between byte slices at arbitrary bit offsets.
///
/// Whole bytes are block-copied when both offsets sit on a byte boundary.
pub(super) fn copy_bits(
    source: &[u8],
    source_offset: usize,
    target: &mut [u8],
    target_offset: usize,
    n_bits: usize,
) {
    let mut copied = 0;
    if source_offset % 8 == 0 && target_offset % 8 == 0 {
        let whole = n_bits / 8;
        let from = source_offset / 8;
        let to = target_offset / 8;
        target[to..to + whole].copy_from_slice(&source[from..from + whole]);
        copied = whole * 8;
    }
    for i in copied..n_bits {
        set_bit(target, target_offset + i, get_bit(source, source_offset + i));
    }
}

pub(super) fn get_bit(bytes: &[u8], index: usize) -> bool { (bytes[index / 8] >> (index % 8)) & 1 == 1 }

fn set_bit(bytes: &mut [u8], index: usize, value: bool) {
    let mask = 1_u8 << (index % 8);
    if value {
        bytes[index / 8] |= mask;
    } else {
        bytes[index / 8] &= !mask;
    }
}
