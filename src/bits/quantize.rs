//! Fixed-range integer quantization.
//!
//! A quantized field stores `value - min` using the fewest bits able to
//! represent `max - min`, so both peers derive the width from the range alone.

use super::BitError;

/// Inclusive `[min, max]` range describing a quantized header field.
///
/// # Examples
///
/// ```
/// use bitframe::bits::QuantizedRange;
/// let range = QuantizedRange::new(0, 255);
/// assert_eq!(range.bits(), 8);
/// assert_eq!(QuantizedRange::new(10, 10).bits(), 0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuantizedRange {
    min: u64,
    max: u64,
}

impl QuantizedRange {
    /// Create a range.
    ///
    /// # Panics
    ///
    /// Panics if `min > max`. Ranges are protocol constants, so this fires at
    /// compile time when used in a `const` item.
    #[must_use]
    pub const fn new(min: u64, max: u64) -> Self {
        assert!(min <= max, "quantized range must satisfy min <= max");
        Self { min, max }
    }

    /// Lower bound of the range.
    #[must_use]
    pub const fn min(self) -> u64 { self.min }

    /// Upper bound of the range.
    #[must_use]
    pub const fn max(self) -> u64 { self.max }

    /// Number of bits needed to encode any value in the range.
    #[must_use]
    pub const fn bits(self) -> usize { bits_required(self.max - self.min) }

    /// Whether `value` lies within the range.
    #[must_use]
    pub const fn contains(self, value: u64) -> bool { value >= self.min && value <= self.max }

    /// Map `value` to its offset from `min`.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::OutOfRange`] when `value` lies outside the range.
    pub fn offset_of(self, value: u64) -> Result<u64, BitError> {
        if self.contains(value) {
            Ok(value - self.min)
        } else {
            Err(self.out_of_range(value))
        }
    }

    /// Map a decoded offset back to its value.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::OutOfRange`] when the offset lands beyond `max`,
    /// which happens when the span is not a power of two and the wire carried
    /// garbage.
    pub fn value_of(self, offset: u64) -> Result<u64, BitError> {
        match self.min.checked_add(offset) {
            Some(value) if value <= self.max => Ok(value),
            _ => Err(self.out_of_range(self.min.saturating_add(offset))),
        }
    }

    fn out_of_range(self, value: u64) -> BitError {
        BitError::OutOfRange {
            value,
            min: self.min,
            max: self.max,
        }
    }
}

/// Minimum number of bits needed to represent `span`.
#[must_use]
pub const fn bits_required(span: u64) -> usize { (u64::BITS - span.leading_zeros()) as usize }

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(255, 8)]
    #[case(256, 9)]
    #[case(524_287, 19)]
    #[case(u64::from(u32::MAX), 32)]
    #[case(u64::MAX, 64)]
    fn bits_required_matches_span(#[case] span: u64, #[case] expected: usize) {
        assert_eq!(bits_required(span), expected);
    }

    #[test]
    fn offsets_are_relative_to_min() {
        let range = QuantizedRange::new(100, 199);
        assert_eq!(range.bits(), 7);
        assert_eq!(range.offset_of(150), Ok(50));
        assert_eq!(range.value_of(50), Ok(150));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let range = QuantizedRange::new(100, 199);
        assert!(matches!(
            range.offset_of(99),
            Err(BitError::OutOfRange { value: 99, .. })
        ));
        assert!(matches!(
            range.value_of(127),
            Err(BitError::OutOfRange { value: 227, .. })
        ));
    }
}
