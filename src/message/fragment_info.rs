use super::FragmentIndex;

/// Position of a fragment within an oversized message.
///
/// The owning message's sequence id ties fragments together; this type only
/// records where the slice sits and whether it closes the message.
///
/// # Examples
///
/// ```
/// use bitframe::message::{FragmentIndex, FragmentInfo};
/// let info = FragmentInfo::new(FragmentIndex::new(2), true);
/// assert_eq!(info.index().get(), 2);
/// assert!(info.is_final());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FragmentInfo {
    index: FragmentIndex,
    is_final: bool,
}

impl FragmentInfo {
    /// Describe a fragment.
    #[must_use]
    pub const fn new(index: FragmentIndex, is_final: bool) -> Self { Self { index, is_final } }

    /// Fragment position relative to the message.
    #[must_use]
    pub const fn index(&self) -> FragmentIndex { self.index }

    /// Whether this is the last fragment of its message.
    #[must_use]
    pub const fn is_final(&self) -> bool { self.is_final }
}
