//! The DICOM attribute tag.

use std::fmt;

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// A DICOM attribute tag, the `(group, element)` identifier of a data
/// element.
///
/// Tags are stored here in host integer form; their wire serialization
/// depends on the transfer syntax's endianness (see
/// [`Endianness`](crate::transfer_syntax::Endianness)).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// The item tag, (FFFE,E000), introducing an item in a sequence.
    pub const ITEM: Tag = Tag(0xFFFE, 0xE000);
    /// The item delimitation tag, (FFFE,E00D), ending an item of undefined
    /// length.
    pub const ITEM_DELIMITATION: Tag = Tag(0xFFFE, 0xE00D);
    /// The sequence delimitation tag, (FFFE,E0DD), ending a sequence of
    /// undefined length.
    pub const SEQUENCE_DELIMITATION: Tag = Tag(0xFFFE, 0xE0DD);

    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Whether this tag is a "group length" pseudo-element, (gggg,0000).
    #[inline]
    pub fn is_group_length(self) -> bool {
        self.1 == 0x0000
    }

    /// Whether this tag is a private creator placeholder: an odd group
    /// with element in `0010..=00FF`.
    #[inline]
    pub fn is_private_creator(self) -> bool {
        self.0 % 2 == 1 && (0x0010..=0x00FF).contains(&self.1)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X}, {:#06X})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_and_element() {
        let tag = Tag(0x0010, 0x0010);
        assert_eq!(tag.group(), 0x0010);
        assert_eq!(tag.element(), 0x0010);
    }

    #[test]
    fn ordering_is_group_then_element() {
        assert!(Tag(0x0008, 0xFFFF) < Tag(0x0010, 0x0000));
        assert!(Tag(0x0010, 0x0010) < Tag(0x0010, 0x0020));
    }

    #[test]
    fn delimiters_are_distinct() {
        assert_ne!(Tag::ITEM_DELIMITATION, Tag::SEQUENCE_DELIMITATION);
    }

    #[test]
    fn private_creator_detection() {
        assert!(Tag(0x0009, 0x0010).is_private_creator());
        assert!(!Tag(0x0008, 0x0010).is_private_creator());
        assert!(!Tag(0x0009, 0x0100).is_private_creator());
    }
}
