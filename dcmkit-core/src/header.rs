//! Data element headers: the `(tag, VR, length)` triple that precedes every
//! primitive value, sequence, or item in a DICOM stream.

use crate::length::Length;
use crate::tag::Tag;
use crate::vr::VR;

/// Access to the header fields shared by data elements and items.
pub trait Header {
    /// The element's tag.
    fn tag(&self) -> Tag;

    /// The element's value length, as stated on the wire. May be
    /// [`Length::UNDEFINED`] for sequences and encapsulated pixel data.
    fn length(&self) -> Length;

    /// Whether the length of this element is undefined, and thus requires
    /// a delimiter to determine where it ends.
    #[inline]
    fn is_undefined_length(&self) -> bool {
        self.length().is_undefined()
    }
}

/// The header of a primitive or sequence data element: a tag, a VR, and a
/// length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataElementHeader {
    /// The attribute tag.
    pub tag: Tag,
    /// The value representation.
    pub vr: VR,
    /// The length of the value that follows, in bytes.
    pub len: Length,
}

impl DataElementHeader {
    /// Construct a new data element header.
    pub fn new<T: Into<Length>>(tag: Tag, vr: VR, len: T) -> Self {
        DataElementHeader {
            tag,
            vr,
            len: len.into(),
        }
    }
}

impl Header for DataElementHeader {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    fn length(&self) -> Length {
        self.len
    }
}

/// The header of a sequence item, delimiter, or fragment: just a tag and a
/// length (items have no VR of their own).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader {
    /// The item's tag: one of [`Tag::ITEM`], [`Tag::ITEM_DELIMITATION`], or
    /// [`Tag::SEQUENCE_DELIMITATION`].
    pub tag: Tag,
    /// The item's declared length.
    pub len: Length,
}

impl ItemHeader {
    /// Construct a new item header.
    pub fn new<T: Into<Length>>(tag: Tag, len: T) -> Self {
        ItemHeader {
            tag,
            len: len.into(),
        }
    }
}

impl Header for ItemHeader {
    #[inline]
    fn tag(&self) -> Tag {
        self.tag
    }

    #[inline]
    fn length(&self) -> Length {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_header_reports_undefined_length() {
        let header = DataElementHeader::new(Tag(0x0008, 0x0000), VR::SQ, Length::UNDEFINED);
        assert!(header.is_undefined_length());
        assert_eq!(header.tag(), Tag(0x0008, 0x0000));
    }

    #[test]
    fn item_header_from_concrete_length() {
        let header = ItemHeader::new(Tag::ITEM, 10u32);
        assert_eq!(header.length().get(), Some(10));
    }
}
