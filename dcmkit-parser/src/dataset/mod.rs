//! The token-stream view of a data set: a sequence of [`DataToken`]s
//! produced by [`read::DataSetReader`], decoupled from how a consumer
//! chooses to assemble them into an object tree.

pub mod read;

use dcmkit_core::header::DataElementHeader;
use dcmkit_core::length::Length;
use dcmkit_core::tag::Tag;
use dcmkit_core::value::primitive::C;
use dcmkit_core::PrimitiveValue;

pub use read::DataSetReader;

/// One token of a data set's flattened structure.
///
/// A primitive element is `ElementHeader` followed by exactly one
/// `PrimitiveValue`. A sequence is `SequenceStart`, zero or more items
/// (each `ItemStart`, nested tokens, `ItemEnd`), then `SequenceEnd`.
/// Encapsulated pixel data is `PixelSequenceStart`, an `OffsetTable`,
/// zero or more `ItemStart`/`ItemValue`/`ItemEnd` fragments, then
/// `SequenceEnd`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataToken {
    /// The header of an upcoming primitive or sequence element.
    ElementHeader(DataElementHeader),
    /// A primitive value, immediately following its `ElementHeader`.
    PrimitiveValue(PrimitiveValue),
    /// The start of a sequence of items.
    SequenceStart {
        /// The sequence's tag.
        tag: Tag,
        /// The sequence's declared length (may be undefined).
        len: Length,
    },
    /// The end of a sequence, whether reached by a sequence delimiter or
    /// by exhausting a definite length.
    SequenceEnd,
    /// The start of encapsulated pixel data, always of undefined length.
    PixelSequenceStart,
    /// The basic offset table: the first item of a pixel sequence.
    OffsetTable(C<u32>),
    /// The start of an item, within a sequence or pixel sequence.
    ItemStart {
        /// The item's declared length (may be undefined, for items of a
        /// regular sequence; pixel data fragments always have a defined
        /// length).
        len: Length,
    },
    /// A pixel data fragment's raw bytes, in place of nested tokens.
    ItemValue(Vec<u8>),
    /// The end of an item, whether reached by an item delimiter or by
    /// exhausting a definite length.
    ItemEnd,
}
