//! Element header decoding for each structural encoding family:
//! Explicit VR and Implicit VR, in either byte order.

pub mod basic;
pub mod explicit;
pub mod implicit;

use std::io::Read;

use dcmkit_core::dictionary::DataDictionary;
use dcmkit_core::header::{DataElementHeader, ItemHeader};
use dcmkit_core::tag::Tag;

use crate::error::Result;
use crate::transfer_syntax::Endianness;

pub use basic::BasicDecoder;
pub use explicit::ExplicitVRDecoder;
pub use implicit::ImplicitVRDecoder;

/// Decodes data element and item headers from a transfer-syntax-specific
/// byte stream.
///
/// Implicit VR decoders need a [`DataDictionary`] to recover each
/// element's VR; explicit VR decoders read it straight off the wire and
/// ignore the dictionary argument (it is still threaded through so that
/// callers can be generic over either).
pub trait Decode {
    /// Decode the next data element header.
    fn decode_header<R, D>(&self, source: &mut R, dict: &D) -> Result<DataElementHeader>
    where
        R: Read + ?Sized,
        D: DataDictionary;

    /// Decode an item, item-delimitation, or sequence-delimitation
    /// header: just a tag and a length, no VR.
    fn decode_item_header<R: Read + ?Sized>(&self, source: &mut R) -> Result<ItemHeader>;

    /// The byte order this decoder reads under.
    fn endianness(&self) -> Endianness;
}

pub(crate) fn is_delimiter(tag: Tag) -> bool {
    tag == Tag::ITEM || tag == Tag::ITEM_DELIMITATION || tag == Tag::SEQUENCE_DELIMITATION
}
