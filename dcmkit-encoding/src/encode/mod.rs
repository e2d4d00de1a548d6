//! Element header encoding, mirroring [`crate::decode`].

pub mod basic;
pub mod explicit;
pub mod implicit;

use std::io::Write;

use dcmkit_core::header::{DataElementHeader, ItemHeader};

use crate::error::Result;
use crate::transfer_syntax::Endianness;

pub use basic::BasicEncoder;
pub use explicit::ExplicitVREncoder;
pub use implicit::ImplicitVREncoder;

/// Encodes data element and item headers for a specific transfer syntax.
pub trait Encode {
    /// Encode a data element header, including its VR if the encoding
    /// calls for one.
    fn encode_header<W: Write + ?Sized>(&self, sink: &mut W, header: DataElementHeader) -> Result<()>;

    /// Encode an item, item-delimitation, or sequence-delimitation
    /// header.
    fn encode_item_header<W: Write + ?Sized>(&self, sink: &mut W, header: ItemHeader) -> Result<()>;

    /// The byte order this encoder writes under.
    fn endianness(&self) -> Endianness;
}
