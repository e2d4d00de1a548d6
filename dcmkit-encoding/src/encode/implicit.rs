//! Implicit VR Little Endian header encoding: the VR is never written.

use std::io::Write;

use dcmkit_core::header::{DataElementHeader, ItemHeader};

use super::{basic::BasicEncoder, Encode};
use crate::error::Result;
use crate::transfer_syntax::Endianness;

/// Encodes headers under Implicit VR Little Endian.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitVREncoder {
    basic: BasicEncoder,
}

impl ImplicitVREncoder {
    /// Construct an encoder for Implicit VR Little Endian.
    pub fn new() -> Self {
        ImplicitVREncoder {
            basic: BasicEncoder::new(Endianness::Little),
        }
    }
}

impl Default for ImplicitVREncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encode for ImplicitVREncoder {
    fn encode_header<W: Write + ?Sized>(&self, sink: &mut W, header: DataElementHeader) -> Result<()> {
        self.basic.encode_tag(sink, header.tag)?;
        self.basic.encode_ul(sink, header.len.get().unwrap_or(u32::MAX))
    }

    fn encode_item_header<W: Write + ?Sized>(&self, sink: &mut W, header: ItemHeader) -> Result<()> {
        self.basic.encode_tag(sink, header.tag)?;
        self.basic.encode_ul(sink, header.len.get().unwrap_or(u32::MAX))
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }
}

#[cfg(test)]
mod tests {
    use dcmkit_core::tag::Tag;
    use dcmkit_core::vr::VR;

    use super::*;

    #[test]
    fn no_vr_is_written() {
        let encoder = ImplicitVREncoder::new();
        let mut buf = Vec::new();
        let header = DataElementHeader::new(Tag(0x0010, 0x0010), VR::PN, 4u32);
        encoder.encode_header(&mut buf, header).unwrap();
        assert_eq!(buf, vec![0x10, 0x00, 0x10, 0x00, 0x04, 0x00, 0x00, 0x00]);
    }
}
