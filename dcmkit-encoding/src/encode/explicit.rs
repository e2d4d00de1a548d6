//! Explicit VR header encoding.

use std::io::Write;

use dcmkit_core::header::{DataElementHeader, ItemHeader};
use snafu::ResultExt;

use super::{basic::BasicEncoder, Encode};
use crate::error::{self, Result};
use crate::transfer_syntax::Endianness;

/// Encodes headers under Explicit VR Little or Big Endian.
#[derive(Debug, Clone, Copy)]
pub struct ExplicitVREncoder {
    basic: BasicEncoder,
}

impl ExplicitVREncoder {
    /// Construct an encoder for Explicit VR under the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        ExplicitVREncoder {
            basic: BasicEncoder::new(endianness),
        }
    }
}

impl Encode for ExplicitVREncoder {
    fn encode_header<W: Write + ?Sized>(&self, sink: &mut W, header: DataElementHeader) -> Result<()> {
        self.basic.encode_tag(sink, header.tag)?;
        sink.write_all(&header.vr.to_bytes())
            .context(error::WriteSnafu { field: "VR" })?;

        if header.vr.has_long_length() {
            sink.write_all(&[0u8, 0u8])
                .context(error::WriteSnafu { field: "reserved" })?;
            let len = header.len.get().unwrap_or(u32::MAX);
            self.basic.encode_ul(sink, len)
        } else {
            let len = header.len.get().unwrap_or(0xFFFF) as u16;
            self.basic.encode_us(sink, len)
        }
    }

    fn encode_item_header<W: Write + ?Sized>(&self, sink: &mut W, header: ItemHeader) -> Result<()> {
        self.basic.encode_tag(sink, header.tag)?;
        self.basic.encode_ul(sink, header.len.get().unwrap_or(u32::MAX))
    }

    fn endianness(&self) -> Endianness {
        self.basic.endianness()
    }
}

#[cfg(test)]
mod tests {
    use dcmkit_core::length::Length;
    use dcmkit_core::tag::Tag;
    use dcmkit_core::vr::VR;

    use super::*;

    #[test]
    fn short_length_vr_writes_two_byte_length() {
        let encoder = ExplicitVREncoder::new(Endianness::Little);
        let mut buf = Vec::new();
        let header = DataElementHeader::new(Tag(0x0008, 0x0018), VR::UI, 2u32);
        encoder.encode_header(&mut buf, header).unwrap();
        assert_eq!(buf, vec![0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x02, 0x00]);
    }

    #[test]
    fn long_length_vr_writes_reserved_bytes() {
        let encoder = ExplicitVREncoder::new(Endianness::Little);
        let mut buf = Vec::new();
        let header = DataElementHeader::new(Tag(0x7FE0, 0x0010), VR::OB, Length::UNDEFINED);
        encoder.encode_header(&mut buf, header).unwrap();
        assert_eq!(buf.len(), 12);
        assert_eq!(&buf[6..8], &[0, 0]);
        assert_eq!(&buf[8..12], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }
}
