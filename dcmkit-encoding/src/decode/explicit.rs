//! Explicit VR header decoding: the VR code travels on the wire, so the
//! length field's width (16 vs 32 bits) is read off the VR registry
//! rather than recovered from a dictionary.

use std::io::Read;

use dcmkit_core::dictionary::DataDictionary;
use dcmkit_core::header::{DataElementHeader, ItemHeader};
use dcmkit_core::length::Length;
use dcmkit_core::vr::VR;
use snafu::ResultExt;

use super::{basic::BasicDecoder, Decode};
use crate::error::{self, Result};
use crate::transfer_syntax::Endianness;

/// Decodes headers under Explicit VR Little or Big Endian.
#[derive(Debug, Clone, Copy)]
pub struct ExplicitVRDecoder {
    basic: BasicDecoder,
}

impl ExplicitVRDecoder {
    /// Construct a decoder for Explicit VR under the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        ExplicitVRDecoder {
            basic: BasicDecoder::new(endianness),
        }
    }
}

impl Decode for ExplicitVRDecoder {
    fn decode_header<R, D>(&self, source: &mut R, _dict: &D) -> Result<DataElementHeader>
    where
        R: Read + ?Sized,
        D: DataDictionary,
    {
        let tag = self.basic.decode_tag(source)?;

        if super::is_delimiter(tag) {
            let len = self.basic.decode_ul(source)?;
            return Ok(DataElementHeader::new(tag, VR::UN, Length::new(len)));
        }

        let mut vr_code = [0u8; 2];
        source
            .read_exact(&mut vr_code)
            .context(error::TruncatedSnafu { field: "VR" })?;
        let vr = VR::from_binary(vr_code).unwrap_or_else(|| {
            tracing::warn!(
                tag = %tag,
                vr_code = %String::from_utf8_lossy(&vr_code),
                "unrecognized VR code, recovering as UN"
            );
            VR::UN
        });

        let len = if vr.has_long_length() {
            let mut reserved = [0u8; 2];
            source
                .read_exact(&mut reserved)
                .context(error::TruncatedSnafu { field: "reserved" })?;
            self.basic.decode_ul(source)?
        } else {
            u32::from(self.basic.decode_us(source)?)
        };

        Ok(DataElementHeader::new(tag, vr, Length::new(len)))
    }

    fn decode_item_header<R: Read + ?Sized>(&self, source: &mut R) -> Result<ItemHeader> {
        let tag = self.basic.decode_tag(source)?;
        let len = self.basic.decode_ul(source)?;
        Ok(ItemHeader::new(tag, Length::new(len)))
    }

    fn endianness(&self) -> Endianness {
        self.basic.endianness()
    }
}

#[cfg(test)]
mod tests {
    use dcmkit_core::header::Header;
    use dcmkit_core::tag::Tag;

    use super::*;

    struct NullEntry;
    impl dcmkit_core::dictionary::DictionaryEntry for NullEntry {
        fn keyword(&self) -> &str {
            "Unknown"
        }
        fn vr(&self) -> VR {
            VR::UN
        }
    }

    struct NullDict;
    impl DataDictionary for NullDict {
        type Entry = NullEntry;
        fn by_tag(&self, _: Tag) -> Option<&Self::Entry> {
            None
        }
        fn by_name(&self, _: &str) -> Option<&Self::Entry> {
            None
        }
    }

    #[test]
    fn short_length_vr_reads_two_byte_length() {
        let decoder = ExplicitVRDecoder::new(Endianness::Little);
        // (0008,0018) UI, length 2, empty-ish value bytes follow separately.
        let mut cursor: &[u8] = &[0x08, 0x00, 0x18, 0x00, b'U', b'I', 0x02, 0x00];
        let header = decoder.decode_header(&mut cursor, &NullDict).unwrap();
        assert_eq!(header.tag(), Tag(0x0008, 0x0018));
        assert_eq!(header.vr, VR::UI);
        assert_eq!(header.length().get(), Some(2));
    }

    #[test]
    fn long_length_vr_reads_reserved_then_four_byte_length() {
        let decoder = ExplicitVRDecoder::new(Endianness::Little);
        // (7FE0,0010) OB, reserved 0000, length 0xFFFFFFFF (undefined).
        let mut cursor: &[u8] = &[
            0xE0, 0x7F, 0x10, 0x00, b'O', b'B', 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF,
        ];
        let header = decoder.decode_header(&mut cursor, &NullDict).unwrap();
        assert_eq!(header.vr, VR::OB);
        assert!(header.is_undefined_length());
    }

    #[test]
    fn item_header_has_no_vr_field() {
        let decoder = ExplicitVRDecoder::new(Endianness::Little);
        let mut cursor: &[u8] = &[0xFE, 0xFF, 0x00, 0xE0, 0x08, 0x00, 0x00, 0x00];
        let header = decoder.decode_item_header(&mut cursor).unwrap();
        assert_eq!(header.tag, Tag::ITEM);
        assert_eq!(header.length().get(), Some(8));
    }
}
