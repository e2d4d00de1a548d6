//! Implicit VR Little Endian header decoding: every header is a tag
//! followed by a 4-byte length, with the VR recovered from the data
//! dictionary (falling back to `UN` for unrecognized tags).

use std::io::Read;

use dcmkit_core::dictionary::DataDictionary;
use dcmkit_core::header::{DataElementHeader, ItemHeader};
use dcmkit_core::length::Length;
use dcmkit_core::vr::VR;

use super::{basic::BasicDecoder, Decode};
use crate::error::Result;
use crate::transfer_syntax::Endianness;

/// Decodes headers under Implicit VR Little Endian.
#[derive(Debug, Clone, Copy)]
pub struct ImplicitVRDecoder {
    basic: BasicDecoder,
}

impl ImplicitVRDecoder {
    /// Construct a decoder for Implicit VR Little Endian.
    pub fn new() -> Self {
        ImplicitVRDecoder {
            basic: BasicDecoder::new(Endianness::Little),
        }
    }
}

impl Default for ImplicitVRDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decode for ImplicitVRDecoder {
    fn decode_header<R, D>(&self, source: &mut R, dict: &D) -> Result<DataElementHeader>
    where
        R: Read + ?Sized,
        D: DataDictionary,
    {
        let tag = self.basic.decode_tag(source)?;
        let len = self.basic.decode_ul(source)?;

        if super::is_delimiter(tag) {
            return Ok(DataElementHeader::new(tag, VR::UN, Length::new(len)));
        }

        let vr = if tag.is_group_length() {
            VR::UL
        } else {
            dict.vr_of(tag)
        };
        Ok(DataElementHeader::new(tag, vr, Length::new(len)))
    }

    fn decode_item_header<R: Read + ?Sized>(&self, source: &mut R) -> Result<ItemHeader> {
        let tag = self.basic.decode_tag(source)?;
        let len = self.basic.decode_ul(source)?;
        Ok(ItemHeader::new(tag, Length::new(len)))
    }

    fn endianness(&self) -> Endianness {
        Endianness::Little
    }
}

#[cfg(test)]
mod tests {
    use dcmkit_core::header::Header;
    use dcmkit_core::tag::Tag;

    use super::*;

    struct FakeEntry;
    impl dcmkit_core::dictionary::DictionaryEntry for FakeEntry {
        fn keyword(&self) -> &str {
            "PatientName"
        }
        fn vr(&self) -> VR {
            VR::PN
        }
    }

    struct FakeDict;
    impl DataDictionary for FakeDict {
        type Entry = FakeEntry;
        fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
            if tag == Tag(0x0010, 0x0010) {
                Some(&FakeEntry)
            } else {
                None
            }
        }
        fn by_name(&self, _: &str) -> Option<&Self::Entry> {
            None
        }
    }

    #[test]
    fn recovers_vr_from_dictionary() {
        let decoder = ImplicitVRDecoder::new();
        let mut cursor: &[u8] = &[0x10, 0x00, 0x10, 0x00, 0x04, 0x00, 0x00, 0x00];
        let header = decoder.decode_header(&mut cursor, &FakeDict).unwrap();
        assert_eq!(header.vr, VR::PN);
        assert_eq!(header.length().get(), Some(4));
    }

    #[test]
    fn unknown_tag_falls_back_to_un() {
        let decoder = ImplicitVRDecoder::new();
        let mut cursor: &[u8] = &[0x09, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00];
        let header = decoder.decode_header(&mut cursor, &FakeDict).unwrap();
        assert_eq!(header.vr, VR::UN);
    }
}
