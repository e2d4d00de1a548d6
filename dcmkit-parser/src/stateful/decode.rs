//! Header and value decoding bound to one transfer syntax.

use std::io::Read;

use dcmkit_core::dictionary::DataDictionary;
use dcmkit_core::header::{DataElementHeader, Header, ItemHeader};
use dcmkit_core::tag::Tag;
use dcmkit_core::value::primitive::C;
use dcmkit_core::vr::{ElementWidth, Padding, VR};
use dcmkit_core::PrimitiveValue;
use dcmkit_encoding::decode::basic::BasicDecoder;
use dcmkit_encoding::Decode;
use dcmkit_transfer_syntax::AnyDecoder;

use crate::error::{self, Result};

/// VRs whose text value is a backslash-separated list of values rather
/// than one opaque string.
fn splits_on_backslash(vr: VR) -> bool {
    matches!(
        vr,
        VR::AE
            | VR::AS
            | VR::CS
            | VR::DA
            | VR::DS
            | VR::DT
            | VR::IS
            | VR::LO
            | VR::PN
            | VR::SH
            | VR::TM
            | VR::UI
            | VR::UC
    )
}

/// Decodes element headers and values for a specific transfer syntax,
/// using `D` to recover VRs under Implicit VR encoding.
pub struct StatefulDecoder<R, D> {
    source: super::CountingReader<R>,
    decoder: AnyDecoder,
    basic: BasicDecoder,
    dict: D,
}

impl<R: Read, D: DataDictionary> StatefulDecoder<R, D> {
    /// Construct a decoder reading from `source` under the structural
    /// encoding and byte order described by `decoder`.
    pub fn new(source: R, decoder: AnyDecoder, dict: D) -> Self {
        let basic = BasicDecoder::new(decoder.endianness());
        StatefulDecoder {
            source: super::CountingReader::new(source),
            decoder,
            basic,
            dict,
        }
    }

    /// The number of bytes consumed from the source so far.
    pub fn bytes_read(&self) -> u64 {
        self.source.position()
    }

    /// Decode the next data element header (which may, in fact, be an
    /// item or sequence delimiter: see [`Tag::ITEM_DELIMITATION`] and
    /// [`Tag::SEQUENCE_DELIMITATION`]).
    pub fn decode_header(&mut self) -> Result<DataElementHeader> {
        self.decoder
            .decode_header(&mut self.source, &self.dict)
            .map_err(Into::into)
    }

    /// Decode an item header, expected directly inside a sequence (never
    /// a plain data element).
    pub fn decode_item_header(&mut self) -> Result<ItemHeader> {
        self.decoder
            .decode_item_header(&mut self.source)
            .map_err(Into::into)
    }

    /// Read `len` raw bytes without interpreting them, used for pixel
    /// data fragments and the basic offset table.
    pub fn read_bytes(&mut self, tag: Tag, len: u32) -> Result<Vec<u8>> {
        let offset = self.bytes_read();
        let mut buf = vec![0u8; len as usize];
        self.source.read_exact(&mut buf).map_err(|source| {
            if source.kind() == std::io::ErrorKind::UnexpectedEof {
                error::Error::Truncated { tag, offset }
            } else {
                error::Error::Io { context: "value bytes", source }
            }
        })?;
        Ok(buf)
    }

    /// Check that a fixed-width value's declared length is an exact
    /// multiple of the element width, returning the element count.
    fn fixed_count(header: &DataElementHeader, len: u32, width: u32) -> Result<usize> {
        if len % width != 0 {
            return Err(error::Error::Decode {
                source: dcmkit_encoding::Error::MalformedValue {
                    vr: header.vr.to_str(),
                    reason: format!("length {len} is not a multiple of {width}"),
                },
            });
        }
        Ok((len / width) as usize)
    }

    /// Read and interpret a primitive value of `len` bytes under
    /// `header`'s VR.
    pub fn read_value(&mut self, header: DataElementHeader) -> Result<PrimitiveValue> {
        let len = header.length().get().unwrap_or(0);
        if len == 0 {
            return Ok(PrimitiveValue::Empty);
        }

        match header.vr.info().width {
            ElementWidth::Fixed(1) => {
                let bytes = self.read_bytes(header.tag, len)?;
                Ok(PrimitiveValue::U8(C::from_vec(bytes)))
            }
            ElementWidth::Fixed(2) if header.vr == VR::AT => {
                let count = Self::fixed_count(&header, len, 4)?;
                let mut tags = C::with_capacity(count);
                for _ in 0..count {
                    tags.push(self.basic.decode_tag(&mut self.source)?);
                }
                Ok(PrimitiveValue::Tags(tags))
            }
            ElementWidth::Fixed(2) if header.vr == VR::SS => {
                let count = Self::fixed_count(&header, len, 2)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_ss(&mut self.source)?);
                }
                Ok(PrimitiveValue::I16(values))
            }
            ElementWidth::Fixed(2) => {
                let count = Self::fixed_count(&header, len, 2)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_us(&mut self.source)?);
                }
                Ok(PrimitiveValue::U16(values))
            }
            ElementWidth::Fixed(4) if header.vr == VR::FL => {
                let count = Self::fixed_count(&header, len, 4)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_fl(&mut self.source)?);
                }
                Ok(PrimitiveValue::F32(values))
            }
            ElementWidth::Fixed(4) if header.vr == VR::SL => {
                let count = Self::fixed_count(&header, len, 4)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_sl(&mut self.source)?);
                }
                Ok(PrimitiveValue::I32(values))
            }
            ElementWidth::Fixed(4) => {
                let count = Self::fixed_count(&header, len, 4)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_ul(&mut self.source)?);
                }
                Ok(PrimitiveValue::U32(values))
            }
            ElementWidth::Fixed(8) => {
                let count = Self::fixed_count(&header, len, 8)?;
                let mut values = C::with_capacity(count);
                for _ in 0..count {
                    values.push(self.basic.decode_fd(&mut self.source)?);
                }
                Ok(PrimitiveValue::F64(values))
            }
            ElementWidth::Fixed(_) => unreachable!("registry only defines 1/2/4/8-byte widths"),
            ElementWidth::Text => {
                let bytes = self.read_bytes(header.tag, len)?;
                Ok(decode_text(header.vr, &bytes))
            }
        }
    }
}

fn decode_text(vr: VR, bytes: &[u8]) -> PrimitiveValue {
    let trimmed = match vr.info().padding {
        Padding::Space => trim_trailing(bytes, b' '),
        Padding::Nul => trim_trailing(bytes, b'\0'),
        Padding::None => bytes,
    };
    let text = String::from_utf8_lossy(trimmed);

    if splits_on_backslash(vr) {
        let values: C<String> = text.split('\\').map(|s| s.to_string()).collect();
        PrimitiveValue::Strs(values)
    } else {
        PrimitiveValue::Str(text.into_owned())
    }
}

fn trim_trailing(bytes: &[u8], pad: u8) -> &[u8] {
    match bytes.last() {
        Some(&b) if b == pad => &bytes[..bytes.len() - 1],
        _ => bytes,
    }
}

/// Whether a tag is one of the three structural delimiters (item start,
/// item end, sequence end).
pub fn is_delimiter(tag: Tag) -> bool {
    tag == Tag::ITEM || tag == Tag::ITEM_DELIMITATION || tag == Tag::SEQUENCE_DELIMITATION
}

#[cfg(test)]
mod tests {
    use dcmkit_core::length::Length;
    use dcmkit_core::tag::Tag;
    use dcmkit_dictionary::STANDARD;
    use dcmkit_transfer_syntax::Codec;

    use super::*;

    #[test]
    fn reads_multi_valued_string() {
        let bytes: &[u8] = b"A\\B ";
        let decoder = Codec::ExplicitVRLittleEndian.decoder();
        let mut stateful = StatefulDecoder::new(bytes, decoder, &*STANDARD);
        let header = DataElementHeader::new(Tag(0x0008, 0x0060), VR::CS, 4u32);
        let value = stateful.read_value(header).unwrap();
        assert_eq!(value, PrimitiveValue::Strs(C::from_vec(vec!["A".into(), "B".into()])));
    }

    #[test]
    fn reads_ui_and_trims_nul() {
        let bytes: &[u8] = b"1.2.3\0";
        let decoder = Codec::ExplicitVRLittleEndian.decoder();
        let mut stateful = StatefulDecoder::new(bytes, decoder, &*STANDARD);
        let header = DataElementHeader::new(Tag(0x0008, 0x0018), VR::UI, 6u32);
        let value = stateful.read_value(header).unwrap();
        assert_eq!(value, PrimitiveValue::Strs(C::from_vec(vec!["1.2.3".into()])));
    }

    #[test]
    fn reads_unsigned_short_array() {
        let bytes: &[u8] = &[0x02, 0x00, 0x03, 0x00];
        let decoder = Codec::ExplicitVRLittleEndian.decoder();
        let mut stateful = StatefulDecoder::new(bytes, decoder, &*STANDARD);
        let header = DataElementHeader::new(Tag(0x0028, 0x0010), VR::US, 4u32);
        let value = stateful.read_value(header).unwrap();
        assert_eq!(value, PrimitiveValue::U16(C::from_vec(vec![2, 3])));
    }

    #[test]
    fn zero_length_is_empty() {
        let bytes: &[u8] = &[];
        let decoder = Codec::ExplicitVRLittleEndian.decoder();
        let mut stateful = StatefulDecoder::new(bytes, decoder, &*STANDARD);
        let header = DataElementHeader::new(Tag(0x0008, 0x0050), VR::SH, Length::new(0));
        let value = stateful.read_value(header).unwrap();
        assert_eq!(value, PrimitiveValue::Empty);
    }
}
