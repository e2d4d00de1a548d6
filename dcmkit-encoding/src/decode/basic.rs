//! Endianness-aware reads of the fixed-width primitives that make up
//! every DICOM header field: tags, lengths, and numeric value types.

use std::io::Read;

use byteordered::Endianness as ByteOrder;
use dcmkit_core::tag::Tag;
use snafu::ResultExt;

use crate::error::{self, Result};
use crate::transfer_syntax::Endianness;

/// Reads fixed-width primitives from a byte stream under a fixed
/// endianness. This is the lowest-level decoding facility in the crate;
/// header and value decoders for specific transfer syntaxes are built on
/// top of it.
#[derive(Debug, Clone, Copy)]
pub struct BasicDecoder(ByteOrder);

impl BasicDecoder {
    /// Construct a decoder for the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        BasicDecoder(endianness.to_byteordered())
    }

    /// The byte order this decoder reads under.
    pub fn endianness(self) -> Endianness {
        match self.0 {
            ByteOrder::Little => Endianness::Little,
            ByteOrder::Big => Endianness::Big,
        }
    }

    /// Read a tag: a group number followed by an element number, each a
    /// 16-bit unsigned integer.
    pub fn decode_tag<R: Read + ?Sized>(self, source: &mut R) -> Result<Tag> {
        let group = self.decode_us(source)?;
        let element = self.decode_us(source)?;
        Ok(Tag(group, element))
    }

    /// Read an unsigned 16-bit integer.
    pub fn decode_us<R: Read + ?Sized>(self, source: &mut R) -> Result<u16> {
        let mut buf = [0u8; 2];
        source.read_exact(&mut buf).context(error::TruncatedSnafu { field: "US" })?;
        Ok(match self.0 {
            ByteOrder::Little => u16::from_le_bytes(buf),
            ByteOrder::Big => u16::from_be_bytes(buf),
        })
    }

    /// Read a signed 16-bit integer.
    pub fn decode_ss<R: Read + ?Sized>(self, source: &mut R) -> Result<i16> {
        Ok(self.decode_us(source)? as i16)
    }

    /// Read an unsigned 32-bit integer.
    pub fn decode_ul<R: Read + ?Sized>(self, source: &mut R) -> Result<u32> {
        let mut buf = [0u8; 4];
        source.read_exact(&mut buf).context(error::TruncatedSnafu { field: "UL" })?;
        Ok(match self.0 {
            ByteOrder::Little => u32::from_le_bytes(buf),
            ByteOrder::Big => u32::from_be_bytes(buf),
        })
    }

    /// Read a signed 32-bit integer.
    pub fn decode_sl<R: Read + ?Sized>(self, source: &mut R) -> Result<i32> {
        Ok(self.decode_ul(source)? as i32)
    }

    /// Read a single-precision IEEE 754 float.
    pub fn decode_fl<R: Read + ?Sized>(self, source: &mut R) -> Result<f32> {
        Ok(f32::from_bits(self.decode_ul(source)?))
    }

    /// Read a double-precision IEEE 754 float.
    pub fn decode_fd<R: Read + ?Sized>(self, source: &mut R) -> Result<f64> {
        let mut buf = [0u8; 8];
        source.read_exact(&mut buf).context(error::TruncatedSnafu { field: "FD" })?;
        Ok(match self.0 {
            ByteOrder::Little => f64::from_le_bytes(buf),
            ByteOrder::Big => f64::from_be_bytes(buf),
        })
    }

    /// Read `count` unsigned 16-bit integers.
    pub fn decode_us_into<R: Read + ?Sized>(self, source: &mut R, out: &mut Vec<u16>, count: usize) -> Result<()> {
        out.reserve(count);
        for _ in 0..count {
            out.push(self.decode_us(source)?);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_u16_round_trip() {
        let decoder = BasicDecoder::new(Endianness::Little);
        let mut cursor: &[u8] = &[0x10, 0x00];
        assert_eq!(decoder.decode_us(&mut cursor).unwrap(), 0x0010);
    }

    #[test]
    fn big_endian_u16_differs_from_little() {
        let decoder = BasicDecoder::new(Endianness::Big);
        let mut cursor: &[u8] = &[0x10, 0x00];
        assert_eq!(decoder.decode_us(&mut cursor).unwrap(), 0x1000);
    }

    #[test]
    fn tag_reads_group_then_element() {
        let decoder = BasicDecoder::new(Endianness::Little);
        let mut cursor: &[u8] = &[0x08, 0x00, 0x18, 0x00];
        assert_eq!(decoder.decode_tag(&mut cursor).unwrap(), Tag(0x0008, 0x0018));
    }

    #[test]
    fn truncated_input_is_an_error() {
        let decoder = BasicDecoder::new(Endianness::Little);
        let mut cursor: &[u8] = &[0x01];
        assert!(decoder.decode_us(&mut cursor).is_err());
    }
}
