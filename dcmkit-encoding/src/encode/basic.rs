//! Endianness-aware writes of fixed-width primitives, the write-side
//! counterpart of [`crate::decode::basic`].

use std::io::Write;

use byteordered::Endianness as ByteOrder;
use dcmkit_core::tag::Tag;
use snafu::ResultExt;

use crate::error::{self, Result};
use crate::transfer_syntax::Endianness;

/// Writes fixed-width primitives to a byte sink under a fixed
/// endianness.
#[derive(Debug, Clone, Copy)]
pub struct BasicEncoder(ByteOrder);

impl BasicEncoder {
    /// Construct an encoder for the given byte order.
    pub fn new(endianness: Endianness) -> Self {
        BasicEncoder(endianness.to_byteordered())
    }

    /// The byte order this encoder writes under.
    pub fn endianness(self) -> Endianness {
        match self.0 {
            ByteOrder::Little => Endianness::Little,
            ByteOrder::Big => Endianness::Big,
        }
    }

    /// Write a tag as its group then element number.
    pub fn encode_tag<W: Write + ?Sized>(self, sink: &mut W, tag: Tag) -> Result<()> {
        self.encode_us(sink, tag.group())?;
        self.encode_us(sink, tag.element())
    }

    /// Write an unsigned 16-bit integer.
    pub fn encode_us<W: Write + ?Sized>(self, sink: &mut W, value: u16) -> Result<()> {
        let buf = match self.0 {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        sink.write_all(&buf).context(error::WriteSnafu { field: "US" })
    }

    /// Write an unsigned 32-bit integer.
    pub fn encode_ul<W: Write + ?Sized>(self, sink: &mut W, value: u32) -> Result<()> {
        let buf = match self.0 {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        sink.write_all(&buf).context(error::WriteSnafu { field: "UL" })
    }

    /// Write a signed 32-bit integer.
    pub fn encode_sl<W: Write + ?Sized>(self, sink: &mut W, value: i32) -> Result<()> {
        self.encode_ul(sink, value as u32)
    }

    /// Write a single-precision float.
    pub fn encode_fl<W: Write + ?Sized>(self, sink: &mut W, value: f32) -> Result<()> {
        self.encode_ul(sink, value.to_bits())
    }

    /// Write a double-precision float.
    pub fn encode_fd<W: Write + ?Sized>(self, sink: &mut W, value: f64) -> Result<()> {
        let buf = match self.0 {
            ByteOrder::Little => value.to_le_bytes(),
            ByteOrder::Big => value.to_be_bytes(),
        };
        sink.write_all(&buf).context(error::WriteSnafu { field: "FD" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_u16_round_trips_with_decoder() {
        let encoder = BasicEncoder::new(Endianness::Little);
        let mut buf = Vec::new();
        encoder.encode_us(&mut buf, 0x0010).unwrap();
        assert_eq!(buf, vec![0x10, 0x00]);
    }

    #[test]
    fn tag_encodes_group_then_element() {
        let encoder = BasicEncoder::new(Endianness::Little);
        let mut buf = Vec::new();
        encoder.encode_tag(&mut buf, Tag(0x0008, 0x0018)).unwrap();
        assert_eq!(buf, vec![0x08, 0x00, 0x18, 0x00]);
    }
}
