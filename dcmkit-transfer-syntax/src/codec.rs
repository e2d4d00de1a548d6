//! A decoder/encoder pair selecting between the three structural
//! encodings, dispatched by hand since [`Decode`]/[`Encode`] have generic
//! methods and so cannot be made into trait objects.

use std::io::{Read, Write};

use dcmkit_core::dictionary::DataDictionary;
use dcmkit_core::header::{DataElementHeader, ItemHeader};
use dcmkit_encoding::decode::{ExplicitVRDecoder, ImplicitVRDecoder};
use dcmkit_encoding::encode::{ExplicitVREncoder, ImplicitVREncoder};
use dcmkit_encoding::{Decode, Encode, Endianness, Result};

/// Which of the three structural encodings a transfer syntax uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// Implicit VR Little Endian.
    ImplicitVRLittleEndian,
    /// Explicit VR Little Endian.
    ExplicitVRLittleEndian,
    /// Explicit VR Big Endian.
    ExplicitVRBigEndian,
}

impl Codec {
    /// Build the header decoder for this encoding.
    pub fn decoder(self) -> AnyDecoder {
        match self {
            Codec::ImplicitVRLittleEndian => AnyDecoder::Implicit(ImplicitVRDecoder::new()),
            Codec::ExplicitVRLittleEndian => {
                AnyDecoder::Explicit(ExplicitVRDecoder::new(Endianness::Little))
            }
            Codec::ExplicitVRBigEndian => {
                AnyDecoder::Explicit(ExplicitVRDecoder::new(Endianness::Big))
            }
        }
    }

    /// Build the header encoder for this encoding.
    pub fn encoder(self) -> AnyEncoder {
        match self {
            Codec::ImplicitVRLittleEndian => AnyEncoder::Implicit(ImplicitVREncoder::new()),
            Codec::ExplicitVRLittleEndian => {
                AnyEncoder::Explicit(ExplicitVREncoder::new(Endianness::Little))
            }
            Codec::ExplicitVRBigEndian => {
                AnyEncoder::Explicit(ExplicitVREncoder::new(Endianness::Big))
            }
        }
    }

    /// This encoding's byte order.
    pub fn endianness(self) -> Endianness {
        match self {
            Codec::ExplicitVRBigEndian => Endianness::Big,
            _ => Endianness::Little,
        }
    }
}

/// A header decoder for one of the three structural encodings.
#[derive(Debug, Clone, Copy)]
pub enum AnyDecoder {
    /// Implicit VR Little Endian.
    Implicit(ImplicitVRDecoder),
    /// Explicit VR, either byte order.
    Explicit(ExplicitVRDecoder),
}

impl Decode for AnyDecoder {
    fn decode_header<R, D>(&self, source: &mut R, dict: &D) -> Result<DataElementHeader>
    where
        R: Read + ?Sized,
        D: DataDictionary,
    {
        match self {
            AnyDecoder::Implicit(d) => d.decode_header(source, dict),
            AnyDecoder::Explicit(d) => d.decode_header(source, dict),
        }
    }

    fn decode_item_header<R: Read + ?Sized>(&self, source: &mut R) -> Result<ItemHeader> {
        match self {
            AnyDecoder::Implicit(d) => d.decode_item_header(source),
            AnyDecoder::Explicit(d) => d.decode_item_header(source),
        }
    }

    fn endianness(&self) -> Endianness {
        match self {
            AnyDecoder::Implicit(d) => d.endianness(),
            AnyDecoder::Explicit(d) => d.endianness(),
        }
    }
}

/// A header encoder for one of the three structural encodings.
#[derive(Debug, Clone, Copy)]
pub enum AnyEncoder {
    /// Implicit VR Little Endian.
    Implicit(ImplicitVREncoder),
    /// Explicit VR, either byte order.
    Explicit(ExplicitVREncoder),
}

impl Encode for AnyEncoder {
    fn encode_header<W: Write + ?Sized>(&self, sink: &mut W, header: DataElementHeader) -> Result<()> {
        match self {
            AnyEncoder::Implicit(e) => e.encode_header(sink, header),
            AnyEncoder::Explicit(e) => e.encode_header(sink, header),
        }
    }

    fn encode_item_header<W: Write + ?Sized>(&self, sink: &mut W, header: ItemHeader) -> Result<()> {
        match self {
            AnyEncoder::Implicit(e) => e.encode_item_header(sink, header),
            AnyEncoder::Explicit(e) => e.encode_item_header(sink, header),
        }
    }

    fn endianness(&self) -> Endianness {
        match self {
            AnyEncoder::Implicit(e) => e.endianness(),
            AnyEncoder::Explicit(e) => e.endianness(),
        }
    }
}
