//! Byte order and the three structural encoding families (explicit VR,
//! implicit VR, and their endianness) that a transfer syntax selects
//! between.

/// The byte order a transfer syntax encodes multi-byte integers and
/// floats in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    /// Least-significant byte first; used by every transfer syntax except
    /// the retired Explicit VR Big Endian.
    Little,
    /// Most-significant byte first.
    Big,
}

impl Endianness {
    /// The native endianness used by this platform; irrelevant to
    /// decoding but convenient for constructing test fixtures.
    pub fn native() -> Self {
        if cfg!(target_endian = "big") {
            Endianness::Big
        } else {
            Endianness::Little
        }
    }

    pub(crate) fn to_byteordered(self) -> byteordered::Endianness {
        match self {
            Endianness::Little => byteordered::Endianness::Little,
            Endianness::Big => byteordered::Endianness::Big,
        }
    }
}

/// Whether a transfer syntax carries an explicit two-letter VR code next
/// to each element header, or recovers the VR from the data dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VrPresence {
    /// Implicit VR: every element header is tag + 4-byte length.
    Implicit,
    /// Explicit VR: every element header carries its own VR code.
    Explicit,
}
