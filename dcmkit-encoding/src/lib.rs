//! Byte-level decoding and encoding of DICOM element headers and
//! primitives, for each of the structural encodings a transfer syntax may
//! select: Implicit VR Little Endian, Explicit VR Little/Big Endian (spec
//! component C3).
//!
//! Dataset-level concerns (sequences, nesting, file meta) live one layer
//! up, in `dcmkit-parser`.

pub mod decode;
pub mod encode;
pub mod error;
pub mod text;
pub mod transfer_syntax;

pub use decode::Decode;
pub use encode::Encode;
pub use error::{Error, Result};
pub use transfer_syntax::{Endianness, VrPresence};
