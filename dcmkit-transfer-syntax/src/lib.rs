//! The registry of DICOM transfer syntaxes: the UID that a dataset or an
//! association's negotiated presentation context names is looked up here
//! to learn how its elements are structurally encoded.

pub mod codec;

use once_cell::sync::Lazy;
use std::collections::HashMap;

use dcmkit_dictionary::uids::transfer_syntax as uid;

pub use codec::{AnyDecoder, AnyEncoder, Codec};

/// A known transfer syntax: its UID, its structural encoding, and
/// whether this toolkit can parse its pixel data or only recognize it
/// opaquely.
#[derive(Debug, Clone, Copy)]
pub struct TransferSyntax {
    /// The transfer syntax UID, as it appears on the wire.
    pub uid: &'static str,
    /// A human-readable name.
    pub name: &'static str,
    /// The structural header encoding.
    pub codec: Codec,
    /// Whether the dataset stream is deflated (zlib, no header/checksum)
    /// after the file meta group.
    pub deflated: bool,
    /// Whether pixel data under this transfer syntax is encapsulated
    /// (compressed) rather than native. Encapsulated pixel data is
    /// recognized and its fragments are preserved as opaque bytes; this
    /// toolkit does not decode compressed pixel data.
    pub encapsulated_pixel_data: bool,
}

macro_rules! native {
    ($uid:expr, $name:expr, $codec:expr) => {
        TransferSyntax {
            uid: $uid,
            name: $name,
            codec: $codec,
            deflated: false,
            encapsulated_pixel_data: false,
        }
    };
}

macro_rules! compressed {
    ($uid:expr, $name:expr) => {
        TransferSyntax {
            uid: $uid,
            name: $name,
            codec: Codec::ExplicitVRLittleEndian,
            deflated: false,
            encapsulated_pixel_data: true,
        }
    };
}

const KNOWN: &[TransferSyntax] = &[
    native!(
        uid::IMPLICIT_VR_LITTLE_ENDIAN,
        "Implicit VR Little Endian",
        Codec::ImplicitVRLittleEndian
    ),
    native!(
        uid::EXPLICIT_VR_LITTLE_ENDIAN,
        "Explicit VR Little Endian",
        Codec::ExplicitVRLittleEndian
    ),
    native!(
        uid::EXPLICIT_VR_BIG_ENDIAN,
        "Explicit VR Big Endian",
        Codec::ExplicitVRBigEndian
    ),
    TransferSyntax {
        uid: uid::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN,
        name: "Deflated Explicit VR Little Endian",
        codec: Codec::ExplicitVRLittleEndian,
        deflated: true,
        encapsulated_pixel_data: false,
    },
    compressed!(uid::JPEG_BASELINE, "JPEG Baseline (Process 1)"),
    compressed!(uid::JPEG_LOSSLESS, "JPEG Lossless, Non-Hierarchical"),
    compressed!(uid::JPEG_LS_LOSSLESS, "JPEG-LS Lossless"),
    compressed!(uid::JPEG_2000_LOSSLESS, "JPEG 2000 (Lossless Only)"),
    compressed!(uid::JPEG_2000, "JPEG 2000"),
    compressed!(uid::RLE_LOSSLESS, "RLE Lossless"),
];

/// The process-wide transfer syntax registry.
pub static REGISTRY: Lazy<TransferSyntaxRegistry> = Lazy::new(TransferSyntaxRegistry::build);

/// A lookup table from transfer syntax UID to [`TransferSyntax`]
/// descriptor.
pub struct TransferSyntaxRegistry {
    by_uid: HashMap<&'static str, TransferSyntax>,
}

impl TransferSyntaxRegistry {
    fn build() -> Self {
        TransferSyntaxRegistry {
            by_uid: KNOWN.iter().map(|ts| (ts.uid, *ts)).collect(),
        }
    }

    /// Look up a transfer syntax by UID. UIDs are matched after trimming
    /// any trailing NUL padding byte, as commonly appears when read
    /// straight from a dataset.
    pub fn get(&self, uid: &str) -> Option<TransferSyntax> {
        let trimmed = uid.trim_end_matches(['\0', ' ']);
        let found = self.by_uid.get(trimmed).copied();
        if found.is_none() {
            tracing::debug!(uid = trimmed, "unrecognized transfer syntax UID");
        }
        found
    }
}

impl Default for TransferSyntaxRegistry {
    fn default() -> Self {
        TransferSyntaxRegistry::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_vr_le_is_registered() {
        let ts = REGISTRY.get(uid::IMPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert_eq!(ts.codec, Codec::ImplicitVRLittleEndian);
        assert!(!ts.encapsulated_pixel_data);
    }

    #[test]
    fn trailing_nul_is_trimmed() {
        let padded = format!("{}\0", uid::EXPLICIT_VR_LITTLE_ENDIAN);
        assert!(REGISTRY.get(&padded).is_some());
    }

    #[test]
    fn deflated_syntax_is_flagged() {
        let ts = REGISTRY.get(uid::DEFLATED_EXPLICIT_VR_LITTLE_ENDIAN).unwrap();
        assert!(ts.deflated);
    }

    #[test]
    fn compressed_syntax_is_recognized_but_opaque() {
        let ts = REGISTRY.get(uid::JPEG_2000).unwrap();
        assert!(ts.encapsulated_pixel_data);
    }

    #[test]
    fn unknown_uid_is_absent() {
        assert!(REGISTRY.get("1.2.3.4.5.not.real").is_none());
    }
}
