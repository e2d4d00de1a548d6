//! Errors produced while decoding or encoding DICOM primitives and
//! headers.

use dcmkit_core::error::{AsDcmErrorKind, DcmErrorKind};
use snafu::Snafu;

/// Errors arising from [`crate::decode`] and [`crate::encode`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// Ran out of bytes while reading a fixed-width field.
    #[snafu(display("truncated while reading {field}"))]
    Truncated {
        /// The field being read when the input ran out.
        field: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A two-byte VR code did not match any known value representation.
    #[snafu(display("unrecognized VR code {code:?}"))]
    UnknownVr {
        /// The raw two bytes read from the stream.
        code: [u8; 2],
    },

    /// A value's bytes could not be interpreted under its declared VR.
    #[snafu(display("malformed {vr} value: {reason}"))]
    MalformedValue {
        /// The VR the value was being decoded as.
        vr: &'static str,
        /// A human-readable explanation.
        reason: String,
    },

    /// Writing to the output sink failed.
    #[snafu(display("I/O error while writing {field}"))]
    Write {
        /// The field being written when the error occurred.
        field: &'static str,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// This crate's result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl AsDcmErrorKind for Error {
    fn kind(&self) -> DcmErrorKind {
        match self {
            Error::Truncated { .. } => DcmErrorKind::Truncated,
            Error::UnknownVr { .. } => DcmErrorKind::UnknownVr,
            Error::MalformedValue { .. } => DcmErrorKind::MalformedValue,
            Error::Write { .. } => DcmErrorKind::TransportError,
        }
    }
}
