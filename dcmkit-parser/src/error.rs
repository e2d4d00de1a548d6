//! Errors produced while parsing data sets and file meta information.

use dcmkit_core::error::{AsDcmErrorKind, DcmErrorKind};
use dcmkit_core::tag::Tag;
use snafu::Snafu;

/// Errors arising from [`crate::dataset`] and [`crate::meta`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// A lower-level header or value decoding error.
    #[snafu(display("failed to decode element"))]
    Decode { source: dcmkit_encoding::Error },

    /// The input did not begin with a 128-byte preamble and `DICM` magic.
    #[snafu(display("not a DICOM Part 10 stream: missing preamble or DICM magic"))]
    NotDicom,

    /// The file meta group did not carry a required element.
    #[snafu(display("missing required file meta element: {keyword}"))]
    MissingMetaElement { keyword: &'static str },

    /// The `TransferSyntaxUID` in the file meta group did not match any
    /// known transfer syntax.
    #[snafu(display("unrecognized transfer syntax UID: {uid}"))]
    UnknownTransferSyntax { uid: String },

    /// A sequence or item delimiter was encountered that did not match
    /// the innermost open frame (e.g. a sequence delimiter while inside
    /// an item, or vice versa).
    #[snafu(display("mismatched delimiter: expected {expected}, found {found}"))]
    MismatchedDelimiter {
        expected: &'static str,
        found: &'static str,
    },

    /// An I/O error occurred reading the underlying stream.
    #[snafu(display("I/O error while reading {context}"))]
    Io {
        context: &'static str,
        source: std::io::Error,
    },

    /// An element's declared value length reaches past the end of the
    /// stream.
    #[snafu(display("truncated value for {tag} at offset {offset}"))]
    Truncated { tag: Tag, offset: u64 },
}

/// This crate's result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmkit_encoding::Error> for Error {
    fn from(source: dcmkit_encoding::Error) -> Self {
        Error::Decode { source }
    }
}

impl AsDcmErrorKind for Error {
    fn kind(&self) -> DcmErrorKind {
        match self {
            Error::Decode { source } => source.kind(),
            Error::NotDicom => DcmErrorKind::NotDicom,
            Error::MissingMetaElement { .. } => DcmErrorKind::MissingRequired,
            Error::UnknownTransferSyntax { .. } => DcmErrorKind::MalformedValue,
            Error::MismatchedDelimiter { .. } => DcmErrorKind::ProtocolViolation,
            Error::Io { .. } => DcmErrorKind::TransportError,
            Error::Truncated { .. } => DcmErrorKind::Truncated,
        }
    }
}
