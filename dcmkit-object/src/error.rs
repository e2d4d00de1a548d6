//! Errors produced while assembling or serializing an in-memory object.

use dcmkit_core::error::{AsDcmErrorKind, DcmErrorKind};
use snafu::Snafu;

/// Errors arising from [`crate::mem`].
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    /// A lower-level parsing error.
    #[snafu(display("failed to parse data set"))]
    Parse { source: dcmkit_parser::Error },

    /// A lower-level encoding error.
    #[snafu(display("failed to encode data set"))]
    Encode { source: dcmkit_encoding::Error },

    /// The `TransferSyntaxUID` named in file meta was not recognized.
    #[snafu(display("unrecognized transfer syntax UID: {uid}"))]
    UnknownTransferSyntax { uid: String },

    /// A token stream produced a structurally invalid object (e.g. a
    /// value token with no preceding header, or an end token with no
    /// matching start).
    #[snafu(display("malformed token stream: {reason}"))]
    MalformedTokenStream { reason: &'static str },

    /// Opening or reading the backing file failed.
    #[snafu(display("I/O error accessing {path}"))]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// This crate's result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<dcmkit_parser::Error> for Error {
    fn from(source: dcmkit_parser::Error) -> Self {
        Error::Parse { source }
    }
}

impl From<dcmkit_encoding::Error> for Error {
    fn from(source: dcmkit_encoding::Error) -> Self {
        Error::Encode { source }
    }
}

impl AsDcmErrorKind for Error {
    fn kind(&self) -> DcmErrorKind {
        match self {
            Error::Parse { source } => source.kind(),
            Error::Encode { source } => source.kind(),
            Error::UnknownTransferSyntax { .. } => DcmErrorKind::MalformedValue,
            Error::MalformedTokenStream { .. } => DcmErrorKind::ProtocolViolation,
            Error::Io { .. } => DcmErrorKind::TransportError,
        }
    }
}
