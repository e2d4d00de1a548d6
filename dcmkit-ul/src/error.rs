//! Error types for PDU codec, association negotiation, and DIMSE.

use dcmkit_core::error::{AsDcmErrorKind, DcmErrorKind};
use snafu::Snafu;

/// Errors that can occur while reading, writing, or negotiating the
/// Upper Layer protocol.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
#[non_exhaustive]
pub enum Error {
    #[snafu(display("failed to read PDU: {source}"))]
    ReadPdu { source: std::io::Error },

    #[snafu(display("failed to connect: {source}"))]
    Connect { source: std::io::Error },

    #[snafu(display("failed to write PDU: {source}"))]
    WritePdu { source: std::io::Error },

    #[snafu(display("unknown PDU type {pdu_type:#04x}"))]
    UnknownPduType { pdu_type: u8 },

    #[snafu(display("unknown variable item type {item_type:#04x}"))]
    UnknownItemType { item_type: u8 },

    #[snafu(display("PDU body shorter than its declared length"))]
    TruncatedPdu,

    #[snafu(display("PDU length {length} exceeds the negotiated maximum {max}"))]
    PduTooLarge { length: u32, max: u32 },

    #[snafu(display("malformed {field}: {reason}"))]
    Malformed { field: &'static str, reason: String },

    #[snafu(display("association rejected: {result:?} ({source:?})"))]
    Rejected {
        result: crate::pdu::AssociationRJResult,
        #[snafu(source(false))]
        source: crate::pdu::AssociationRJSource,
    },

    #[snafu(display("association aborted by {source:?}"))]
    AssociationAborted {
        #[snafu(source(false))]
        source: crate::pdu::AbortRQSource,
    },

    #[snafu(display("received unexpected PDU while {context}"))]
    UnexpectedPdu { context: &'static str },

    #[snafu(display("no presentation context was accepted for abstract syntax {abstract_syntax}"))]
    NoAcceptedPresentationContext { abstract_syntax: String },

    #[snafu(display("presentation context id {id} is not part of this association"))]
    UnknownPresentationContext { id: u8 },

    #[snafu(display("operation timed out waiting for a response"))]
    Timeout,

    #[snafu(display("DIMSE message is missing required field {field}"))]
    MissingCommandField { field: &'static str },

    #[snafu(display("failed to encode data set: {source}"))]
    EncodeDataset { source: dcmkit_object::Error },

    #[snafu(display("failed to decode data set: {source}"))]
    DecodeDataset { source: dcmkit_object::Error },
}

/// Convenience alias for this crate's [`Error`] type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl AsDcmErrorKind for Error {
    fn kind(&self) -> DcmErrorKind {
        match self {
            Error::ReadPdu { .. } | Error::WritePdu { .. } | Error::Connect { .. } => DcmErrorKind::TransportError,
            Error::UnknownPduType { .. }
            | Error::UnknownItemType { .. }
            | Error::TruncatedPdu
            | Error::Malformed { .. }
            | Error::UnexpectedPdu { .. } => DcmErrorKind::ProtocolViolation,
            Error::PduTooLarge { .. } => DcmErrorKind::ProtocolViolation,
            Error::Rejected { .. } => DcmErrorKind::Rejected,
            Error::AssociationAborted { .. } => DcmErrorKind::Aborted,
            Error::NoAcceptedPresentationContext { .. }
            | Error::UnknownPresentationContext { .. }
            | Error::MissingCommandField { .. } => DcmErrorKind::ProtocolViolation,
            Error::Timeout => DcmErrorKind::Timeout,
            Error::EncodeDataset { .. } | Error::DecodeDataset { .. } => DcmErrorKind::MalformedValue,
        }
    }
}
