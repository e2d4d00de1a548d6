//! The closed set of error kinds shared across the dcmkit crates.
//!
//! Each crate that can fail defines its own `snafu`-derived `Error` enum
//! for its own concerns (malformed PDUs, I/O failures and the like), but
//! every one of those errors ultimately carries one of the kinds below,
//! so that callers that only care about "what category of thing went
//! wrong" can match on [`DcmErrorKind`] instead of each crate's own enum.

use std::fmt;

/// A coarse classification of what went wrong while decoding, encoding,
/// or exchanging DICOM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DcmErrorKind {
    /// The input ended before a complete header or value could be read.
    Truncated,
    /// A value's bytes could not be interpreted under its VR (bad UTF-8,
    /// wrong length for a fixed-width VR, unparsable numeric string).
    MalformedValue,
    /// A two-letter VR code did not match any known value representation.
    UnknownVr,
    /// The input did not begin with a valid DICOM Part 10 preamble and
    /// `DICM` magic, nor look like a bare dataset.
    NotDicom,
    /// A required element or meta field was absent.
    MissingRequired,
    /// A peer sent a PDU or DIMSE message that violates the upper layer
    /// or DIMSE protocol state machine.
    ProtocolViolation,
    /// An association request was rejected by the peer.
    Rejected,
    /// The association was aborted, locally or by the peer.
    Aborted,
    /// An ARTIM or operation timeout elapsed.
    Timeout,
    /// The underlying transport (TCP) failed.
    TransportError,
}

impl fmt::Display for DcmErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            DcmErrorKind::Truncated => "truncated input",
            DcmErrorKind::MalformedValue => "malformed value",
            DcmErrorKind::UnknownVr => "unknown value representation",
            DcmErrorKind::NotDicom => "not a DICOM stream",
            DcmErrorKind::MissingRequired => "missing required element",
            DcmErrorKind::ProtocolViolation => "protocol violation",
            DcmErrorKind::Rejected => "association rejected",
            DcmErrorKind::Aborted => "association aborted",
            DcmErrorKind::Timeout => "operation timed out",
            DcmErrorKind::TransportError => "transport error",
        };
        f.write_str(s)
    }
}

/// A type that can classify itself under [`DcmErrorKind`], implemented by
/// each crate's own `Error` enum so that error handling can stay generic
/// where it doesn't care about crate-specific detail.
pub trait AsDcmErrorKind {
    /// The coarse kind this error belongs to.
    fn kind(&self) -> DcmErrorKind;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_has_a_display_message() {
        assert_eq!(DcmErrorKind::NotDicom.to_string(), "not a DICOM stream");
    }
}
