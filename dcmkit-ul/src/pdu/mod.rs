//! The seven Upper Layer PDU types and their sub-items (spec component
//! C6).

pub mod commands;
pub mod reader;
pub mod writer;

use dcmkit_transfer_syntax::Codec;

/// An Upper Layer Protocol Data Unit.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    /// A-ASSOCIATE-RQ: a request to open an association.
    AssociateRQ(AssociateRQ),
    /// A-ASSOCIATE-AC: acceptance of an association request.
    AssociateAC(AssociateAC),
    /// A-ASSOCIATE-RJ: rejection of an association request.
    AssociateRJ {
        /// Whether rejection is permanent or transient.
        result: AssociationRJResult,
        /// Which party or layer is responsible for the rejection.
        source: AssociationRJSource,
    },
    /// P-DATA-TF: one or more fragments of a DIMSE message.
    PData { data: Vec<PDataValue> },
    /// A-RELEASE-RQ: a request to close an association gracefully.
    ReleaseRQ,
    /// A-RELEASE-RP: acknowledgement of a release request.
    ReleaseRP,
    /// A-ABORT: an immediate, ungraceful termination.
    Abort {
        /// Which party or layer triggered the abort.
        source: AbortRQSource,
    },
}

/// The body of an A-ASSOCIATE-RQ.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociateRQ {
    /// The requested protocol version (always 1).
    pub protocol_version: u16,
    /// The called AE title, space-padded to 16 bytes on the wire.
    pub called_ae_title: String,
    /// The calling AE title, space-padded to 16 bytes on the wire.
    pub calling_ae_title: String,
    /// The application context name (always the DICOM application
    /// context UID in practice).
    pub application_context_name: String,
    /// One proposed presentation context per abstract syntax.
    pub presentation_contexts: Vec<PresentationContextProposed>,
    /// User information sub-items (max PDU length, implementation
    /// class/version).
    pub user_variables: Vec<UserVariableItem>,
}

/// The body of an A-ASSOCIATE-AC.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociateAC {
    /// The negotiated protocol version (always 1).
    pub protocol_version: u16,
    /// Echoed called AE title.
    pub called_ae_title: String,
    /// Echoed calling AE title.
    pub calling_ae_title: String,
    /// Echoed application context name.
    pub application_context_name: String,
    /// The result of negotiating each proposed presentation context.
    pub presentation_contexts: Vec<PresentationContextResult>,
    /// User information sub-items.
    pub user_variables: Vec<UserVariableItem>,
}

/// A presentation context proposed by an association requester: an
/// abstract syntax plus every transfer syntax the requester is willing
/// to use with it.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationContextProposed {
    /// An odd identifier, unique within the association.
    pub id: u8,
    /// The abstract syntax (SOP Class) UID.
    pub abstract_syntax: String,
    /// The proposed transfer syntax UIDs, in preference order.
    pub transfer_syntaxes: Vec<String>,
}

/// An acceptor's response to one proposed presentation context.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationContextResult {
    /// Echoes the identifier of the proposed context being answered.
    pub id: u8,
    /// Whether the context was accepted, and if not, why.
    pub reason: PresentationContextResultReason,
    /// The single transfer syntax chosen, if accepted.
    pub transfer_syntax: String,
}

/// The outcome of negotiating one presentation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentationContextResultReason {
    /// The context was accepted.
    Acceptance,
    /// Rejected: user rejection of the abstract syntax.
    UserRejection,
    /// Rejected: no reason given, provider-level rejection.
    NoReason,
    /// Rejected: the abstract syntax is not supported.
    AbstractSyntaxNotSupported,
    /// Rejected: none of the proposed transfer syntaxes are supported.
    TransferSyntaxesNotSupported,
}

/// Why an association request was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRJResult {
    /// The requester may retry later with different parameters.
    RejectedPermanent,
    /// The requester may retry immediately.
    RejectedTransient,
}

/// Which layer is responsible for an association rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRJSource {
    /// The service user (application layer).
    ServiceUser(AssociationRJServiceUserReason),
    /// The service provider, ACSE-related.
    ServiceProviderAcse(AssociationRJServiceProviderAcseReason),
    /// The service provider, presentation-related.
    ServiceProviderPresentation(AssociationRJServiceProviderPresentationReason),
}

/// Reasons a service-user rejection may give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRJServiceUserReason {
    NoReasonGiven,
    ApplicationContextNameNotSupported,
    CallingAETitleNotRecognized,
    CalledAETitleNotRecognized,
}

/// Reasons an ACSE-level provider rejection may give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRJServiceProviderAcseReason {
    NoReasonGiven,
    ProtocolVersionNotSupported,
}

/// Reasons a presentation-level provider rejection may give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationRJServiceProviderPresentationReason {
    TemporaryCongestion,
    LocalLimitExceeded,
}

/// One fragment of a DIMSE message carried in a P-DATA-TF PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct PDataValue {
    /// The presentation context this fragment belongs to.
    pub presentation_context_id: u8,
    /// The fragment's payload bytes.
    pub data: Vec<u8>,
    /// Whether this fragment is part of the command set or the data
    /// set, and whether it is the last fragment of that part.
    pub value_type: PDataValueType,
    /// Whether this is the final fragment of its command/data set
    /// portion.
    pub is_last: bool,
}

/// The two flag bits of a PDV's control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PDataValueType {
    /// This fragment belongs to the DIMSE command set.
    Command,
    /// This fragment belongs to the DIMSE data set.
    Data,
}

impl PDataValueType {
    pub(crate) fn control_byte(self, is_last: bool) -> u8 {
        let command_bit = match self {
            PDataValueType::Command => 0b01,
            PDataValueType::Data => 0b00,
        };
        let last_bit = if is_last { 0b10 } else { 0b00 };
        command_bit | last_bit
    }

    pub(crate) fn from_control_byte(byte: u8) -> (Self, bool) {
        let value_type = if byte & 0b01 != 0 {
            PDataValueType::Command
        } else {
            PDataValueType::Data
        };
        (value_type, byte & 0b10 != 0)
    }
}

/// Which party aborted an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortRQSource {
    /// The service user initiated the abort.
    ServiceUser,
    /// The service provider initiated the abort for the given reason.
    ServiceProvider(AbortRQServiceProviderReason),
}

/// Reasons a service-provider abort may give.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortRQServiceProviderReason {
    ReasonNotSpecified,
    UnrecognizedPdu,
    UnexpectedPdu,
    UnrecognizedPduParameter,
    UnexpectedPduParameter,
    InvalidPduParameterValue,
}

/// A sub-item of the User Information item carried in A-ASSOCIATE-RQ/AC.
#[derive(Debug, Clone, PartialEq)]
pub enum UserVariableItem {
    /// The maximum length, in bytes, of a PDU the sender is willing to
    /// receive.
    MaxLength(u32),
    /// The sender's implementation class UID.
    ImplementationClassUID(String),
    /// The sender's implementation version name.
    ImplementationVersionName(String),
    /// A recognized-but-unhandled sub-item, kept verbatim so it can be
    /// re-serialized unchanged (e.g. async operations window, role
    /// selection, extended negotiation).
    Unknown { item_type: u8, data: Vec<u8> },
}

/// The DICOM application context name negotiated by every association.
pub const APPLICATION_CONTEXT_NAME: &str = "1.2.840.10008.3.1.1.1";

/// Determine the codec that a negotiated transfer syntax UID implies, or
/// `None` if the UID is not one this toolkit can parse natively.
pub fn codec_for_transfer_syntax(uid: &str) -> Option<Codec> {
    let ts = dcmkit_transfer_syntax::REGISTRY.get(uid)?;
    if ts.encapsulated_pixel_data || ts.deflated {
        None
    } else {
        Some(ts.codec)
    }
}
