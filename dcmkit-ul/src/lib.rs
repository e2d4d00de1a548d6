//! The DICOM Upper Layer protocol: PDU encoding, association
//! negotiation, and the DIMSE message exchange built on top of it (spec
//! components C6, C7, and C8).

pub mod association;
pub mod dimse;
pub mod error;
pub mod pdu;

pub use association::client::ClientAssociationOptions;
pub use association::{Association, AssociationState, NegotiatedPresentationContext};
pub use error::{Error, Result};
pub use pdu::Pdu;
