//! Establishing an association as the requester (SCU) side.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use dcmkit_dictionary::uids::transfer_syntax::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN};

use crate::association::{is_timeout, Association, NegotiatedPresentationContext, DEFAULT_ARTIM_TIMEOUT};
use crate::error::{self, Result};
use crate::pdu::{
    self, AssociateRQ, Pdu, PresentationContextProposed,
    PresentationContextResultReason, UserVariableItem, APPLICATION_CONTEXT_NAME,
};

/// The default maximum PDU length this toolkit advertises: 16 KiB,
/// matching the transfer syntax negotiation default most DICOM
/// implementations use.
pub const DEFAULT_MAX_PDU_LENGTH: u32 = 16_384;

const IMPLEMENTATION_CLASS_UID: &str = "1.2.826.0.1.3680043.9.7133.1";
const IMPLEMENTATION_VERSION_NAME: &str = "DCMKIT_001";

/// One abstract syntax this requester wants to use, with the transfer
/// syntaxes it is willing to accept for it, in preference order.
#[derive(Debug, Clone)]
pub struct ProposedContext {
    pub abstract_syntax: String,
    pub transfer_syntaxes: Vec<String>,
}

/// A fluent builder for the parameters of a client-initiated
/// association. Call [`ClientAssociationOptions::establish`] once every
/// abstract syntax the caller needs has been added.
#[derive(Debug, Clone)]
pub struct ClientAssociationOptions {
    calling_ae_title: String,
    called_ae_title: String,
    max_pdu_length: u32,
    artim_timeout: Duration,
    contexts: Vec<ProposedContext>,
}

impl Default for ClientAssociationOptions {
    fn default() -> Self {
        ClientAssociationOptions {
            calling_ae_title: "DCMKIT_SCU".to_string(),
            called_ae_title: "ANY_SCP".to_string(),
            max_pdu_length: DEFAULT_MAX_PDU_LENGTH,
            artim_timeout: DEFAULT_ARTIM_TIMEOUT,
            contexts: Vec::new(),
        }
    }
}

impl ClientAssociationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calling_ae_title(mut self, title: impl Into<String>) -> Self {
        self.calling_ae_title = title.into();
        self
    }

    pub fn called_ae_title(mut self, title: impl Into<String>) -> Self {
        self.called_ae_title = title.into();
        self
    }

    pub fn max_pdu_length(mut self, len: u32) -> Self {
        self.max_pdu_length = len;
        self
    }

    pub fn artim_timeout(mut self, timeout: Duration) -> Self {
        self.artim_timeout = timeout;
        self
    }

    /// Propose an abstract syntax with an explicit list of acceptable
    /// transfer syntaxes.
    pub fn with_abstract_syntax(mut self, abstract_syntax: impl Into<String>, transfer_syntaxes: Vec<String>) -> Self {
        self.contexts.push(ProposedContext {
            abstract_syntax: abstract_syntax.into(),
            transfer_syntaxes,
        });
        self
    }

    /// Propose an abstract syntax willing to accept either Explicit or
    /// Implicit VR Little Endian, the combination nearly every SCP
    /// supports.
    pub fn with_default_transfer_syntaxes(self, abstract_syntax: impl Into<String>) -> Self {
        self.with_abstract_syntax(
            abstract_syntax,
            vec![EXPLICIT_VR_LITTLE_ENDIAN.to_string(), IMPLICIT_VR_LITTLE_ENDIAN.to_string()],
        )
    }

    /// Connect to `address` and negotiate an association.
    pub fn establish(self, address: impl ToSocketAddrs) -> Result<Association<TcpStream>> {
        let stream = TcpStream::connect(address).map_err(|source| error::Error::Connect { source })?;
        self.establish_with(stream)
    }

    /// Negotiate an association over an already-connected stream. The
    /// ARTIM timer governs only the wait for A-ASSOCIATE-AC/RJ here; it
    /// is cleared before the association is handed back so it never
    /// bounds later DIMSE reads.
    pub fn establish_with(self, mut stream: TcpStream) -> Result<Association<TcpStream>> {
        if self.contexts.is_empty() {
            return Err(error::Error::Malformed {
                field: "presentation contexts",
                reason: "at least one abstract syntax must be proposed".to_string(),
            });
        }

        stream
            .set_read_timeout(Some(self.artim_timeout))
            .map_err(|source| error::Error::Connect { source })?;

        let proposed_ids: std::collections::HashMap<u8, String> = self
            .contexts
            .iter()
            .enumerate()
            .map(|(i, c)| ((i as u8) * 2 + 1, c.abstract_syntax.clone()))
            .collect();

        let presentation_contexts = self
            .contexts
            .iter()
            .enumerate()
            .map(|(i, c)| PresentationContextProposed {
                id: (i as u8) * 2 + 1,
                abstract_syntax: c.abstract_syntax.clone(),
                transfer_syntaxes: c.transfer_syntaxes.clone(),
            })
            .collect();

        let rq = Pdu::AssociateRQ(AssociateRQ {
            protocol_version: 1,
            called_ae_title: self.called_ae_title.clone(),
            calling_ae_title: self.calling_ae_title.clone(),
            application_context_name: APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts,
            user_variables: vec![
                UserVariableItem::MaxLength(self.max_pdu_length),
                UserVariableItem::ImplementationClassUID(IMPLEMENTATION_CLASS_UID.to_string()),
                UserVariableItem::ImplementationVersionName(IMPLEMENTATION_VERSION_NAME.to_string()),
            ],
        });
        pdu::writer::write_pdu(&mut stream, &rq)?;

        let response = match pdu::reader::read_pdu(&mut stream, self.max_pdu_length) {
            Ok(pdu) => pdu,
            Err(error::Error::ReadPdu { source }) if is_timeout(&source) => {
                let _ = pdu::writer::write_pdu(
                    &mut stream,
                    &Pdu::Abort {
                        source: pdu::AbortRQSource::ServiceUser,
                    },
                );
                return Err(error::Error::Timeout);
            }
            Err(e) => return Err(e),
        };

        match response {
            Pdu::AssociateAC(ac) => {
                let peer_max_pdu_length = ac
                    .user_variables
                    .iter()
                    .find_map(|v| match v {
                        UserVariableItem::MaxLength(len) => Some(*len),
                        _ => None,
                    })
                    .unwrap_or(DEFAULT_MAX_PDU_LENGTH);

                let accepted: Vec<NegotiatedPresentationContext> = ac
                    .presentation_contexts
                    .iter()
                    .filter(|pc| pc.reason == PresentationContextResultReason::Acceptance)
                    .map(|pc| {
                        let abstract_syntax = proposed_ids.get(&pc.id).cloned().unwrap_or_default();
                        NegotiatedPresentationContext {
                            id: pc.id,
                            abstract_syntax,
                            transfer_syntax: pc.transfer_syntax.clone(),
                        }
                    })
                    .collect();

                stream
                    .set_read_timeout(None)
                    .map_err(|source| error::Error::Connect { source })?;

                Ok(Association::new(
                    stream,
                    self.max_pdu_length,
                    peer_max_pdu_length,
                    accepted,
                    self.calling_ae_title,
                    self.called_ae_title,
                    self.artim_timeout,
                ))
            }
            Pdu::AssociateRJ { result, source } => Err(error::Error::Rejected { result, source }),
            Pdu::Abort { source } => Err(error::Error::AssociationAborted { source }),
            _ => Err(error::Error::UnexpectedPdu {
                context: "awaiting A-ASSOCIATE-AC/RJ",
            }),
        }
    }
}

// Re-exported so callers can match on rejection causes without a second import.
pub use crate::pdu::AssociationRJSource as RejectionSource;
