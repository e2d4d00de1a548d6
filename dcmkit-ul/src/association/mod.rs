//! Association state and the negotiated presentation context table (spec
//! component C7).

pub mod client;
pub mod pdata;

use std::collections::HashMap;
use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{self, Result};
use crate::pdu::{self, Pdu};

/// Default timeout for the ARTIM (association response) timer: how long
/// a requester waits for an A-ASSOCIATE-AC/RJ, and how long either side
/// waits for an A-RELEASE-RP.
pub const DEFAULT_ARTIM_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether an I/O error is a read timeout rather than a genuine
/// transport failure.
pub(crate) fn is_timeout(source: &std::io::Error) -> bool {
    matches!(source.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut)
}

/// The lifecycle state of an association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationState {
    /// No association attempt has been made yet.
    Idle,
    /// A-ASSOCIATE-RQ sent, awaiting A-ASSOCIATE-AC/RJ.
    AwaitingAssociation,
    /// The association is open and ready to carry DIMSE messages.
    Established,
    /// A-RELEASE-RQ has been sent or received; awaiting A-RELEASE-RP.
    Releasing,
    /// The association ended via A-ABORT.
    Aborted,
    /// The association ended normally.
    Closed,
}

/// One presentation context as negotiated with the peer: an accepted
/// abstract syntax paired with the single transfer syntax both sides
/// agreed to use for it.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiatedPresentationContext {
    pub id: u8,
    pub abstract_syntax: String,
    pub transfer_syntax: String,
}

/// The subset of a negotiated context the DIMSE layer needs on every
/// exchange: its id, the codec implied by its transfer syntax, and its
/// abstract syntax (used as a fallback SOP class UID when a peer omits
/// one it should have sent).
#[derive(Debug, Clone)]
pub struct DimseContext {
    pub id: u8,
    pub codec: dcmkit_transfer_syntax::Codec,
    pub abstract_syntax: String,
}

impl NegotiatedPresentationContext {
    pub fn clone_for_dimse(&self) -> DimseContext {
        let codec = dcmkit_transfer_syntax::REGISTRY
            .get(&self.transfer_syntax)
            .map(|ts| ts.codec)
            .unwrap_or(dcmkit_transfer_syntax::Codec::ImplicitVRLittleEndian);
        DimseContext {
            id: self.id,
            codec,
            abstract_syntax: self.abstract_syntax.clone(),
        }
    }
}

/// An open DICOM Upper Layer association over a bidirectional byte
/// stream, tracking every presentation context the peer accepted —
/// unlike a single fixed context, a real association can negotiate many
/// abstract syntaxes at once (e.g. Verification plus several query/
/// retrieve SOP classes).
pub struct Association<S> {
    stream: S,
    state: AssociationState,
    max_pdu_length: u32,
    peer_max_pdu_length: u32,
    contexts: HashMap<u8, NegotiatedPresentationContext>,
    calling_ae_title: String,
    called_ae_title: String,
    next_message_id: u16,
    artim_timeout: Duration,
}

impl<S: Read + Write> Association<S> {
    pub(crate) fn new(
        stream: S,
        max_pdu_length: u32,
        peer_max_pdu_length: u32,
        contexts: Vec<NegotiatedPresentationContext>,
        calling_ae_title: String,
        called_ae_title: String,
        artim_timeout: Duration,
    ) -> Self {
        Association {
            stream,
            state: AssociationState::Established,
            max_pdu_length,
            peer_max_pdu_length,
            contexts: contexts.into_iter().map(|c| (c.id, c)).collect(),
            calling_ae_title,
            called_ae_title,
            next_message_id: 1,
            artim_timeout,
        }
    }

    /// Allocate the next message ID in this association's own monotonic
    /// sequence, distinct from every other association in the process.
    pub(crate) fn next_message_id(&mut self) -> u16 {
        let id = self.next_message_id;
        self.next_message_id = self.next_message_id.wrapping_add(1);
        id
    }

    /// The current lifecycle state.
    pub fn state(&self) -> AssociationState {
        self.state
    }

    /// The maximum PDU length this side advertised it will accept.
    pub fn max_pdu_length(&self) -> u32 {
        self.max_pdu_length
    }

    /// The maximum PDU length the peer advertised it will accept; bounds
    /// how large a PDU this side may send.
    pub fn peer_max_pdu_length(&self) -> u32 {
        self.peer_max_pdu_length
    }

    /// The calling AE title used to establish this association.
    pub fn calling_ae_title(&self) -> &str {
        &self.calling_ae_title
    }

    /// The called AE title used to establish this association.
    pub fn called_ae_title(&self) -> &str {
        &self.called_ae_title
    }

    /// Every presentation context the peer accepted.
    pub fn presentation_contexts(&self) -> impl Iterator<Item = &NegotiatedPresentationContext> {
        self.contexts.values()
    }

    /// Find the accepted presentation context for a given abstract
    /// syntax.
    pub fn context_for(&self, abstract_syntax: &str) -> Result<&NegotiatedPresentationContext> {
        self.contexts
            .values()
            .find(|c| c.abstract_syntax == abstract_syntax)
            .ok_or_else(|| error::Error::NoAcceptedPresentationContext {
                abstract_syntax: abstract_syntax.to_string(),
            })
    }

    /// Look up a negotiated context by its id.
    pub fn context_by_id(&self, id: u8) -> Result<&NegotiatedPresentationContext> {
        self.contexts
            .get(&id)
            .ok_or(error::Error::UnknownPresentationContext { id })
    }

    /// Send a raw PDU.
    pub(crate) fn send_pdu(&mut self, pdu: &Pdu) -> Result<()> {
        pdu::writer::write_pdu(&mut self.stream, pdu)
    }

    /// Receive one raw PDU, respecting this side's advertised maximum.
    pub(crate) fn receive_pdu(&mut self) -> Result<Pdu> {
        pdu::reader::read_pdu(&mut self.stream, self.max_pdu_length)
    }

    /// Abort the association immediately, without waiting for a reply.
    pub fn abort(&mut self) -> Result<()> {
        if matches!(self.state, AssociationState::Aborted | AssociationState::Closed) {
            return Ok(());
        }
        self.send_pdu(&Pdu::Abort {
            source: pdu::AbortRQSource::ServiceUser,
        })?;
        self.state = AssociationState::Aborted;
        Ok(())
    }
}

/// A stream that can have a read deadline applied, so the ARTIM timer can
/// be scoped to just the reads it governs instead of the stream's whole
/// lifetime.
pub(crate) trait ArtimTimer {
    fn set_artim_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()>;
}

impl ArtimTimer for std::net::TcpStream {
    fn set_artim_timeout(&self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.set_read_timeout(timeout)
    }
}

impl<S: Read + Write + ArtimTimer> Association<S> {
    /// Request a graceful release: send A-RELEASE-RQ and wait for
    /// A-RELEASE-RP. The ARTIM timer governs only this wait; on
    /// expiry an A-ABORT is sent to the peer before the timeout error
    /// is returned.
    pub fn release(&mut self) -> Result<()> {
        if self.state != AssociationState::Established {
            return Ok(());
        }
        self.state = AssociationState::Releasing;
        self.send_pdu(&Pdu::ReleaseRQ)?;

        self.stream
            .set_artim_timeout(Some(self.artim_timeout))
            .map_err(|source| error::Error::ReadPdu { source })?;
        let response = self.receive_pdu();
        let _ = self.stream.set_artim_timeout(None);

        match response {
            Ok(Pdu::ReleaseRP) => {
                self.state = AssociationState::Closed;
                Ok(())
            }
            Ok(Pdu::Abort { source }) => {
                self.state = AssociationState::Aborted;
                Err(error::Error::AssociationAborted { source })
            }
            Ok(_) => Err(error::Error::UnexpectedPdu {
                context: "awaiting A-RELEASE-RP",
            }),
            Err(error::Error::ReadPdu { source }) if is_timeout(&source) => {
                self.state = AssociationState::Aborted;
                let _ = self.send_pdu(&Pdu::Abort {
                    source: pdu::AbortRQSource::ServiceUser,
                });
                Err(error::Error::Timeout)
            }
            Err(e) => Err(e),
        }
    }
}

impl<S> Drop for Association<S> {
    fn drop(&mut self) {
        if self.state == AssociationState::Established {
            tracing::warn!("association dropped without a release or abort");
        }
    }
}
