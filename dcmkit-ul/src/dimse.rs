//! DIMSE services built on top of the association and PDU layers: C-ECHO,
//! C-FIND, C-MOVE, C-GET, and C-CANCEL (spec component C8).

use std::io::{Read, Write};

use dcmkit_object::InMemDicomObject;
use dcmkit_transfer_syntax::Codec;

use crate::association::pdata::{read_dimse_fragments, PDataWriter};
use crate::association::Association;
use crate::error::{self, Result};
use crate::pdu::commands::{
    self, CCancelRq, CEchoRq, CEchoRsp, CFindRq, CFindRsp, CGetRq, CMoveRq, CommandField, Priority,
    Status, SubOperationsRsp,
};
use crate::pdu::PDataValueType;

fn send_command<S: Read + Write>(association: &mut Association<S>, context_id: u8, bytes: Vec<u8>) -> Result<()> {
    let mut writer = PDataWriter::new(association, context_id, PDataValueType::Command);
    writer.write_all(&bytes).map_err(|_| error::Error::WritePdu {
        source: std::io::Error::new(std::io::ErrorKind::Other, "failed to fragment command set"),
    })?;
    writer.finish()
}

fn send_dataset<S: Read + Write>(association: &mut Association<S>, context_id: u8, dataset: &InMemDicomObject, codec: Codec) -> Result<()> {
    let mut bytes = Vec::new();
    dataset
        .encode_dataset(&mut bytes, codec)
        .map_err(|source| error::Error::EncodeDataset { source })?;
    let mut writer = PDataWriter::new(association, context_id, PDataValueType::Data);
    writer.write_all(&bytes).map_err(|_| error::Error::WritePdu {
        source: std::io::Error::new(std::io::ErrorKind::Other, "failed to fragment data set"),
    })?;
    writer.finish()
}

fn receive_command<S: Read + Write>(association: &mut Association<S>) -> Result<(u8, InMemDicomObject)> {
    let (context_id, bytes) = read_dimse_fragments(association, PDataValueType::Command)?;
    let obj = commands::parse_command_set(&bytes)?;
    Ok((context_id, obj))
}

fn receive_dataset<S: Read + Write>(association: &mut Association<S>, codec: Codec) -> Result<InMemDicomObject> {
    let (_, bytes) = read_dimse_fragments(association, PDataValueType::Data)?;
    InMemDicomObject::parse_dataset(&bytes[..], codec).map_err(|source| error::Error::DecodeDataset { source })
}

/// Perform a C-ECHO: verify the association is alive and the peer
/// understands the Verification SOP class.
pub fn c_echo<S: Read + Write>(association: &mut Association<S>, abstract_syntax: &str) -> Result<Status> {
    let context = association.context_for(abstract_syntax)?.clone_for_dimse();
    let message_id = association.next_message_id();
    let rq = CEchoRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(abstract_syntax)
        .build();
    send_command(association, context.id, rq.into_dataset()?)?;

    let (_, obj) = receive_command(association)?;
    if commands::command_field_of(&obj)? != CommandField::CEchoRsp {
        return Err(error::Error::UnexpectedPdu {
            context: "awaiting C-ECHO-RSP",
        });
    }
    Ok(CEchoRsp::from_dataset(&obj)?.status)
}

/// Send a C-CANCEL-RQ for a previously issued request on the same
/// presentation context.
pub fn c_cancel<S: Read + Write>(association: &mut Association<S>, context_id: u8, message_id_being_responded_to: u16) -> Result<()> {
    let rq = CCancelRq::builder()
        .message_id_being_responded_to(message_id_being_responded_to)
        .build();
    send_command(association, context_id, rq.into_dataset()?)
}

/// An in-progress C-FIND exchange: yields each matching identifier data
/// set as the peer sends it, ending when the peer's final response
/// arrives.
pub struct FindResults<'a, S> {
    association: &'a mut Association<S>,
    context_id: u8,
    codec: Codec,
    message_id: u16,
    done: bool,
}

impl<'a, S: Read + Write> FindResults<'a, S> {
    /// Request cancellation of this query. The peer may still deliver a
    /// few more matches already in flight before sending its final
    /// response.
    pub fn cancel(&mut self) -> Result<()> {
        c_cancel(self.association, self.context_id, self.message_id)
    }
}

impl<'a, S: Read + Write> Iterator for FindResults<'a, S> {
    type Item = Result<InMemDicomObject>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = (|| -> Result<Option<InMemDicomObject>> {
            let (_, obj) = receive_command(self.association)?;
            if commands::command_field_of(&obj)? != CommandField::CFindRsp {
                return Err(error::Error::UnexpectedPdu {
                    context: "awaiting C-FIND-RSP",
                });
            }
            let rsp = CFindRsp::from_dataset(&obj)?;
            if !rsp.status.is_pending() {
                self.done = true;
                if rsp.status.is_success() || rsp.status.is_cancel() {
                    return Ok(None);
                }
                return Err(error::Error::Malformed {
                    field: "C-FIND-RSP status",
                    reason: format!("{:#06x}", rsp.status.0),
                });
            }
            if rsp.has_dataset {
                Ok(Some(receive_dataset(self.association, self.codec)?))
            } else {
                Ok(Some(InMemDicomObject::new()))
            }
        })();

        match step {
            Ok(Some(obj)) => Some(Ok(obj)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Issue a C-FIND request. The returned iterator yields each matching
/// identifier as it arrives.
pub fn c_find<'a, S: Read + Write>(
    association: &'a mut Association<S>,
    abstract_syntax: &str,
    priority: Priority,
    identifier: &InMemDicomObject,
) -> Result<FindResults<'a, S>> {
    let context = association.context_for(abstract_syntax)?.clone_for_dimse();
    let message_id = association.next_message_id();
    let rq = CFindRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(abstract_syntax)
        .priority(priority)
        .build();
    send_command(association, context.id, rq.into_dataset()?)?;
    send_dataset(association, context.id, identifier, context.codec)?;

    Ok(FindResults {
        association,
        context_id: context.id,
        codec: context.codec,
        message_id,
        done: false,
    })
}

/// An in-progress C-MOVE exchange: yields sub-operation progress as the
/// peer reports it. Matching instances are sent by the peer directly to
/// the move destination AE title, not back over this association.
pub struct MoveResults<'a, S> {
    association: &'a mut Association<S>,
    context_id: u8,
    codec: Codec,
    message_id: u16,
    done: bool,
}

impl<'a, S: Read + Write> MoveResults<'a, S> {
    pub fn cancel(&mut self) -> Result<()> {
        c_cancel(self.association, self.context_id, self.message_id)
    }
}

impl<'a, S: Read + Write> Iterator for MoveResults<'a, S> {
    type Item = Result<SubOperationsRsp>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let step = (|| -> Result<Option<SubOperationsRsp>> {
            let (_, obj) = receive_command(self.association)?;
            if commands::command_field_of(&obj)? != CommandField::CMoveRsp {
                return Err(error::Error::UnexpectedPdu {
                    context: "awaiting C-MOVE-RSP",
                });
            }
            let rsp = SubOperationsRsp::from_dataset(&obj)?;
            if rsp.has_dataset {
                let _ = receive_dataset(self.association, self.codec)?;
            }
            if !rsp.status.is_pending() {
                self.done = true;
            }
            Ok(Some(rsp))
        })();

        match step {
            Ok(Some(rsp)) => Some(Ok(rsp)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Issue a C-MOVE request, asking the peer to send matching instances to
/// `move_destination`.
pub fn c_move<'a, S: Read + Write>(
    association: &'a mut Association<S>,
    abstract_syntax: &str,
    priority: Priority,
    move_destination: &str,
    identifier: &InMemDicomObject,
) -> Result<MoveResults<'a, S>> {
    let context = association.context_for(abstract_syntax)?.clone_for_dimse();
    let message_id = association.next_message_id();
    let rq = CMoveRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(abstract_syntax)
        .priority(priority)
        .move_destination(move_destination)
        .build();
    send_command(association, context.id, rq.into_dataset()?)?;
    send_dataset(association, context.id, identifier, context.codec)?;

    Ok(MoveResults {
        association,
        context_id: context.id,
        codec: context.codec,
        message_id,
        done: false,
    })
}

/// Issue a C-GET request. Unlike C-MOVE, matching instances are sent
/// back as C-STORE-RQ sub-operations on this same association; `on_store`
/// is invoked for each one and its return value becomes that
/// sub-operation's C-STORE-RSP status.
pub fn c_get<S: Read + Write>(
    association: &mut Association<S>,
    abstract_syntax: &str,
    priority: Priority,
    identifier: &InMemDicomObject,
    mut on_store: impl FnMut(&InMemDicomObject) -> Status,
) -> Result<SubOperationsRsp> {
    let context = association.context_for(abstract_syntax)?.clone_for_dimse();
    let message_id = association.next_message_id();
    let rq = CGetRq::builder()
        .message_id(message_id)
        .affected_sop_class_uid(abstract_syntax)
        .priority(priority)
        .build();
    send_command(association, context.id, rq.into_dataset()?)?;
    send_dataset(association, context.id, identifier, context.codec)?;

    loop {
        let (store_context_id, obj) = receive_command(association)?;
        match commands::command_field_of(&obj)? {
            CommandField::CStoreRq => {
                let store_context = association.context_by_id(store_context_id)?.clone_for_dimse();
                let instance = receive_dataset(association, store_context.codec)?;
                let status = on_store(&instance);
                let sop_instance_uid = commands::affected_sop_instance_uid(&obj).unwrap_or_default();
                let sop_class_uid = commands::requested_sop_class_uid(&obj).unwrap_or(store_context.abstract_syntax.clone());
                let rsp = commands::CStoreRsp {
                    message_id_being_responded_to: obj_message_id(&obj)?,
                    affected_sop_class_uid: sop_class_uid,
                    affected_sop_instance_uid: sop_instance_uid,
                    status,
                };
                send_command(association, store_context_id, rsp.into_dataset()?)?;
            }
            CommandField::CGetRsp => {
                let rsp = SubOperationsRsp::from_dataset(&obj)?;
                if rsp.has_dataset {
                    let _ = receive_dataset(association, context.codec)?;
                }
                if !rsp.status.is_pending() {
                    return Ok(rsp);
                }
            }
            _ => {
                return Err(error::Error::UnexpectedPdu {
                    context: "awaiting C-STORE-RQ or C-GET-RSP",
                })
            }
        }
    }
}

fn obj_message_id(obj: &InMemDicomObject) -> Result<u16> {
    obj.value(dcmkit_core::tag::Tag(0x0000, 0x0110))
        .and_then(|v| v.to_i32())
        .map(|v| v as u16)
        .ok_or(error::Error::MissingCommandField { field: "MessageID" })
}
