//! DIMSE command sets: the fixed-schema data sets that precede every
//! DIMSE message's (optional) data set, always encoded Implicit VR
//! Little Endian regardless of the association's negotiated transfer
//! syntax.

use bon::Builder;
use dcmkit_core::tag::Tag;
use dcmkit_core::vr::VR;
use dcmkit_core::PrimitiveValue;
use dcmkit_object::InMemDicomObject;
use dcmkit_transfer_syntax::Codec;

use crate::error::{self, Result};

const COMMAND_GROUP_LENGTH: Tag = Tag(0x0000, 0x0000);
const AFFECTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0002);
const REQUESTED_SOP_CLASS_UID: Tag = Tag(0x0000, 0x0003);
const COMMAND_FIELD: Tag = Tag(0x0000, 0x0100);
const MESSAGE_ID: Tag = Tag(0x0000, 0x0110);
const MESSAGE_ID_BEING_RESPONDED_TO: Tag = Tag(0x0000, 0x0120);
const MOVE_DESTINATION: Tag = Tag(0x0000, 0x0600);
const PRIORITY: Tag = Tag(0x0000, 0x0700);
const COMMAND_DATA_SET_TYPE: Tag = Tag(0x0000, 0x0800);
const STATUS: Tag = Tag(0x0000, 0x0900);
const AFFECTED_SOP_INSTANCE_UID: Tag = Tag(0x0000, 0x1000);
const NUMBER_OF_REMAINING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1020);
const NUMBER_OF_COMPLETED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1021);
const NUMBER_OF_FAILED_SUBOPERATIONS: Tag = Tag(0x0000, 0x1022);
const NUMBER_OF_WARNING_SUBOPERATIONS: Tag = Tag(0x0000, 0x1023);

/// The priority a DIMSE operation is requested with. Most SCPs ignore
/// this in practice, but it is part of every request's command set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    fn to_u16(self) -> u16 {
        match self {
            Priority::Medium => 0x0000,
            Priority::High => 0x0001,
            Priority::Low => 0x0002,
        }
    }

    fn from_u16(v: u16) -> Self {
        match v {
            0x0001 => Priority::High,
            0x0002 => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

/// Whether a DIMSE command is followed by a data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandDatasetType {
    /// No data set follows; the command set is the entire message.
    Absent,
    /// A data set follows the command set.
    Present,
}

impl CommandDatasetType {
    fn to_u16(self) -> u16 {
        match self {
            CommandDatasetType::Absent => 0x0101,
            CommandDatasetType::Present => 0x0001,
        }
    }

    fn from_u16(v: u16) -> Self {
        if v == 0x0101 {
            CommandDatasetType::Absent
        } else {
            CommandDatasetType::Present
        }
    }
}

/// The DIMSE operation a command set performs, and whether it is a
/// request or response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandField {
    CStoreRq,
    CStoreRsp,
    CGetRq,
    CGetRsp,
    CFindRq,
    CFindRsp,
    CMoveRq,
    CMoveRsp,
    CEchoRq,
    CEchoRsp,
    CCancelRq,
}

impl CommandField {
    fn to_u16(self) -> u16 {
        match self {
            CommandField::CStoreRq => 0x0001,
            CommandField::CStoreRsp => 0x8001,
            CommandField::CGetRq => 0x0010,
            CommandField::CGetRsp => 0x8010,
            CommandField::CFindRq => 0x0020,
            CommandField::CFindRsp => 0x8020,
            CommandField::CMoveRq => 0x0021,
            CommandField::CMoveRsp => 0x8021,
            CommandField::CEchoRq => 0x0030,
            CommandField::CEchoRsp => 0x8030,
            CommandField::CCancelRq => 0x0fff,
        }
    }

    fn from_u16(v: u16) -> Result<Self> {
        Ok(match v {
            0x0001 => CommandField::CStoreRq,
            0x8001 => CommandField::CStoreRsp,
            0x0010 => CommandField::CGetRq,
            0x8010 => CommandField::CGetRsp,
            0x0020 => CommandField::CFindRq,
            0x8020 => CommandField::CFindRsp,
            0x0021 => CommandField::CMoveRq,
            0x8021 => CommandField::CMoveRsp,
            0x0030 => CommandField::CEchoRq,
            0x8030 => CommandField::CEchoRsp,
            0x0fff => CommandField::CCancelRq,
            other => {
                return Err(error::Error::Malformed {
                    field: "command field",
                    reason: format!("unknown code {other:#06x}"),
                })
            }
        })
    }
}

/// A DIMSE status code. Zero is success; values in `0xFFxx` are "pending"
/// (more responses to follow); everything else is a warning or failure
/// whose exact meaning is service-specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(pub u16);

impl Status {
    pub const SUCCESS: Status = Status(0x0000);
    pub const CANCEL: Status = Status(0xfe00);
    pub const PENDING: Status = Status(0xff00);
    pub const PENDING_WITH_WARNINGS: Status = Status(0xff01);

    pub fn is_pending(self) -> bool {
        self.0 == Self::PENDING.0 || self.0 == Self::PENDING_WITH_WARNINGS.0
    }

    pub fn is_success(self) -> bool {
        self.0 == Self::SUCCESS.0
    }

    pub fn is_cancel(self) -> bool {
        self.0 == Self::CANCEL.0
    }
}

fn u16_at(obj: &InMemDicomObject, tag: Tag) -> Option<u16> {
    match obj.value(tag)? {
        PrimitiveValue::U16(v) => v.first().copied(),
        _ => None,
    }
}

fn require_u16(obj: &InMemDicomObject, tag: Tag, field: &'static str) -> Result<u16> {
    u16_at(obj, tag).ok_or(error::Error::MissingCommandField { field })
}

fn require_str(obj: &InMemDicomObject, tag: Tag, field: &'static str) -> Result<String> {
    obj.string(tag)
        .map(|s| s.to_string())
        .ok_or(error::Error::MissingCommandField { field })
}

fn put_u16(obj: &mut InMemDicomObject, tag: Tag, v: u16) {
    obj.put_primitive(tag, VR::US, PrimitiveValue::from(v));
}

fn put_str(obj: &mut InMemDicomObject, tag: Tag, vr: VR, v: &str) {
    obj.put_primitive(tag, vr, PrimitiveValue::from(v.to_string()));
}

/// Serialize a command set's fixed fields into the on-wire byte buffer
/// (command sets are always Implicit VR Little Endian), prefixed with
/// its own group length element.
fn finish_command_set(obj: InMemDicomObject) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    obj.encode_dataset(&mut body, Codec::ImplicitVRLittleEndian)
        .map_err(|source| error::Error::EncodeDataset { source })?;

    let mut group_length_obj = InMemDicomObject::new();
    put_u16_as_ul(&mut group_length_obj, COMMAND_GROUP_LENGTH, body.len() as u32);
    let mut prefix = Vec::new();
    group_length_obj
        .encode_dataset(&mut prefix, Codec::ImplicitVRLittleEndian)
        .map_err(|source| error::Error::EncodeDataset { source })?;

    prefix.extend_from_slice(&body);
    Ok(prefix)
}

fn put_u16_as_ul(obj: &mut InMemDicomObject, tag: Tag, v: u32) {
    obj.put_primitive(tag, VR::UL, PrimitiveValue::from(v));
}

/// Parse a command set (including its leading group length element)
/// from Implicit VR Little Endian bytes.
pub fn parse_command_set(bytes: &[u8]) -> Result<InMemDicomObject> {
    InMemDicomObject::parse_dataset(bytes, Codec::ImplicitVRLittleEndian)
        .map_err(|source| error::Error::DecodeDataset { source })
}

/// A C-ECHO-RQ command.
#[derive(Debug, Clone, Builder)]
pub struct CEchoRq {
    pub message_id: u16,
    #[builder(into)]
    pub affected_sop_class_uid: String,
}

impl CEchoRq {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CEchoRq.to_u16());
        put_u16(&mut obj, MESSAGE_ID, self.message_id);
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Absent.to_u16());
        finish_command_set(obj)
    }
}

/// A C-ECHO-RSP command.
#[derive(Debug, Clone)]
pub struct CEchoRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub status: Status,
}

impl CEchoRsp {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CEchoRsp.to_u16());
        put_u16(&mut obj, MESSAGE_ID_BEING_RESPONDED_TO, self.message_id_being_responded_to);
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Absent.to_u16());
        put_u16(&mut obj, STATUS, self.status.0);
        finish_command_set(obj)
    }

    pub fn from_dataset(obj: &InMemDicomObject) -> Result<Self> {
        Ok(CEchoRsp {
            message_id_being_responded_to: require_u16(obj, MESSAGE_ID_BEING_RESPONDED_TO, "MessageIDBeingRespondedTo")?,
            affected_sop_class_uid: require_str(obj, AFFECTED_SOP_CLASS_UID, "AffectedSOPClassUID")?,
            status: Status(require_u16(obj, STATUS, "Status")?),
        })
    }
}

/// A C-FIND-RQ command. The identifier data set (query keys) travels as
/// a separate DIMSE data set after this command set.
#[derive(Debug, Clone, Builder)]
pub struct CFindRq {
    pub message_id: u16,
    #[builder(into)]
    pub affected_sop_class_uid: String,
    #[builder(default)]
    pub priority: Priority,
}

impl CFindRq {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CFindRq.to_u16());
        put_u16(&mut obj, MESSAGE_ID, self.message_id);
        put_u16(&mut obj, PRIORITY, self.priority.to_u16());
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Present.to_u16());
        finish_command_set(obj)
    }
}

/// A C-FIND-RSP command. A matching data set follows while `status` is
/// pending; the final response (status success/failure/cancel) carries
/// no data set.
#[derive(Debug, Clone)]
pub struct CFindRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub status: Status,
    pub has_dataset: bool,
}

impl CFindRsp {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CFindRsp.to_u16());
        put_u16(&mut obj, MESSAGE_ID_BEING_RESPONDED_TO, self.message_id_being_responded_to);
        let dataset_type = if self.has_dataset {
            CommandDatasetType::Present
        } else {
            CommandDatasetType::Absent
        };
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, dataset_type.to_u16());
        put_u16(&mut obj, STATUS, self.status.0);
        finish_command_set(obj)
    }

    pub fn from_dataset(obj: &InMemDicomObject) -> Result<Self> {
        let dataset_type = CommandDatasetType::from_u16(require_u16(obj, COMMAND_DATA_SET_TYPE, "CommandDataSetType")?);
        Ok(CFindRsp {
            message_id_being_responded_to: require_u16(obj, MESSAGE_ID_BEING_RESPONDED_TO, "MessageIDBeingRespondedTo")?,
            affected_sop_class_uid: require_str(obj, AFFECTED_SOP_CLASS_UID, "AffectedSOPClassUID")?,
            status: Status(require_u16(obj, STATUS, "Status")?),
            has_dataset: dataset_type == CommandDatasetType::Present,
        })
    }
}

/// A C-MOVE-RQ command. The identifier data set (move keys) follows.
#[derive(Debug, Clone, Builder)]
pub struct CMoveRq {
    pub message_id: u16,
    #[builder(into)]
    pub affected_sop_class_uid: String,
    #[builder(default)]
    pub priority: Priority,
    #[builder(into)]
    pub move_destination: String,
}

impl CMoveRq {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CMoveRq.to_u16());
        put_u16(&mut obj, MESSAGE_ID, self.message_id);
        put_u16(&mut obj, PRIORITY, self.priority.to_u16());
        put_str(&mut obj, MOVE_DESTINATION, VR::AE, &self.move_destination);
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Present.to_u16());
        finish_command_set(obj)
    }
}

/// A C-MOVE-RSP or C-GET-RSP command; both share the same sub-operation
/// counter fields.
#[derive(Debug, Clone)]
pub struct SubOperationsRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub status: Status,
    pub has_dataset: bool,
    pub remaining: u16,
    pub completed: u16,
    pub failed: u16,
    pub warning: u16,
}

impl SubOperationsRsp {
    pub fn into_dataset(self, command_field: CommandField) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, command_field.to_u16());
        put_u16(&mut obj, MESSAGE_ID_BEING_RESPONDED_TO, self.message_id_being_responded_to);
        let dataset_type = if self.has_dataset {
            CommandDatasetType::Present
        } else {
            CommandDatasetType::Absent
        };
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, dataset_type.to_u16());
        put_u16(&mut obj, STATUS, self.status.0);
        put_u16(&mut obj, NUMBER_OF_REMAINING_SUBOPERATIONS, self.remaining);
        put_u16(&mut obj, NUMBER_OF_COMPLETED_SUBOPERATIONS, self.completed);
        put_u16(&mut obj, NUMBER_OF_FAILED_SUBOPERATIONS, self.failed);
        put_u16(&mut obj, NUMBER_OF_WARNING_SUBOPERATIONS, self.warning);
        finish_command_set(obj)
    }

    pub fn from_dataset(obj: &InMemDicomObject) -> Result<Self> {
        let dataset_type = CommandDatasetType::from_u16(require_u16(obj, COMMAND_DATA_SET_TYPE, "CommandDataSetType")?);
        Ok(SubOperationsRsp {
            message_id_being_responded_to: require_u16(obj, MESSAGE_ID_BEING_RESPONDED_TO, "MessageIDBeingRespondedTo")?,
            affected_sop_class_uid: require_str(obj, AFFECTED_SOP_CLASS_UID, "AffectedSOPClassUID")?,
            status: Status(require_u16(obj, STATUS, "Status")?),
            has_dataset: dataset_type == CommandDatasetType::Present,
            remaining: u16_at(obj, NUMBER_OF_REMAINING_SUBOPERATIONS).unwrap_or(0),
            completed: u16_at(obj, NUMBER_OF_COMPLETED_SUBOPERATIONS).unwrap_or(0),
            failed: u16_at(obj, NUMBER_OF_FAILED_SUBOPERATIONS).unwrap_or(0),
            warning: u16_at(obj, NUMBER_OF_WARNING_SUBOPERATIONS).unwrap_or(0),
        })
    }
}

/// A C-GET-RQ command. The identifier data set (get keys) follows.
#[derive(Debug, Clone, Builder)]
pub struct CGetRq {
    pub message_id: u16,
    #[builder(into)]
    pub affected_sop_class_uid: String,
    #[builder(default)]
    pub priority: Priority,
}

impl CGetRq {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CGetRq.to_u16());
        put_u16(&mut obj, MESSAGE_ID, self.message_id);
        put_u16(&mut obj, PRIORITY, self.priority.to_u16());
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Present.to_u16());
        finish_command_set(obj)
    }
}

/// A C-STORE-RSP command, sent in reply to a C-STORE-RQ sub-operation
/// (as seen on the receiving side of a C-GET, or by a storage SCP).
#[derive(Debug, Clone)]
pub struct CStoreRsp {
    pub message_id_being_responded_to: u16,
    pub affected_sop_class_uid: String,
    pub affected_sop_instance_uid: String,
    pub status: Status,
}

impl CStoreRsp {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_str(&mut obj, AFFECTED_SOP_CLASS_UID, VR::UI, &self.affected_sop_class_uid);
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CStoreRsp.to_u16());
        put_u16(&mut obj, MESSAGE_ID_BEING_RESPONDED_TO, self.message_id_being_responded_to);
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Absent.to_u16());
        put_str(&mut obj, AFFECTED_SOP_INSTANCE_UID, VR::UI, &self.affected_sop_instance_uid);
        put_u16(&mut obj, STATUS, self.status.0);
        finish_command_set(obj)
    }
}

/// A C-CANCEL-RQ command, sent on the originating presentation context
/// to cancel an in-progress C-FIND, C-MOVE, or C-GET.
#[derive(Debug, Clone, Builder)]
pub struct CCancelRq {
    pub message_id_being_responded_to: u16,
}

impl CCancelRq {
    pub fn into_dataset(self) -> Result<Vec<u8>> {
        let mut obj = InMemDicomObject::new();
        put_u16(&mut obj, COMMAND_FIELD, CommandField::CCancelRq.to_u16());
        put_u16(&mut obj, MESSAGE_ID_BEING_RESPONDED_TO, self.message_id_being_responded_to);
        put_u16(&mut obj, COMMAND_DATA_SET_TYPE, CommandDatasetType::Absent.to_u16());
        finish_command_set(obj)
    }
}

/// Read just the command field out of a decoded command set, to decide
/// how to interpret the rest of it.
pub fn command_field_of(obj: &InMemDicomObject) -> Result<CommandField> {
    CommandField::from_u16(require_u16(obj, COMMAND_FIELD, "CommandField")?)
}

/// Read whether a command set declares a following data set.
pub fn has_dataset(obj: &InMemDicomObject) -> Result<bool> {
    Ok(CommandDatasetType::from_u16(require_u16(obj, COMMAND_DATA_SET_TYPE, "CommandDataSetType")?) == CommandDatasetType::Present)
}

/// Read a request's requested SOP class UID, used by C-MOVE/C-GET
/// sub-operations that echo it.
pub fn requested_sop_class_uid(obj: &InMemDicomObject) -> Option<String> {
    obj.string(REQUESTED_SOP_CLASS_UID).map(|s| s.to_string())
}

/// Read the SOP instance UID a C-STORE sub-operation affects.
pub fn affected_sop_instance_uid(obj: &InMemDicomObject) -> Option<String> {
    obj.string(AFFECTED_SOP_INSTANCE_UID).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_echo_rq_round_trips_through_command_set_bytes() {
        let rq = CEchoRq::builder()
            .message_id(7)
            .affected_sop_class_uid("1.2.840.10008.1.1")
            .build();
        let bytes = rq.into_dataset().unwrap();
        let obj = parse_command_set(&bytes).unwrap();
        assert_eq!(command_field_of(&obj).unwrap(), CommandField::CEchoRq);
        assert!(!has_dataset(&obj).unwrap());
    }

    #[test]
    fn c_echo_rsp_round_trips() {
        let rsp = CEchoRsp {
            message_id_being_responded_to: 7,
            affected_sop_class_uid: "1.2.840.10008.1.1".to_string(),
            status: Status::SUCCESS,
        };
        let bytes = rsp.clone().into_dataset().unwrap();
        let obj = parse_command_set(&bytes).unwrap();
        let decoded = CEchoRsp::from_dataset(&obj).unwrap();
        assert_eq!(decoded.message_id_being_responded_to, 7);
        assert!(decoded.status.is_success());
    }

    #[test]
    fn c_find_rsp_distinguishes_pending_from_final() {
        let pending = CFindRsp {
            message_id_being_responded_to: 1,
            affected_sop_class_uid: "1.2.840.10008.5.1.4.1.2.1.1".to_string(),
            status: Status::PENDING,
            has_dataset: true,
        };
        let bytes = pending.into_dataset().unwrap();
        let obj = parse_command_set(&bytes).unwrap();
        let decoded = CFindRsp::from_dataset(&obj).unwrap();
        assert!(decoded.status.is_pending());
        assert!(decoded.has_dataset);
    }

    #[test]
    fn sub_operations_rsp_carries_counters() {
        let rsp = SubOperationsRsp {
            message_id_being_responded_to: 3,
            affected_sop_class_uid: "1.2.840.10008.5.1.4.1.2.2.2".to_string(),
            status: Status::PENDING,
            has_dataset: false,
            remaining: 5,
            completed: 2,
            failed: 0,
            warning: 0,
        };
        let bytes = rsp.into_dataset(CommandField::CMoveRsp).unwrap();
        let obj = parse_command_set(&bytes).unwrap();
        let decoded = SubOperationsRsp::from_dataset(&obj).unwrap();
        assert_eq!(decoded.remaining, 5);
        assert_eq!(decoded.completed, 2);
    }
}
