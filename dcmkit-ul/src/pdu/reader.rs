//! Decoding Upper Layer PDUs from a byte stream.
//!
//! Every integer in the Upper Layer protocol, PDU length fields included,
//! is big-endian, regardless of the transfer syntax negotiated for the
//! data sets the PDUs carry.

use std::io::Read;

use snafu::ResultExt;

use super::*;
use crate::error::{self, Result};

/// The maximum total PDU length this toolkit will allocate a buffer for,
/// regardless of what a peer claims in a PDU header. Guards against a
/// malicious or corrupt peer asking for an unbounded allocation.
pub const MAXIMUM_PDU_SIZE: u32 = 131_072;

fn read_u8<R: Read + ?Sized>(source: &mut R) -> Result<u8> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf).context(error::ReadPduSnafu)?;
    Ok(buf[0])
}

fn read_u16<R: Read + ?Sized>(source: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    source.read_exact(&mut buf).context(error::ReadPduSnafu)?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32<R: Read + ?Sized>(source: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf).context(error::ReadPduSnafu)?;
    Ok(u32::from_be_bytes(buf))
}

fn read_exact_vec<R: Read + ?Sized>(source: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    source.read_exact(&mut buf).context(error::ReadPduSnafu)?;
    Ok(buf)
}

fn read_ae_title<R: Read + ?Sized>(source: &mut R) -> Result<String> {
    let bytes = read_exact_vec(source, 16)?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn read_uid_field<R: Read + ?Sized>(source: &mut R, len: usize) -> Result<String> {
    let bytes = read_exact_vec(source, len)?;
    let text = String::from_utf8_lossy(&bytes);
    Ok(text.trim_end_matches(['\0', ' ']).to_string())
}

/// Read one complete PDU from `source`, rejecting any whose declared
/// length exceeds `max_pdu_length`.
pub fn read_pdu<R: Read>(source: &mut R, max_pdu_length: u32) -> Result<Pdu> {
    let pdu_type = read_u8(source)?;
    let _reserved = read_u8(source)?;
    let length = read_u32(source)?;
    let limit = max_pdu_length.min(MAXIMUM_PDU_SIZE);
    if length > limit {
        return Err(error::Error::PduTooLarge { length, max: limit });
    }
    let body = read_exact_vec(source, length as usize)?;
    let mut cursor: &[u8] = &body;

    match pdu_type {
        0x01 => Ok(Pdu::AssociateRQ(read_associate_rq(&mut cursor)?)),
        0x02 => Ok(Pdu::AssociateAC(read_associate_ac(&mut cursor)?)),
        0x03 => read_associate_rj(&mut cursor),
        0x04 => Ok(Pdu::PData { data: read_pdata(&mut cursor, length)? }),
        0x05 => Ok(Pdu::ReleaseRQ),
        0x06 => Ok(Pdu::ReleaseRP),
        0x07 => read_abort(&mut cursor),
        other => Err(error::Error::UnknownPduType { pdu_type: other }),
    }
}

fn read_associate_rq(source: &mut &[u8]) -> Result<AssociateRQ> {
    let protocol_version = read_u16(source)?;
    let _reserved = read_u16(source)?;
    let called_ae_title = read_ae_title(source)?;
    let calling_ae_title = read_ae_title(source)?;
    let _reserved2 = read_exact_vec(source, 32)?;

    let mut application_context_name = String::new();
    let mut presentation_contexts = Vec::new();
    let mut user_variables = Vec::new();

    while !source.is_empty() {
        let item_type = read_u8(source)?;
        let _reserved = read_u8(source)?;
        let item_len = read_u16(source)? as usize;
        let mut item_body = read_exact_vec(source, item_len)?;
        let item_body: &mut &[u8] = &mut &item_body[..];
        match item_type {
            0x10 => application_context_name = read_uid_field(item_body, item_len)?,
            0x20 => presentation_contexts.push(read_presentation_context_rq(item_body)?),
            0x50 => user_variables = read_user_information(item_body)?,
            other => {
                return Err(error::Error::UnknownItemType { item_type: other });
            }
        }
    }

    Ok(AssociateRQ {
        protocol_version,
        called_ae_title,
        calling_ae_title,
        application_context_name,
        presentation_contexts,
        user_variables,
    })
}

fn read_presentation_context_rq(source: &mut &[u8]) -> Result<PresentationContextProposed> {
    let id = read_u8(source)?;
    let _reserved = read_exact_vec(source, 3)?;

    let mut abstract_syntax = String::new();
    let mut transfer_syntaxes = Vec::new();
    while !source.is_empty() {
        let sub_type = read_u8(source)?;
        let _reserved = read_u8(source)?;
        let sub_len = read_u16(source)? as usize;
        let sub_body = read_exact_vec(source, sub_len)?;
        match sub_type {
            0x30 => abstract_syntax = read_uid_field(&mut &sub_body[..], sub_len)?,
            0x40 => transfer_syntaxes.push(read_uid_field(&mut &sub_body[..], sub_len)?),
            other => return Err(error::Error::UnknownItemType { item_type: other }),
        }
    }

    Ok(PresentationContextProposed {
        id,
        abstract_syntax,
        transfer_syntaxes,
    })
}

fn read_user_information(source: &mut &[u8]) -> Result<Vec<UserVariableItem>> {
    let mut items = Vec::new();
    while !source.is_empty() {
        let item_type = read_u8(source)?;
        let _reserved = read_u8(source)?;
        let item_len = read_u16(source)? as usize;
        let body = read_exact_vec(source, item_len)?;
        items.push(match item_type {
            0x51 => {
                let mut b: &[u8] = &body;
                UserVariableItem::MaxLength(read_u32(&mut b)?)
            }
            0x52 => UserVariableItem::ImplementationClassUID(read_uid_field(&mut &body[..], item_len)?),
            0x55 => UserVariableItem::ImplementationVersionName(read_uid_field(&mut &body[..], item_len)?),
            other => UserVariableItem::Unknown { item_type: other, data: body },
        });
    }
    Ok(items)
}

fn read_associate_ac(source: &mut &[u8]) -> Result<AssociateAC> {
    let protocol_version = read_u16(source)?;
    let _reserved = read_u16(source)?;
    // The AC PDU echoes the called/calling AE titles in the same fixed
    // fields, byte-for-byte, even though they carry no semantic meaning
    // on the response.
    let called_ae_title = read_ae_title(source)?;
    let calling_ae_title = read_ae_title(source)?;
    let _reserved2 = read_exact_vec(source, 32)?;

    let mut application_context_name = String::new();
    let mut presentation_contexts = Vec::new();
    let mut user_variables = Vec::new();

    while !source.is_empty() {
        let item_type = read_u8(source)?;
        let _reserved = read_u8(source)?;
        let item_len = read_u16(source)? as usize;
        let body = read_exact_vec(source, item_len)?;
        let item_body: &mut &[u8] = &mut &body[..];
        match item_type {
            0x10 => application_context_name = read_uid_field(item_body, item_len)?,
            0x21 => presentation_contexts.push(read_presentation_context_ac(item_body)?),
            0x50 => user_variables = read_user_information(item_body)?,
            other => return Err(error::Error::UnknownItemType { item_type: other }),
        }
    }

    Ok(AssociateAC {
        protocol_version,
        called_ae_title,
        calling_ae_title,
        application_context_name,
        presentation_contexts,
        user_variables,
    })
}

fn read_presentation_context_ac(source: &mut &[u8]) -> Result<PresentationContextResult> {
    let id = read_u8(source)?;
    let _reserved = read_u8(source)?;
    let reason_code = read_u8(source)?;
    let _reserved2 = read_u8(source)?;
    let reason = match reason_code {
        0 => PresentationContextResultReason::Acceptance,
        1 => PresentationContextResultReason::UserRejection,
        2 => PresentationContextResultReason::NoReason,
        3 => PresentationContextResultReason::AbstractSyntaxNotSupported,
        4 => PresentationContextResultReason::TransferSyntaxesNotSupported,
        other => {
            return Err(error::Error::Malformed {
                field: "presentation context result reason",
                reason: format!("unknown code {other}"),
            })
        }
    };

    let mut transfer_syntax = String::new();
    while !source.is_empty() {
        let sub_type = read_u8(source)?;
        let _reserved = read_u8(source)?;
        let sub_len = read_u16(source)? as usize;
        let sub_body = read_exact_vec(source, sub_len)?;
        match sub_type {
            0x40 => transfer_syntax = read_uid_field(&mut &sub_body[..], sub_len)?,
            other => return Err(error::Error::UnknownItemType { item_type: other }),
        }
    }

    Ok(PresentationContextResult {
        id,
        reason,
        transfer_syntax,
    })
}

fn read_associate_rj(source: &mut &[u8]) -> Result<Pdu> {
    let _reserved = read_u8(source)?;
    let result_code = read_u8(source)?;
    let source_code = read_u8(source)?;
    let reason_code = read_u8(source)?;

    let result = match result_code {
        1 => AssociationRJResult::RejectedPermanent,
        2 => AssociationRJResult::RejectedTransient,
        other => {
            return Err(error::Error::Malformed {
                field: "association rejection result",
                reason: format!("unknown code {other}"),
            })
        }
    };

    let rj_source = match source_code {
        1 => AssociationRJSource::ServiceUser(match reason_code {
            1 => AssociationRJServiceUserReason::NoReasonGiven,
            2 => AssociationRJServiceUserReason::ApplicationContextNameNotSupported,
            3 => AssociationRJServiceUserReason::CallingAETitleNotRecognized,
            7 => AssociationRJServiceUserReason::CalledAETitleNotRecognized,
            _ => AssociationRJServiceUserReason::NoReasonGiven,
        }),
        2 => AssociationRJSource::ServiceProviderAcse(match reason_code {
            2 => AssociationRJServiceProviderAcseReason::ProtocolVersionNotSupported,
            _ => AssociationRJServiceProviderAcseReason::NoReasonGiven,
        }),
        3 => AssociationRJSource::ServiceProviderPresentation(match reason_code {
            2 => AssociationRJServiceProviderPresentationReason::LocalLimitExceeded,
            _ => AssociationRJServiceProviderPresentationReason::TemporaryCongestion,
        }),
        other => {
            return Err(error::Error::Malformed {
                field: "association rejection source",
                reason: format!("unknown code {other}"),
            })
        }
    };

    Ok(Pdu::AssociateRJ {
        result,
        source: rj_source,
    })
}

fn read_pdata(source: &mut &[u8], total_len: u32) -> Result<Vec<PDataValue>> {
    let mut remaining = total_len as i64;
    let mut values = Vec::new();
    while remaining > 0 {
        let item_len = read_u32(source)?;
        let presentation_context_id = read_u8(source)?;
        let control_byte = read_u8(source)?;
        let (value_type, is_last) = PDataValueType::from_control_byte(control_byte);
        let data_len = (item_len as usize).checked_sub(2).ok_or(error::Error::Malformed {
            field: "P-DATA-TF item length",
            reason: format!("{item_len} is too short to cover the presentation context id and control byte"),
        })?;
        let data = read_exact_vec(source, data_len)?;
        remaining -= 4 + item_len as i64;
        values.push(PDataValue {
            presentation_context_id,
            data,
            value_type,
            is_last,
        });
    }
    Ok(values)
}

fn read_abort(source: &mut &[u8]) -> Result<Pdu> {
    let _reserved = read_u8(source)?;
    let _reserved2 = read_u8(source)?;
    let source_code = read_u8(source)?;
    let reason_code = read_u8(source)?;

    let abort_source = match source_code {
        0 => AbortRQSource::ServiceUser,
        2 => AbortRQSource::ServiceProvider(match reason_code {
            0 => AbortRQServiceProviderReason::ReasonNotSpecified,
            1 => AbortRQServiceProviderReason::UnrecognizedPdu,
            2 => AbortRQServiceProviderReason::UnexpectedPdu,
            4 => AbortRQServiceProviderReason::UnrecognizedPduParameter,
            5 => AbortRQServiceProviderReason::UnexpectedPduParameter,
            6 => AbortRQServiceProviderReason::InvalidPduParameterValue,
            _ => AbortRQServiceProviderReason::ReasonNotSpecified,
        }),
        _ => AbortRQSource::ServiceUser,
    };

    Ok(Pdu::Abort { source: abort_source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdu::writer::write_pdu;

    #[test]
    fn round_trips_release_rq_and_rp() {
        let mut buf = Vec::new();
        write_pdu(&mut buf, &Pdu::ReleaseRQ).unwrap();
        let decoded = read_pdu(&mut &buf[..], MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(decoded, Pdu::ReleaseRQ);

        let mut buf = Vec::new();
        write_pdu(&mut buf, &Pdu::ReleaseRP).unwrap();
        let decoded = read_pdu(&mut &buf[..], MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(decoded, Pdu::ReleaseRP);
    }

    #[test]
    fn round_trips_abort() {
        let pdu = Pdu::Abort {
            source: AbortRQSource::ServiceProvider(AbortRQServiceProviderReason::UnexpectedPdu),
        };
        let mut buf = Vec::new();
        write_pdu(&mut buf, &pdu).unwrap();
        let decoded = read_pdu(&mut &buf[..], MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn round_trips_associate_rq() {
        let pdu = Pdu::AssociateRQ(AssociateRQ {
            protocol_version: 1,
            called_ae_title: "STORESCP".to_string(),
            calling_ae_title: "STORESCU".to_string(),
            application_context_name: APPLICATION_CONTEXT_NAME.to_string(),
            presentation_contexts: vec![PresentationContextProposed {
                id: 1,
                abstract_syntax: "1.2.840.10008.1.1".to_string(),
                transfer_syntaxes: vec!["1.2.840.10008.1.2".to_string()],
            }],
            user_variables: vec![
                UserVariableItem::MaxLength(16_384),
                UserVariableItem::ImplementationClassUID("1.2.3.4".to_string()),
            ],
        });
        let mut buf = Vec::new();
        write_pdu(&mut buf, &pdu).unwrap();
        let decoded = read_pdu(&mut &buf[..], MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn round_trips_pdata() {
        let pdu = Pdu::PData {
            data: vec![PDataValue {
                presentation_context_id: 1,
                data: vec![1, 2, 3, 4],
                value_type: PDataValueType::Command,
                is_last: true,
            }],
        };
        let mut buf = Vec::new();
        write_pdu(&mut buf, &pdu).unwrap();
        let decoded = read_pdu(&mut &buf[..], MAXIMUM_PDU_SIZE).unwrap();
        assert_eq!(decoded, pdu);
    }

    #[test]
    fn rejects_pdu_over_the_negotiated_max() {
        let mut buf = Vec::new();
        write_pdu(&mut buf, &Pdu::ReleaseRQ).unwrap();
        let err = read_pdu(&mut &buf[..], 0).unwrap_err();
        assert!(matches!(err, error::Error::PduTooLarge { .. }));
    }
}
