//! Encoding Upper Layer PDUs to a byte stream.

use std::io::Write;

use snafu::ResultExt;

use super::*;
use crate::error::{self, Result};

fn write_u8<W: Write + ?Sized>(sink: &mut W, v: u8) -> Result<()> {
    sink.write_all(&[v]).context(error::WritePduSnafu)
}

fn write_u16<W: Write + ?Sized>(sink: &mut W, v: u16) -> Result<()> {
    sink.write_all(&v.to_be_bytes()).context(error::WritePduSnafu)
}

fn write_u32<W: Write + ?Sized>(sink: &mut W, v: u32) -> Result<()> {
    sink.write_all(&v.to_be_bytes()).context(error::WritePduSnafu)
}

fn write_ae_title<W: Write + ?Sized>(sink: &mut W, title: &str) -> Result<()> {
    let mut buf = [b' '; 16];
    let bytes = title.as_bytes();
    let n = bytes.len().min(16);
    buf[..n].copy_from_slice(&bytes[..n]);
    sink.write_all(&buf).context(error::WritePduSnafu)
}

fn write_uid_item<W: Write + ?Sized>(sink: &mut W, item_type: u8, uid: &str) -> Result<()> {
    let mut bytes = uid.as_bytes().to_vec();
    if bytes.len() % 2 != 0 {
        bytes.push(0);
    }
    write_u8(sink, item_type)?;
    write_u8(sink, 0)?;
    write_u16(sink, bytes.len() as u16)?;
    sink.write_all(&bytes).context(error::WritePduSnafu)
}

/// Write one complete PDU.
pub fn write_pdu<W: Write>(sink: &mut W, pdu: &Pdu) -> Result<()> {
    let mut body = Vec::new();
    let pdu_type = match pdu {
        Pdu::AssociateRQ(rq) => {
            write_associate_rq(&mut body, rq)?;
            0x01
        }
        Pdu::AssociateAC(ac) => {
            write_associate_ac(&mut body, ac)?;
            0x02
        }
        Pdu::AssociateRJ { result, source } => {
            write_associate_rj(&mut body, *result, source)?;
            0x03
        }
        Pdu::PData { data } => {
            write_pdata(&mut body, data)?;
            0x04
        }
        Pdu::ReleaseRQ => {
            body.extend_from_slice(&[0u8; 4]);
            0x05
        }
        Pdu::ReleaseRP => {
            body.extend_from_slice(&[0u8; 4]);
            0x06
        }
        Pdu::Abort { source } => {
            write_abort(&mut body, source)?;
            0x07
        }
    };

    write_u8(sink, pdu_type)?;
    write_u8(sink, 0)?;
    write_u32(sink, body.len() as u32)?;
    sink.write_all(&body).context(error::WritePduSnafu)
}

fn write_associate_rq<W: Write>(sink: &mut W, rq: &AssociateRQ) -> Result<()> {
    write_u16(sink, rq.protocol_version)?;
    write_u16(sink, 0)?;
    write_ae_title(sink, &rq.called_ae_title)?;
    write_ae_title(sink, &rq.calling_ae_title)?;
    sink.write_all(&[0u8; 32]).context(error::WritePduSnafu)?;

    write_uid_item(sink, 0x10, &rq.application_context_name)?;
    for pc in &rq.presentation_contexts {
        write_presentation_context_rq(sink, pc)?;
    }
    write_user_information(sink, &rq.user_variables)?;
    Ok(())
}

fn write_presentation_context_rq<W: Write>(sink: &mut W, pc: &PresentationContextProposed) -> Result<()> {
    let mut body = Vec::new();
    write_u8(&mut body, pc.id)?;
    body.extend_from_slice(&[0u8; 3]);
    write_uid_item(&mut body, 0x30, &pc.abstract_syntax)?;
    for ts in &pc.transfer_syntaxes {
        write_uid_item(&mut body, 0x40, ts)?;
    }

    write_u8(sink, 0x20)?;
    write_u8(sink, 0)?;
    write_u16(sink, body.len() as u16)?;
    sink.write_all(&body).context(error::WritePduSnafu)
}

fn write_user_information<W: Write>(sink: &mut W, items: &[UserVariableItem]) -> Result<()> {
    let mut body = Vec::new();
    for item in items {
        match item {
            UserVariableItem::MaxLength(len) => {
                write_u8(&mut body, 0x51)?;
                write_u8(&mut body, 0)?;
                write_u16(&mut body, 4)?;
                write_u32(&mut body, *len)?;
            }
            UserVariableItem::ImplementationClassUID(uid) => {
                write_uid_item(&mut body, 0x52, uid)?;
            }
            UserVariableItem::ImplementationVersionName(name) => {
                write_uid_item(&mut body, 0x55, name)?;
            }
            UserVariableItem::Unknown { item_type, data } => {
                write_u8(&mut body, *item_type)?;
                write_u8(&mut body, 0)?;
                write_u16(&mut body, data.len() as u16)?;
                body.extend_from_slice(data);
            }
        }
    }

    write_u8(sink, 0x50)?;
    write_u8(sink, 0)?;
    write_u16(sink, body.len() as u16)?;
    sink.write_all(&body).context(error::WritePduSnafu)
}

fn write_associate_ac<W: Write>(sink: &mut W, ac: &AssociateAC) -> Result<()> {
    write_u16(sink, ac.protocol_version)?;
    write_u16(sink, 0)?;
    write_ae_title(sink, &ac.called_ae_title)?;
    write_ae_title(sink, &ac.calling_ae_title)?;
    sink.write_all(&[0u8; 32]).context(error::WritePduSnafu)?;

    write_uid_item(sink, 0x10, &ac.application_context_name)?;
    for pc in &ac.presentation_contexts {
        write_presentation_context_ac(sink, pc)?;
    }
    write_user_information(sink, &ac.user_variables)?;
    Ok(())
}

fn write_presentation_context_ac<W: Write>(sink: &mut W, pc: &PresentationContextResult) -> Result<()> {
    let mut body = Vec::new();
    write_u8(&mut body, pc.id)?;
    write_u8(&mut body, 0)?;
    let reason_code = match pc.reason {
        PresentationContextResultReason::Acceptance => 0,
        PresentationContextResultReason::UserRejection => 1,
        PresentationContextResultReason::NoReason => 2,
        PresentationContextResultReason::AbstractSyntaxNotSupported => 3,
        PresentationContextResultReason::TransferSyntaxesNotSupported => 4,
    };
    write_u8(&mut body, reason_code)?;
    write_u8(&mut body, 0)?;
    write_uid_item(&mut body, 0x40, &pc.transfer_syntax)?;

    write_u8(sink, 0x21)?;
    write_u8(sink, 0)?;
    write_u16(sink, body.len() as u16)?;
    sink.write_all(&body).context(error::WritePduSnafu)
}

fn write_associate_rj<W: Write>(
    sink: &mut W,
    result: AssociationRJResult,
    source: &AssociationRJSource,
) -> Result<()> {
    write_u8(sink, 0)?;
    write_u8(
        sink,
        match result {
            AssociationRJResult::RejectedPermanent => 1,
            AssociationRJResult::RejectedTransient => 2,
        },
    )?;

    let (source_code, reason_code) = match source {
        AssociationRJSource::ServiceUser(reason) => (
            1,
            match reason {
                AssociationRJServiceUserReason::NoReasonGiven => 1,
                AssociationRJServiceUserReason::ApplicationContextNameNotSupported => 2,
                AssociationRJServiceUserReason::CallingAETitleNotRecognized => 3,
                AssociationRJServiceUserReason::CalledAETitleNotRecognized => 7,
            },
        ),
        AssociationRJSource::ServiceProviderAcse(reason) => (
            2,
            match reason {
                AssociationRJServiceProviderAcseReason::NoReasonGiven => 1,
                AssociationRJServiceProviderAcseReason::ProtocolVersionNotSupported => 2,
            },
        ),
        AssociationRJSource::ServiceProviderPresentation(reason) => (
            3,
            match reason {
                AssociationRJServiceProviderPresentationReason::TemporaryCongestion => 1,
                AssociationRJServiceProviderPresentationReason::LocalLimitExceeded => 2,
            },
        ),
    };
    write_u8(sink, source_code)?;
    write_u8(sink, reason_code)
}

fn write_pdata<W: Write>(sink: &mut W, values: &[PDataValue]) -> Result<()> {
    for pdv in values {
        let item_len = 2 + pdv.data.len() as u32;
        write_u32(sink, item_len)?;
        write_u8(sink, pdv.presentation_context_id)?;
        write_u8(sink, pdv.value_type.control_byte(pdv.is_last))?;
        sink.write_all(&pdv.data).context(error::WritePduSnafu)?;
    }
    Ok(())
}

fn write_abort<W: Write>(sink: &mut W, source: &AbortRQSource) -> Result<()> {
    write_u8(sink, 0)?;
    write_u8(sink, 0)?;
    let (source_code, reason_code) = match source {
        AbortRQSource::ServiceUser => (0, 0),
        AbortRQSource::ServiceProvider(reason) => (
            2,
            match reason {
                AbortRQServiceProviderReason::ReasonNotSpecified => 0,
                AbortRQServiceProviderReason::UnrecognizedPdu => 1,
                AbortRQServiceProviderReason::UnexpectedPdu => 2,
                AbortRQServiceProviderReason::UnrecognizedPduParameter => 4,
                AbortRQServiceProviderReason::UnexpectedPduParameter => 5,
                AbortRQServiceProviderReason::InvalidPduParameterValue => 6,
            },
        ),
    };
    write_u8(sink, source_code)?;
    write_u8(sink, reason_code)
}
