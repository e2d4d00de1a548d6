//! File meta information: the 128-byte preamble, `DICM` magic, and the
//! group 0002 elements that announce how the rest of the stream (the
//! main data set) is encoded.

use std::io::Read;

use dcmkit_core::header::Header;
use dcmkit_core::tag::Tag;
use dcmkit_core::vr::VR;
use dcmkit_dictionary::STANDARD;
use dcmkit_transfer_syntax::Codec;
use snafu::ResultExt;

use crate::error::{self, Result};
use crate::stateful::StatefulDecoder;

const PREAMBLE_LEN: usize = 128;
const MAGIC: &[u8; 4] = b"DICM";

/// The decoded file meta group (0002,xxxx), always encoded as Explicit
/// VR Little Endian regardless of the main data set's transfer syntax.
#[derive(Debug, Clone)]
pub struct FileMetaTable {
    /// (0002,0001) FileMetaInformationVersion, two bytes identifying the
    /// version of the file meta information (currently always `[0, 1]`).
    pub file_meta_information_version: Vec<u8>,
    /// (0002,0002) MediaStorageSOPClassUID.
    pub media_storage_sop_class_uid: String,
    /// (0002,0003) MediaStorageSOPInstanceUID.
    pub media_storage_sop_instance_uid: String,
    /// (0002,0010) TransferSyntaxUID, governing the main data set.
    pub transfer_syntax_uid: String,
    /// (0002,0012) ImplementationClassUID.
    pub implementation_class_uid: String,
    /// (0002,0013) ImplementationVersionName, if present.
    pub implementation_version_name: Option<String>,
    /// (0002,0016) SourceApplicationEntityTitle, if present.
    pub source_application_entity_title: Option<String>,
}

/// Reads the 128-byte preamble, `DICM` magic, and file meta group from
/// `source`, positioning it at the start of the main data set on
/// success.
pub fn read_preamble_and_meta<R: Read>(mut source: R) -> Result<FileMetaTable> {
    let mut preamble = [0u8; PREAMBLE_LEN];
    source
        .read_exact(&mut preamble)
        .context(error::IoSnafu { context: "preamble" })
        .map_err(|_| crate::error::Error::NotDicom)?;

    let mut magic = [0u8; 4];
    source
        .read_exact(&mut magic)
        .context(error::IoSnafu { context: "DICM magic" })
        .map_err(|_| crate::error::Error::NotDicom)?;
    if &magic != MAGIC {
        return Err(crate::error::Error::NotDicom);
    }

    read_meta_group(source)
}

/// Reads the file meta group directly, without a preceding preamble or
/// magic (used when a caller has already positioned the stream, e.g.
/// network associations which never carry Part 10 framing for meta).
pub fn read_meta_group<R: Read>(source: R) -> Result<FileMetaTable> {
    let decoder = Codec::ExplicitVRLittleEndian.decoder();
    let mut stateful = StatefulDecoder::new(source, decoder, &*STANDARD);

    let mut file_meta_information_version = None;
    let mut media_storage_sop_class_uid = None;
    let mut media_storage_sop_instance_uid = None;
    let mut transfer_syntax_uid = None;
    let mut implementation_class_uid = None;
    let mut implementation_version_name = None;
    let mut source_application_entity_title = None;

    let mut group_length: Option<u32> = None;
    let mut group_body_start: u64 = 0;

    loop {
        if let Some(len) = group_length {
            if stateful.bytes_read() - group_body_start >= u64::from(len) {
                break;
            }
        }

        let header = match stateful.decode_header() {
            Ok(h) => h,
            Err(_) if group_length.is_none() => break,
            Err(e) => return Err(e),
        };

        if header.tag.group() != 0x0002 {
            break;
        }

        let value = stateful.read_value(header)?;

        match header.tag {
            Tag(0x0002, 0x0000) => {
                group_length = value.to_i32().map(|v| v as u32);
                group_body_start = stateful.bytes_read();
            }
            Tag(0x0002, 0x0001) => file_meta_information_version = Some(bytes_of(&value)),
            Tag(0x0002, 0x0002) => media_storage_sop_class_uid = Some(text_of(&value)),
            Tag(0x0002, 0x0003) => media_storage_sop_instance_uid = Some(text_of(&value)),
            Tag(0x0002, 0x0010) => transfer_syntax_uid = Some(text_of(&value)),
            Tag(0x0002, 0x0012) => implementation_class_uid = Some(text_of(&value)),
            Tag(0x0002, 0x0013) => implementation_version_name = Some(text_of(&value)),
            Tag(0x0002, 0x0016) => source_application_entity_title = Some(text_of(&value)),
            _ => {
                tracing::debug!(tag = %header.tag, "skipping unrecognized file meta element");
            }
        }
    }

    Ok(FileMetaTable {
        file_meta_information_version: file_meta_information_version.ok_or(
            crate::error::Error::MissingMetaElement {
                keyword: "FileMetaInformationVersion",
            },
        )?,
        media_storage_sop_class_uid: media_storage_sop_class_uid.ok_or(
            crate::error::Error::MissingMetaElement {
                keyword: "MediaStorageSOPClassUID",
            },
        )?,
        media_storage_sop_instance_uid: media_storage_sop_instance_uid.ok_or(
            crate::error::Error::MissingMetaElement {
                keyword: "MediaStorageSOPInstanceUID",
            },
        )?,
        transfer_syntax_uid: transfer_syntax_uid.ok_or(crate::error::Error::MissingMetaElement {
            keyword: "TransferSyntaxUID",
        })?,
        implementation_class_uid: implementation_class_uid.unwrap_or_default(),
        implementation_version_name,
        source_application_entity_title,
    })
}

fn text_of(value: &dcmkit_core::PrimitiveValue) -> String {
    value.to_str().trim().to_string()
}

fn bytes_of(value: &dcmkit_core::PrimitiveValue) -> Vec<u8> {
    match value {
        dcmkit_core::PrimitiveValue::U8(c) => c.to_vec(),
        _ => Vec::new(),
    }
}

/// Wrap a reader in zlib inflation, for the Deflated Explicit VR Little
/// Endian transfer syntax, which deflates the main data set (but never
/// the file meta group) without a zlib header or Adler-32 checksum.
pub fn inflate_dataset<R: Read>(source: R) -> impl Read {
    flate2::read::DeflateDecoder::new(source)
}

/// Whether a VR is one this toolkit expects to see inside the file meta
/// group (used only for documentation/debug purposes; meta decoding
/// accepts whatever VR the stream declares).
pub fn is_meta_vr(vr: VR) -> bool {
    matches!(vr, VR::UI | VR::UL | VR::OB | VR::SH | VR::AE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        // (0002,0000) UL len 4: group length placeholder, filled below.
        let group_start = bytes.len();
        bytes.extend_from_slice(&[0x02, 0x00, 0x00, 0x00, b'U', b'L', 0x04, 0x00, 0, 0, 0, 0]);
        let body_start = bytes.len();

        // (0002,0001) OB len 2, padded to even with a reserved byte pair
        bytes.extend_from_slice(&[0x02, 0x00, 0x01, 0x00, b'O', b'B', 0x00, 0x00]);
        bytes.extend_from_slice(&(2u32).to_le_bytes());
        bytes.extend_from_slice(&[0x00, 0x01]);

        // (0002,0002) UI len 2 "1\0"
        bytes.extend_from_slice(&[0x02, 0x00, 0x02, 0x00, b'U', b'I', 0x02, 0x00, b'1', 0]);
        // (0002,0003) UI len 2 "2\0"
        bytes.extend_from_slice(&[0x02, 0x00, 0x03, 0x00, b'U', b'I', 0x02, 0x00, b'2', 0]);
        // (0002,0010) UI len 18 "1.2.840.10008.1.2\0" (implicit VR LE)
        let ts = b"1.2.840.10008.1.2\0";
        bytes.extend_from_slice(&[0x02, 0x00, 0x10, 0x00, b'U', b'I']);
        bytes.extend_from_slice(&(ts.len() as u16).to_le_bytes());
        bytes.extend_from_slice(ts);

        let group_len = (bytes.len() - body_start) as u32;
        bytes[group_start + 8..group_start + 12].copy_from_slice(&group_len.to_le_bytes());
        bytes
    }

    #[test]
    fn reads_required_meta_fields() {
        let bytes = sample_meta_bytes();
        let meta = read_meta_group(&bytes[..]).unwrap();
        assert_eq!(meta.file_meta_information_version, vec![0x00, 0x01]);
        assert_eq!(meta.media_storage_sop_class_uid, "1");
        assert_eq!(meta.media_storage_sop_instance_uid, "2");
        assert_eq!(meta.transfer_syntax_uid, "1.2.840.10008.1.2");
    }

    #[test]
    fn rejects_stream_without_dicm_magic() {
        let bytes = vec![0u8; 128 + 4];
        let err = read_preamble_and_meta(&bytes[..]).unwrap_err();
        assert!(matches!(err, crate::error::Error::NotDicom));
    }
}
