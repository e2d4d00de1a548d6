//! Whole Part 10 files: file meta information plus a main data set.

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use dcmkit_parser::meta::{inflate_dataset, read_preamble_and_meta, FileMetaTable};
use dcmkit_transfer_syntax::{Codec, REGISTRY};

use crate::error::{self, Result};
use crate::mem::InMemDicomObject;

/// A complete DICOM Part 10 object: file meta information plus the main
/// data set it describes.
#[derive(Debug, Clone)]
pub struct FileDicomObject {
    /// The file meta group.
    pub meta: FileMetaTable,
    /// The main data set, decoded under the transfer syntax named in
    /// `meta`.
    pub dataset: InMemDicomObject,
}

/// Open and parse a DICOM Part 10 file from disk.
pub fn open_file<P: AsRef<Path>>(path: P) -> Result<FileDicomObject> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| error::Error::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_file(BufReader::new(file))
}

/// Parse a DICOM Part 10 stream: preamble, `DICM` magic, file meta, and
/// main data set.
pub fn parse_file<R: Read>(source: R) -> Result<FileDicomObject> {
    let mut source = source;
    let meta = read_preamble_and_meta(&mut source)?;
    let codec = codec_for(&meta.transfer_syntax_uid)?;

    let ts = REGISTRY
        .get(&meta.transfer_syntax_uid)
        .expect("codec_for already validated this UID is registered");

    let dataset = if ts.deflated {
        let inflated = inflate_dataset(source);
        InMemDicomObject::parse_dataset(inflated, codec)?
    } else {
        InMemDicomObject::parse_dataset(source, codec)?
    };

    Ok(FileDicomObject { meta, dataset })
}

fn codec_for(uid: &str) -> Result<Codec> {
    let ts = REGISTRY
        .get(uid)
        .ok_or_else(|| error::Error::UnknownTransferSyntax { uid: uid.to_string() })?;
    if ts.encapsulated_pixel_data {
        return Err(error::Error::UnknownTransferSyntax {
            uid: uid.to_string(),
        });
    }
    Ok(ts.codec)
}

/// Write a complete Part 10 file: preamble, `DICM` magic, file meta
/// group, and main data set.
pub fn write_file<W: Write>(sink: &mut W, object: &FileDicomObject) -> Result<()> {
    sink.write_all(&[0u8; 128]).map_err(|source| error::Error::Io {
        path: "<sink>".to_string(),
        source,
    })?;
    sink.write_all(b"DICM").map_err(|source| error::Error::Io {
        path: "<sink>".to_string(),
        source,
    })?;

    let mut meta_obj = InMemDicomObject::new();
    meta_obj.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0001),
        dcmkit_core::vr::VR::OB,
        dcmkit_core::PrimitiveValue::U8(dcmkit_core::value::primitive::C::from_vec(
            object.meta.file_meta_information_version.clone(),
        )),
    );
    meta_obj.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0002),
        dcmkit_core::vr::VR::UI,
        dcmkit_core::PrimitiveValue::from(object.meta.media_storage_sop_class_uid.clone()),
    );
    meta_obj.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0003),
        dcmkit_core::vr::VR::UI,
        dcmkit_core::PrimitiveValue::from(object.meta.media_storage_sop_instance_uid.clone()),
    );
    meta_obj.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0010),
        dcmkit_core::vr::VR::UI,
        dcmkit_core::PrimitiveValue::from(object.meta.transfer_syntax_uid.clone()),
    );
    meta_obj.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0012),
        dcmkit_core::vr::VR::UI,
        dcmkit_core::PrimitiveValue::from(object.meta.implementation_class_uid.clone()),
    );

    let mut meta_bytes = Vec::new();
    meta_obj.encode_dataset(&mut meta_bytes, Codec::ExplicitVRLittleEndian)?;

    let mut group_length = InMemDicomObject::new();
    group_length.put_primitive(
        dcmkit_core::tag::Tag(0x0002, 0x0000),
        dcmkit_core::vr::VR::UL,
        dcmkit_core::PrimitiveValue::from(meta_bytes.len() as u32),
    );
    group_length.encode_dataset(&mut *sink, Codec::ExplicitVRLittleEndian)?;
    sink.write_all(&meta_bytes).map_err(|source| error::Error::Io {
        path: "<sink>".to_string(),
        source,
    })?;

    let codec = codec_for(&object.meta.transfer_syntax_uid)?;
    object.dataset.encode_dataset(sink, codec)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_minimal_file() {
        let meta = FileMetaTable {
            file_meta_information_version: vec![0x00, 0x01],
            media_storage_sop_class_uid: "1.2.840.10008.5.1.4.1.1.7".to_string(),
            media_storage_sop_instance_uid: "1.2.3.4".to_string(),
            transfer_syntax_uid: "1.2.840.10008.1.2.1".to_string(),
            implementation_class_uid: "1.2.3.4.5".to_string(),
            implementation_version_name: None,
            source_application_entity_title: None,
        };
        let mut dataset = InMemDicomObject::new();
        dataset.put_primitive(
            dcmkit_core::tag::Tag(0x0010, 0x0010),
            dcmkit_core::vr::VR::PN,
            dcmkit_core::PrimitiveValue::from("Doe^John".to_string()),
        );
        let object = FileDicomObject { meta, dataset };

        let mut bytes = Vec::new();
        write_file(&mut bytes, &object).unwrap();

        let parsed = parse_file(&bytes[..]).unwrap();
        assert_eq!(parsed.meta.transfer_syntax_uid, "1.2.840.10008.1.2.1");
        assert_eq!(
            parsed.dataset.string(dcmkit_core::tag::Tag(0x0010, 0x0010)).unwrap(),
            "Doe^John"
        );
    }
}
