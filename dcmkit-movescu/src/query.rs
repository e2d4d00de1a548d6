//! Parsing `-k keyword=value` / `-k gggg,eeee=value` query key arguments
//! into a move identifier data set.

use dcmkit_core::tag::Tag;
use dcmkit_core::vr::VR;
use dcmkit_core::{DataDictionary, PrimitiveValue};
use dcmkit_dictionary::STANDARD;
use dcmkit_object::InMemDicomObject;
use snafu::Snafu;

/// Errors parsing a `-k` query key argument.
#[derive(Debug, Snafu)]
pub enum QueryKeyError {
    #[snafu(display("query key '{input}' is missing '='"))]
    MissingEquals { input: String },
    #[snafu(display("unrecognized tag '{tag}'"))]
    UnknownTag { tag: String },
    #[snafu(display("'{text}' is not a valid group,element tag"))]
    MalformedTag { text: String },
}

/// Parse one `-k` argument of the form `keyword=value` or
/// `gggg,eeee=value` and insert it (empty-valued, i.e. a universal
/// matching key, if `value` is empty) into `identifier`.
pub fn apply_query_key(identifier: &mut InMemDicomObject, input: &str) -> Result<(), QueryKeyError> {
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| QueryKeyError::MissingEquals { input: input.to_string() })?;

    let tag = resolve_tag(key)?;
    let vr = STANDARD.vr_of(tag);
    let primitive = if value.is_empty() {
        PrimitiveValue::Empty
    } else {
        PrimitiveValue::from(value.to_string())
    };
    identifier.put_primitive(tag, vr, primitive);
    Ok(())
}

fn resolve_tag(key: &str) -> Result<Tag, QueryKeyError> {
    if let Some((group, element)) = key.split_once(',') {
        let group = u16::from_str_radix(group.trim(), 16).map_err(|_| QueryKeyError::MalformedTag { text: key.to_string() })?;
        let element = u16::from_str_radix(element.trim(), 16).map_err(|_| QueryKeyError::MalformedTag { text: key.to_string() })?;
        return Ok(Tag(group, element));
    }
    dcmkit_dictionary::tags::by_keyword(key)
        .map(|e| e.tag)
        .ok_or_else(|| QueryKeyError::UnknownTag { tag: key.to_string() })
}

/// The query/retrieve level a C-MOVE operates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum QueryLevel {
    Patient,
    Study,
    Series,
    Instance,
}

impl QueryLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryLevel::Patient => "PATIENT",
            QueryLevel::Study => "STUDY",
            QueryLevel::Series => "SERIES",
            QueryLevel::Instance => "IMAGE",
        }
    }
}

/// Build a move identifier data set from a query level and a list of
/// `-k` arguments, always including `(0008,0052) QueryRetrieveLevel`.
pub fn build_identifier(level: QueryLevel, keys: &[String]) -> Result<InMemDicomObject, QueryKeyError> {
    let mut identifier = InMemDicomObject::new();
    identifier.put_primitive(Tag(0x0008, 0x0052), VR::CS, PrimitiveValue::from(level.as_str().to_string()));
    for key in keys {
        apply_query_key(&mut identifier, key)?;
    }
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_keyword_tags() {
        let mut id = InMemDicomObject::new();
        apply_query_key(&mut id, "StudyInstanceUID=1.2.3").unwrap();
        assert_eq!(id.string(Tag(0x0020, 0x000d)).unwrap(), "1.2.3");
    }

    #[test]
    fn build_identifier_sets_query_retrieve_level() {
        let id = build_identifier(QueryLevel::Series, &[]).unwrap();
        assert_eq!(id.string(Tag(0x0008, 0x0052)).unwrap(), "SERIES");
    }

    #[test]
    fn rejects_unknown_keyword() {
        let mut id = InMemDicomObject::new();
        assert!(apply_query_key(&mut id, "NotARealKeyword=x").is_err());
    }
}
