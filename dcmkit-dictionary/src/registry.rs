//! The standard data dictionary singleton.

use std::collections::HashMap;

use dcmkit_core::dictionary::{DataDictionary, DictionaryEntry};
use dcmkit_core::tag::Tag;
use dcmkit_core::vr::VR;
use once_cell::sync::Lazy;

use crate::tags::{self, Entry};

/// A dictionary entry returned by [`StandardDataDictionary`]: either a
/// reference into the curated [`tags::ENTRIES`] table, or a synthetic
/// entry for group-length, private-creator, or unrecognized tags.
#[derive(Debug, Clone, Copy)]
pub struct StandardEntry {
    keyword: &'static str,
    vr: VR,
}

impl DictionaryEntry for StandardEntry {
    fn keyword(&self) -> &str {
        self.keyword
    }

    fn vr(&self) -> VR {
        self.vr
    }
}

const GROUP_LENGTH: StandardEntry = StandardEntry {
    keyword: "GenericGroupLength",
    vr: VR::UL,
};

const PRIVATE_CREATOR: StandardEntry = StandardEntry {
    keyword: "PrivateCreator",
    vr: VR::LO,
};

const UNKNOWN: StandardEntry = StandardEntry {
    keyword: "Unknown",
    vr: VR::UN,
};

impl From<&Entry> for StandardEntry {
    fn from(e: &Entry) -> Self {
        StandardEntry {
            keyword: e.keyword,
            vr: e.vr,
        }
    }
}

/// The standard DICOM data dictionary: a curated subset of PS3.6 plus the
/// structural fallbacks (group length, private creator, unknown) that
/// apply to any tag.
pub struct StandardDataDictionary {
    by_tag: HashMap<Tag, StandardEntry>,
}

/// The process-wide standard dictionary instance.
pub static STANDARD: Lazy<StandardDataDictionary> = Lazy::new(StandardDataDictionary::build);

impl StandardDataDictionary {
    fn build() -> Self {
        let by_tag = tags::ENTRIES
            .iter()
            .map(|e| (e.tag, StandardEntry::from(e)))
            .collect();
        StandardDataDictionary { by_tag }
    }
}

impl Default for StandardDataDictionary {
    fn default() -> Self {
        StandardDataDictionary::build()
    }
}

impl DataDictionary for StandardDataDictionary {
    type Entry = StandardEntry;

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        if let Some(entry) = self.by_tag.get(&tag) {
            return Some(entry);
        }
        if tag.is_group_length() {
            return Some(&GROUP_LENGTH);
        }
        if tag.is_private_creator() {
            return Some(&PRIVATE_CREATOR);
        }
        None
    }

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        // the curated table is small enough that re-deriving the static
        // entry on each call is cheap and avoids a second index.
        let entry = tags::by_keyword(name)?;
        self.by_tag.get(&entry.tag)
    }

    fn vr_of(&self, tag: Tag) -> VR {
        self.by_tag(tag).map(|e| e.vr()).unwrap_or(UNKNOWN.vr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_tag_resolves() {
        let entry = STANDARD.by_tag(Tag(0x0010, 0x0010)).unwrap();
        assert_eq!(entry.keyword(), "PatientName");
        assert_eq!(entry.vr(), VR::PN);
    }

    #[test]
    fn unknown_tag_falls_back_to_un() {
        let unknown_tag = Tag(0x0009, 0x9999);
        assert!(STANDARD.by_tag(unknown_tag).is_none());
        assert_eq!(STANDARD.vr_of(unknown_tag), VR::UN);
    }

    #[test]
    fn group_length_is_recognized_for_any_group() {
        let entry = STANDARD.by_tag(Tag(0x0028, 0x0000)).unwrap();
        assert_eq!(entry.keyword(), "GenericGroupLength");
    }

    #[test]
    fn private_creator_is_recognized() {
        let entry = STANDARD.by_tag(Tag(0x0009, 0x0010)).unwrap();
        assert_eq!(entry.keyword(), "PrivateCreator");
    }

    #[test]
    fn by_name_round_trips_with_by_tag() {
        let entry = STANDARD.by_name("PatientID").unwrap();
        assert_eq!(entry.vr(), VR::LO);
    }
}
