//! Generic traits describing a DICOM data dictionary, implemented
//! concretely by `dcmkit-dictionary` and consumed by the parser and object
//! crates without a hard dependency on any particular dictionary.

use crate::tag::Tag;
use crate::vr::VR;

/// A single dictionary entry: the metadata known about a tag or a range
/// of repeating tags (the "ggxx"/"eexx" group patterns of private and
/// repeating public attributes).
pub trait DictionaryEntry {
    /// The attribute's keyword, e.g. `"PatientName"`.
    fn keyword(&self) -> &str;

    /// The attribute's human-readable name, e.g. `"Patient's Name"`.
    fn alias(&self) -> &str {
        self.keyword()
    }

    /// The VR this attribute is normally encoded with. Multi-VR entries
    /// (rare) resolve to their first alternative.
    fn vr(&self) -> VR;
}

/// A source of attribute metadata, keyed by [`Tag`] or by keyword.
pub trait DataDictionary {
    /// A concrete entry type returned by lookups.
    type Entry: DictionaryEntry;

    /// Look up an entry by tag, accounting for repeating group patterns.
    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry>;

    /// Look up an entry by its keyword (case sensitive, as written in
    /// PS3.6).
    fn by_name(&self, name: &str) -> Option<&Self::Entry>;

    /// Determine the best-effort VR for an unrecognized tag, per spec:
    /// unknown tags resolve to VR::UN rather than an error.
    fn vr_of(&self, tag: Tag) -> VR {
        self.by_tag(tag).map(|e| e.vr()).unwrap_or(VR::UN)
    }
}

impl<'a, T: DataDictionary> DataDictionary for &'a T {
    type Entry = T::Entry;

    fn by_tag(&self, tag: Tag) -> Option<&Self::Entry> {
        (**self).by_tag(tag)
    }

    fn by_name(&self, name: &str) -> Option<&Self::Entry> {
        (**self).by_name(name)
    }
}
