//! Text decoding for string-valued VRs.
//!
//! Only the default character repertoire (ISO-IR 6, effectively ASCII/
//! UTF-8 for the attributes this toolkit reads) is supported; the
//! `SpecificCharacterSet` (0008,0005) attribute is exposed but extended
//! repertoires (ISO 2022 escape sequences, multi-byte Asian charsets) are
//! not decoded.

/// The character repertoire declared by a dataset's
/// `SpecificCharacterSet` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecificCharacterSet {
    /// ISO-IR 6, the default repertoire used when the attribute is
    /// absent or empty.
    Default,
    /// Any other declared repertoire, decoded as UTF-8 best-effort.
    Other(String),
}

impl SpecificCharacterSet {
    /// Parse the value of a `SpecificCharacterSet` attribute.
    pub fn from_value(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == "ISO_IR 6" {
            SpecificCharacterSet::Default
        } else {
            SpecificCharacterSet::Other(trimmed.to_string())
        }
    }

    /// Decode raw bytes into a `String` under this character set.
    pub fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

impl Default for SpecificCharacterSet {
    fn default() -> Self {
        SpecificCharacterSet::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_is_default() {
        assert_eq!(SpecificCharacterSet::from_value(""), SpecificCharacterSet::Default);
    }

    #[test]
    fn other_repertoire_is_recorded_but_decoded_as_utf8() {
        let cs = SpecificCharacterSet::from_value("ISO_IR 100");
        assert_eq!(cs.decode(b"abc"), "abc");
    }
}
