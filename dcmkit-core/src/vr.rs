//! Value Representation codes and the VR registry (spec component C1).

use std::fmt;
use std::str::FromStr;

/// A two-letter DICOM Value Representation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum VR {
    /// Application Entity
    AE,
    /// Age String
    AS,
    /// Attribute Tag
    AT,
    /// Code String
    CS,
    /// Date
    DA,
    /// Decimal String
    DS,
    /// Date Time
    DT,
    /// Floating Point Single
    FL,
    /// Floating Point Double
    FD,
    /// Integer String
    IS,
    /// Long String
    LO,
    /// Long Text
    LT,
    /// Other Byte
    OB,
    /// Other Double
    OD,
    /// Other Float
    OF,
    /// Other Long
    OL,
    /// Other Word
    OW,
    /// Person Name
    PN,
    /// Short String
    SH,
    /// Signed Long
    SL,
    /// Sequence of Items
    SQ,
    /// Signed Short
    SS,
    /// Short Text
    ST,
    /// Time
    TM,
    /// Unlimited Characters
    UC,
    /// Unique Identifier (UID)
    UI,
    /// Unsigned Long
    UL,
    /// Unknown
    UN,
    /// Universal Resource Identifier or Universal Resource Locator (URI/URL)
    UR,
    /// Unsigned Short
    US,
    /// Unlimited Text
    UT,
}

impl VR {
    /// Obtain the value representation corresponding to the given two bytes.
    pub fn from_binary(chars: [u8; 2]) -> Option<Self> {
        std::str::from_utf8(chars.as_ref())
            .ok()
            .and_then(|s| VR::from_str(s).ok())
    }

    /// Retrieve a string representation of this VR.
    pub fn to_str(self) -> &'static str {
        use VR::*;
        match self {
            AE => "AE",
            AS => "AS",
            AT => "AT",
            CS => "CS",
            DA => "DA",
            DS => "DS",
            DT => "DT",
            FL => "FL",
            FD => "FD",
            IS => "IS",
            LO => "LO",
            LT => "LT",
            OB => "OB",
            OD => "OD",
            OF => "OF",
            OL => "OL",
            OW => "OW",
            PN => "PN",
            SH => "SH",
            SL => "SL",
            SQ => "SQ",
            SS => "SS",
            ST => "ST",
            TM => "TM",
            UC => "UC",
            UI => "UI",
            UL => "UL",
            UN => "UN",
            UR => "UR",
            US => "US",
            UT => "UT",
        }
    }

    /// Retrieve a copy of this VR's byte representation.
    pub fn to_bytes(self) -> [u8; 2] {
        let bytes = self.to_str().as_bytes();
        [bytes[0], bytes[1]]
    }

    /// Look up this VR's entry in the static registry.
    #[inline]
    pub fn info(self) -> &'static VrInfo {
        info_for(self)
    }

    /// Whether this VR's length field is 16 bits ("short-length") or 32 bits
    /// with two reserved bytes ("long-length"), per spec §3.
    #[inline]
    pub fn has_long_length(self) -> bool {
        self.info().long_length
    }
}

impl FromStr for VR {
    type Err = &'static str;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        use VR::*;
        match string {
            "AE" => Ok(AE),
            "AS" => Ok(AS),
            "AT" => Ok(AT),
            "CS" => Ok(CS),
            "DA" => Ok(DA),
            "DS" => Ok(DS),
            "DT" => Ok(DT),
            "FL" => Ok(FL),
            "FD" => Ok(FD),
            "IS" => Ok(IS),
            "LO" => Ok(LO),
            "LT" => Ok(LT),
            "OB" => Ok(OB),
            "OD" => Ok(OD),
            "OF" => Ok(OF),
            "OL" => Ok(OL),
            "OW" => Ok(OW),
            "PN" => Ok(PN),
            "SH" => Ok(SH),
            "SL" => Ok(SL),
            "SQ" => Ok(SQ),
            "SS" => Ok(SS),
            "ST" => Ok(ST),
            "TM" => Ok(TM),
            "UC" => Ok(UC),
            "UI" => Ok(UI),
            "UL" => Ok(UL),
            "UN" => Ok(UN),
            "UR" => Ok(UR),
            "US" => Ok(US),
            "UT" => Ok(UT),
            _ => Err("no such value representation"),
        }
    }
}

impl fmt::Display for VR {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// A data element's fixed-width element size, for numeric primitive VRs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementWidth {
    /// The VR holds character data (string or text), not fixed-width
    /// numbers.
    Text,
    /// The VR holds a fixed-width primitive of the given byte width
    /// (1, 2, 4 or 8).
    Fixed(u8),
}

/// How a VR's textual value is padded to an even length, if at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    /// No padding is used (fixed-width binary VRs).
    None,
    /// Padded with a trailing space (0x20).
    Space,
    /// Padded with a trailing NUL (0x00); used for UI.
    Nul,
}

/// A static registry entry describing one VR's encoding rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VrInfo {
    /// The VR this entry describes.
    pub vr: VR,
    /// Human-readable name.
    pub name: &'static str,
    /// Whether the on-wire length field is 32 bits (with 2 reserved bytes)
    /// rather than 16 bits.
    pub long_length: bool,
    /// The element width, for fixed-width numeric VRs.
    pub width: ElementWidth,
    /// The informal maximum declared length in bytes (not enforced on
    /// decode).
    pub max_length: u32,
    /// The padding byte permitted as a single trailing pad.
    pub padding: Padding,
}

macro_rules! entry {
    ($vr:ident, $name:expr, $long:expr, $width:expr, $max:expr, $pad:expr) => {
        VrInfo {
            vr: VR::$vr,
            name: $name,
            long_length: $long,
            width: $width,
            max_length: $max,
            padding: $pad,
        }
    };
}

const REGISTRY: &[VrInfo] = &[
    entry!(AE, "Application Entity", false, ElementWidth::Text, 16, Padding::Space),
    entry!(AS, "Age String", false, ElementWidth::Text, 4, Padding::Space),
    entry!(AT, "Attribute Tag", false, ElementWidth::Fixed(4), 4, Padding::None),
    entry!(CS, "Code String", false, ElementWidth::Text, 16, Padding::Space),
    entry!(DA, "Date", false, ElementWidth::Text, 8, Padding::Space),
    entry!(DS, "Decimal String", false, ElementWidth::Text, 16, Padding::Space),
    entry!(DT, "Date Time", false, ElementWidth::Text, 26, Padding::Space),
    entry!(FL, "Floating Point Single", false, ElementWidth::Fixed(4), 4, Padding::None),
    entry!(FD, "Floating Point Double", false, ElementWidth::Fixed(8), 8, Padding::None),
    entry!(IS, "Integer String", false, ElementWidth::Text, 12, Padding::Space),
    entry!(LO, "Long String", false, ElementWidth::Text, 64, Padding::Space),
    entry!(LT, "Long Text", false, ElementWidth::Text, 10240, Padding::Space),
    entry!(OB, "Other Byte", true, ElementWidth::Fixed(1), u32::MAX, Padding::None),
    entry!(OD, "Other Double", true, ElementWidth::Fixed(8), u32::MAX, Padding::None),
    entry!(OF, "Other Float", true, ElementWidth::Fixed(4), u32::MAX, Padding::None),
    entry!(OL, "Other Long", true, ElementWidth::Fixed(4), u32::MAX, Padding::None),
    entry!(OW, "Other Word", true, ElementWidth::Fixed(2), u32::MAX, Padding::None),
    entry!(PN, "Person Name", false, ElementWidth::Text, 64, Padding::Space),
    entry!(SH, "Short String", false, ElementWidth::Text, 16, Padding::Space),
    entry!(SL, "Signed Long", false, ElementWidth::Fixed(4), 4, Padding::None),
    entry!(SQ, "Sequence of Items", true, ElementWidth::Text, 0, Padding::None),
    entry!(SS, "Signed Short", false, ElementWidth::Fixed(2), 2, Padding::None),
    entry!(ST, "Short Text", false, ElementWidth::Text, 1024, Padding::Space),
    entry!(TM, "Time", false, ElementWidth::Text, 16, Padding::Space),
    entry!(UC, "Unlimited Characters", true, ElementWidth::Text, u32::MAX, Padding::Space),
    entry!(UI, "Unique Identifier", false, ElementWidth::Text, 64, Padding::Nul),
    entry!(UL, "Unsigned Long", false, ElementWidth::Fixed(4), 4, Padding::None),
    entry!(UN, "Unknown", true, ElementWidth::Fixed(1), u32::MAX, Padding::None),
    entry!(UR, "Universal Resource Identifier", true, ElementWidth::Text, u32::MAX, Padding::Space),
    entry!(US, "Unsigned Short", false, ElementWidth::Fixed(2), 2, Padding::None),
    entry!(UT, "Unlimited Text", true, ElementWidth::Text, u32::MAX, Padding::Space),
];

fn info_for(vr: VR) -> &'static VrInfo {
    REGISTRY
        .iter()
        .find(|e| e.vr == vr)
        .expect("VR registry is exhaustive over the VR enum")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_vs_long_length() {
        assert!(!VR::CS.has_long_length());
        assert!(VR::OB.has_long_length());
        assert!(VR::SQ.has_long_length());
        assert!(VR::UN.has_long_length());
    }

    #[test]
    fn unknown_binary_resolves_to_none() {
        assert_eq!(VR::from_binary(*b"ZZ"), None);
    }

    #[test]
    fn ui_pads_with_nul_others_with_space() {
        assert_eq!(VR::UI.info().padding, Padding::Nul);
        assert_eq!(VR::SH.info().padding, Padding::Space);
    }

    #[test]
    fn registry_is_exhaustive() {
        // every VR constructed here must resolve without panicking
        for vr in [
            VR::AE, VR::AS, VR::AT, VR::CS, VR::DA, VR::DS, VR::DT, VR::FL, VR::FD, VR::IS,
            VR::LO, VR::LT, VR::OB, VR::OD, VR::OF, VR::OL, VR::OW, VR::PN, VR::SH, VR::SL,
            VR::SQ, VR::SS, VR::ST, VR::TM, VR::UC, VR::UI, VR::UL, VR::UN, VR::UR, VR::US,
            VR::UT,
        ] {
            let _ = vr.info();
        }
    }
}
