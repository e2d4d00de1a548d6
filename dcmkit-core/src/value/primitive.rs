//! The primitive value representation: the leaf values held by data
//! elements once their VR-specific bytes have been decoded.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use smallvec::SmallVec;

use crate::tag::Tag;

/// A small vector of up to two elements before spilling to the heap, used
/// throughout this crate for multi-valued attributes (most DICOM
/// attributes carry one or a handful of values).
pub type C<T> = SmallVec<[T; 2]>;

/// A decoded, VR-typed primitive value.
///
/// Sequence values are represented separately by
/// [`Value::Sequence`](super::Value::Sequence); this enum only ever holds
/// leaf values.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    /// No value: a present element whose length is declared as zero.
    Empty,
    /// A sequence of attribute tags (VR: AT).
    Tags(C<Tag>),
    /// A sequence of unsigned 8-bit integers, also used for OB and
    /// unknown-VR byte strings.
    U8(C<u8>),
    /// A sequence of signed 16-bit integers (VR: SS).
    I16(C<i16>),
    /// A sequence of unsigned 16-bit integers (VR: US, OW).
    U16(C<u16>),
    /// A sequence of signed 32-bit integers (VR: SL).
    I32(C<i32>),
    /// A sequence of unsigned 32-bit integers (VR: UL, OL).
    U32(C<u32>),
    /// A sequence of single-precision floats (VR: FL, OF).
    F32(C<f32>),
    /// A sequence of double-precision floats (VR: FD, OD).
    F64(C<f64>),
    /// A single string value, not further split on backslash (VR: LT,
    /// ST, UT, UR and other text VRs that never repeat).
    Str(String),
    /// A backslash-separated list of string values (VR: CS, LO, SH, PN,
    /// UI, DA, TM, DT, AS, DS, IS, AE and other repeatable text VRs).
    Strs(C<String>),
    /// A list of decoded dates (parsed view over a DA value).
    Date(C<NaiveDate>),
    /// A list of decoded times (parsed view over a TM value).
    Time(C<NaiveTime>),
    /// A list of decoded date-times (parsed view over a DT value).
    DateTime(C<NaiveDateTime>),
}

impl PrimitiveValue {
    /// The number of individual values held (0 for [`PrimitiveValue::Empty`]).
    pub fn multiplicity(&self) -> u32 {
        match self {
            PrimitiveValue::Empty => 0,
            PrimitiveValue::Tags(c) => c.len() as u32,
            PrimitiveValue::U8(c) => c.len() as u32,
            PrimitiveValue::I16(c) => c.len() as u32,
            PrimitiveValue::U16(c) => c.len() as u32,
            PrimitiveValue::I32(c) => c.len() as u32,
            PrimitiveValue::U32(c) => c.len() as u32,
            PrimitiveValue::F32(c) => c.len() as u32,
            PrimitiveValue::F64(c) => c.len() as u32,
            PrimitiveValue::Str(_) => 1,
            PrimitiveValue::Strs(c) => c.len() as u32,
            PrimitiveValue::Date(c) => c.len() as u32,
            PrimitiveValue::Time(c) => c.len() as u32,
            PrimitiveValue::DateTime(c) => c.len() as u32,
        }
    }

    /// Obtain a single string view of this value, joining multiple values
    /// with a backslash as DICOM does on the wire. Numeric values are not
    /// converted; this is intended for VRs already held as text.
    pub fn to_str(&self) -> std::borrow::Cow<'_, str> {
        match self {
            PrimitiveValue::Empty => std::borrow::Cow::Borrowed(""),
            PrimitiveValue::Str(s) => std::borrow::Cow::Borrowed(s.as_str()),
            PrimitiveValue::Strs(c) => std::borrow::Cow::Owned(c.join("\\")),
            _ => std::borrow::Cow::Owned(String::new()),
        }
    }

    /// Interpret this value as a single 32-bit integer, if it holds
    /// exactly one integer-compatible value.
    pub fn to_i32(&self) -> Option<i32> {
        match self {
            PrimitiveValue::I32(c) => c.first().copied(),
            PrimitiveValue::U32(c) => c.first().copied().map(|v| v as i32),
            PrimitiveValue::I16(c) => c.first().copied().map(i32::from),
            PrimitiveValue::U16(c) => c.first().copied().map(i32::from),
            PrimitiveValue::Strs(c) => c.first().and_then(|s| s.trim().parse().ok()),
            PrimitiveValue::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Str(value.to_string())
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Str(value)
    }
}

impl From<u16> for PrimitiveValue {
    fn from(value: u16) -> Self {
        PrimitiveValue::U16(C::from_elem(value, 1))
    }
}

impl From<u32> for PrimitiveValue {
    fn from(value: u32) -> Self {
        PrimitiveValue::U32(C::from_elem(value, 1))
    }
}

impl From<i32> for PrimitiveValue {
    fn from(value: i32) -> Self {
        PrimitiveValue::I32(C::from_elem(value, 1))
    }
}

impl From<Tag> for PrimitiveValue {
    fn from(value: Tag) -> Self {
        PrimitiveValue::Tags(C::from_elem(value, 1))
    }
}

impl<T> From<Option<T>> for PrimitiveValue
where
    PrimitiveValue: From<T>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => PrimitiveValue::from(v),
            None => PrimitiveValue::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_has_zero_multiplicity() {
        assert_eq!(PrimitiveValue::Empty.multiplicity(), 0);
    }

    #[test]
    fn strs_join_with_backslash() {
        let v = PrimitiveValue::Strs(C::from_vec(vec!["A".to_string(), "B".to_string()]));
        assert_eq!(v.to_str(), "A\\B");
    }

    #[test]
    fn option_none_becomes_empty() {
        let v: PrimitiveValue = PrimitiveValue::from(None::<u16>);
        assert_eq!(v, PrimitiveValue::Empty);
    }

    #[test]
    fn option_some_unwraps() {
        let v: PrimitiveValue = PrimitiveValue::from(Some(7u16));
        assert_eq!(v.to_i32(), Some(7));
    }

    #[test]
    fn decimal_string_parses_as_integer() {
        let v = PrimitiveValue::from("42".to_string());
        assert_eq!(v.to_i32(), Some(42));
    }
}
