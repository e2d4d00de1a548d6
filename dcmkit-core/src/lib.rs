//! Core data types shared by every dcmkit crate: the attribute [`Tag`],
//! the [`VR`] registry, element [`Length`], data element headers, and the
//! in-memory [`Value`] representation.
//!
//! This crate has no notion of files, transfer syntaxes or network
//! protocol; it only defines the vocabulary the rest of the workspace is
//! built from.

pub mod dictionary;
pub mod error;
pub mod header;
pub mod length;
pub mod tag;
pub mod value;
pub mod vr;

pub use dictionary::{DataDictionary, DictionaryEntry};
pub use error::{AsDcmErrorKind, DcmErrorKind};
pub use header::{DataElementHeader, Header, ItemHeader};
pub use length::Length;
pub use tag::{ElementNumber, GroupNumber, Tag};
pub use value::{primitive::C, PrimitiveValue, Value};
pub use vr::VR;

/// Build a [`PrimitiveValue`] from any type with a `From` conversion into
/// one, most commonly used when assembling DIMSE command fields:
///
/// ```
/// use dcmkit_core::dicom_value;
/// let value = dicom_value!(1u16);
/// assert_eq!(value.to_i32(), Some(1));
/// ```
#[macro_export]
macro_rules! dicom_value {
    ($e:expr) => {
        $crate::PrimitiveValue::from($e)
    };
}
