//! The standard DICOM data dictionary and well-known UIDs (spec
//! component C2).

pub mod registry;
pub mod tags;
pub mod uids;

pub use registry::{StandardDataDictionary, StandardEntry, STANDARD};
