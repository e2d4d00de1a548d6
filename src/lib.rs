//! # dcmkit
//!
//! This crate aggregates the key modules of the dcmkit project:
//! a DICOM Part 10 file parser and a DICOM Upper Layer network peer.
//!
//! Sub-crates are also usable independently, and carry the `dcmkit-` prefix
//! (e.g. the `object` module lives in the crate [`dcmkit-object`][1]).
//!
//! [1]: https://docs.rs/dcmkit-object
//!
//! - [`core`] contains the basic data types: [`Tag`](dcmkit_core::Tag),
//!   [`VR`](dcmkit_core::VR), and the in-memory [`Value`](dcmkit_core::Value)
//!   representation used by [data elements](dcmkit_core::DataElement).
//! - [`dictionary`] is the standard DICOM attribute dictionary.
//! - [`object`] is the idiomatic API for reading and writing DICOM objects
//!   from files or other byte sources.
//! - [`transfer_syntax`] is the registry of known transfer syntaxes.
//! - [`parser`] contains the mid-level token-stream abstraction for
//!   reading and writing DICOM data sets; most applications will prefer
//!   [`object`] instead.
//! - [`ul`] (enabled by the `ul` feature, on by default) provides PDU
//!   reading/writing, association negotiation, and the DIMSE query/retrieve
//!   operations (C-ECHO, C-FIND, C-MOVE, C-GET).

pub use dcmkit_core as core;
pub use dcmkit_dictionary as dictionary;
pub use dcmkit_encoding as encoding;
pub use dcmkit_object as object;
pub use dcmkit_parser as parser;
pub use dcmkit_transfer_syntax as transfer_syntax;
#[cfg(feature = "ul")]
pub use dcmkit_ul as ul;

pub use dcmkit_core::dicom_value;
