//! The token-stream dataset parser and Part 10 file meta reader (spec
//! components C4 and C5).
//!
//! [`dataset::DataSetReader`] turns a byte stream into a flat
//! [`dataset::DataToken`] stream; [`meta::read_preamble_and_meta`] reads
//! the preamble, `DICM` magic, and file meta group that precede it in a
//! Part 10 file. Assembling tokens into an object tree is
//! `dcmkit-object`'s job.

pub mod dataset;
pub mod error;
pub mod meta;
pub mod stateful;

pub use dataset::{DataSetReader, DataToken};
pub use error::{Error, Result};
pub use meta::{read_meta_group, read_preamble_and_meta, FileMetaTable};
pub use stateful::StatefulDecoder;
