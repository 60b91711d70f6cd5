//! A reader for the StarDict dictionary on-disk format.
//!
//! StarDict dictionaries are distributed as a triple of files sharing a stem: a textual `.ifo`
//! descriptor, a binary `.idx`/`.idx.gz` word index, and a `.dict`/`.dict.dz` payload file. The
//! `.dict.dz` variant is wrapped in `dictzip`, a gzip extension that embeds a chunk table in the
//! header's extra field, enabling random access into the compressed stream.
//!
//! This crate only reads the format: locating triples in a directory ([`paths`]), parsing the
//! `.ifo` header ([`ifo`]), parsing the `.idx` index ([`idx`]), parsing the dictzip header
//! ([`dictzip`]), framing a word's raw payload into typed sub-entries ([`framer`]), and streaming
//! or materializing dict entries for a set of index entries ([`entries`]).
//!
//! # Example
//!
//! ```no_run
//! use stardict::paths::StarDictFileCollection;
//! use stardict::{entries, idx, ifo};
//!
//! let mut collection = StarDictFileCollection::new();
//! collection.push_dir("/usr/share/stardict/dic/my-dict").unwrap();
//! for files in collection.bundles() {
//!     let info = ifo::read_info(&files.ifo).unwrap();
//!     let indexes = idx::read_indexes(&files.idx, info.idxoffsetbits).unwrap();
//!     let results = entries::read_all(&files.dict, &indexes, info.sametypesequence.as_deref()).unwrap();
//!     for (index_entry, sub_entries) in results {
//!         println!("{}: {} sub-entries", index_entry.word, sub_entries.len());
//!     }
//! }
//! ```

pub mod dictzip;
pub mod entries;
pub mod error;
pub mod framer;
pub mod idx;
pub mod ifo;
pub mod model;
pub mod paths;

pub use error::StarDictError;
pub use model::{
    DictEntry, DzHeader, EntryType, GzipFlags, IdxEntry, OffsetBits, OperatingSystemType,
    RandomAccessInfo, StarDictInfo, Version,
};
pub use paths::{StarDictFileCollection, StarDictFiles};
